//! Pickbox demo binary
//!
//! Runs the frame driver headless with a scripted cursor sweep.
//!
//! Run with: cargo run -p pickbox_demo -- --config pickbox.toml

use pickbox_demo::prelude::*;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("pickbox failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = DemoConfig::load(std::env::args())?;
    config.print_summary();

    let mut frame = Frame::new(&config)?;
    let script = ScriptedInput::new(frame.viewport(), config.frames);
    let mut summary = FrameSummary::default();
    let mut picks = 0u64;

    for input in script.iter() {
        if input.quit {
            log::info!("Quit requested after {} frames", frame.frame_count());
            break;
        }

        let report = frame.update(config.frame_dt, &input)?;
        picks += report.is_hit() as u64;

        if let Some(line) = summary.tick(config.frame_dt, &report) {
            log::info!("{line}");
        }
        if let Some(hit) = &report.hit {
            log::debug!(
                "frame {}: cursor ({}, {}) picked tag {} at {:?}",
                report.frame,
                input.cursor.x,
                input.cursor.y,
                hit.user_data,
                hit.point
            );
        }
    }

    log::info!(
        "Done: {} frames, {} picks, {} bodies asleep",
        frame.frame_count(),
        picks,
        frame.world().bodies().iter().filter(|b| b.is_sleeping()).count()
    );
    Ok(())
}
