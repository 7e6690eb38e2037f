//! Per-frame input and the scripted input source used by the headless binary

use pickbox_math::{ScreenPoint, Viewport};

/// Panning keys held during a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanKeys {
    /// W: pan up
    pub up: bool,
    /// S: pan down
    pub down: bool,
    /// A: pan left
    pub left: bool,
    /// D: pan right
    pub right: bool,
}

impl PanKeys {
    /// Pan direction as (x, y), each in -1..=1
    pub fn axis(&self) -> (f32, f32) {
        let x = (self.right as i32 - self.left as i32) as f32;
        let y = (self.up as i32 - self.down as i32) as f32;
        (x, y)
    }
}

/// Everything the frame driver reads from the user in one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Cursor relative to the viewport's top-left corner; may lie outside it
    pub cursor: ScreenPoint,
    pub pan: PanKeys,
    /// Escape or Q
    pub quit: bool,
}

impl FrameInput {
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            cursor: ScreenPoint::new(x, y),
            ..Default::default()
        }
    }
}

/// Deterministic input for headless runs
///
/// The cursor sweeps the middle row from just left of the viewport to just
/// right of it, so every run covers frames with and without a pick. The
/// camera pans right, then up, then back.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    viewport: Viewport,
    frames: u32,
    /// Pixels the sweep starts and ends outside the viewport
    margin: i32,
}

impl ScriptedInput {
    pub fn new(viewport: Viewport, frames: u32) -> Self {
        Self {
            viewport,
            frames,
            margin: 20,
        }
    }

    pub fn input_for(&self, frame: u32) -> FrameInput {
        if frame >= self.frames {
            return FrameInput {
                quit: true,
                ..Default::default()
            };
        }

        let width = self.viewport.width as i64;
        let span = width + 2 * self.margin as i64;
        let t = frame as i64 * span / self.frames.max(1) as i64;
        let x = (t - self.margin as i64) as i32;
        let y = (self.viewport.height / 2) as i32;

        let quarter = (self.frames / 4).max(1);
        let pan = match frame / quarter {
            0 => PanKeys {
                right: true,
                ..Default::default()
            },
            1 => PanKeys {
                up: true,
                ..Default::default()
            },
            2 => PanKeys {
                left: true,
                ..Default::default()
            },
            _ => PanKeys {
                down: true,
                ..Default::default()
            },
        };

        FrameInput {
            cursor: ScreenPoint::new(x, y),
            pan,
            quit: false,
        }
    }

    /// Inputs for every frame, ending with a quit request
    pub fn iter(&self) -> impl Iterator<Item = FrameInput> + '_ {
        (0..=self.frames).map(move |frame| self.input_for(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pan_axis() {
        let keys = PanKeys {
            up: true,
            left: true,
            ..Default::default()
        };
        assert_eq!(keys.axis(), (-1.0, 1.0));

        let both = PanKeys {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(both.axis(), (0.0, 0.0));
    }

    #[test]
    fn test_sweep_starts_and_ends_outside() {
        let viewport = Viewport::new(800, 600).unwrap();
        let script = ScriptedInput::new(viewport, 100);

        let first = script.input_for(0);
        assert!(!viewport.contains(first.cursor));
        assert_eq!(first.cursor.y, 300);

        let last = script.input_for(99);
        assert!(!viewport.contains(last.cursor));

        assert!(viewport.contains(script.input_for(50).cursor));
    }

    #[test]
    fn test_script_ends_with_quit() {
        let viewport = Viewport::new(64, 64).unwrap();
        let inputs: Vec<_> = ScriptedInput::new(viewport, 8).iter().collect();

        assert_eq!(inputs.len(), 9);
        assert!(inputs[..8].iter().all(|i| !i.quit));
        assert!(inputs[8].quit);
    }
}
