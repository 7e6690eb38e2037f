//! Frame driver
//!
//! [`Frame`] owns the physics world and the camera and turns one frame of
//! input into a [`FrameReport`]:
//!
//! ```text
//! FrameInput ─► step physics ─► pan camera ─► unproject cursor ─► cast pick ray
//!                                                                      │
//!        FrameReport ◄── draw list ◄── shades ◄── sensor pair test ◄───┘
//! ```

use crate::camera_rig::CameraRig;
use crate::config::DemoConfig;
use crate::error::Result;
use crate::input::FrameInput;
use crate::scene::Scene;
use crate::visual::{build_draw_list, DrawItem};
use pickbox_math::prelude::*;
use pickbox_physics::prelude::*;

/// Everything one frame produced
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// Frame number, starting at 0
    pub frame: u64,
    /// `None` when the cursor was outside the viewport
    pub ray: Option<PickRay>,
    pub hit: Option<RaycastHit>,
    /// Sensor contacts, tagged with the frame number
    pub contacts: ContactReport<u64>,
    pub draw_list: Vec<DrawItem>,
    pub sleeping: usize,
}

impl FrameReport {
    pub fn is_hit(&self) -> bool {
        self.hit.is_some()
    }

    pub fn hit_body(&self) -> Option<RigidBodyHandle> {
        self.hit.as_ref().and_then(|hit| hit.body)
    }
}

/// Demo state carried between frames
pub struct Frame {
    world: PhysicsWorld,
    scene: Scene,
    rig: CameraRig,
    viewport: Viewport,
    max_ray_length: f32,
    pick_options: RaycastOptions,
    monitored: RigidBodyHandle,
    other: RigidBodyHandle,
    sensor_groups: CollisionGroups,
    skip_jointed: bool,
    sensor_threshold: f32,
    frame: u64,
}

impl Frame {
    /// Build the world, the scene and the camera from `config`
    pub fn new(config: &DemoConfig) -> Result<Self> {
        let mut world = PhysicsWorld::try_new(config.physics.clone())?;
        let scene = Scene::build(&mut world, &config.scene, &config.picking)?;
        let (monitored, other) = scene.sensor_pair(&config.sensor)?;

        let matrix = CollisionMatrix::default();
        let sensor_groups = matrix.groups_by_name(&config.sensor.layer)?;

        let viewport = Viewport::new(config.window.width, config.window.height)?;
        let pick_options = RaycastOptions::default()
            .with_sensors(config.picking.include_sensors)
            .with_groups(CollisionGroups::new(
                CollisionLayer::DEFAULT.as_mask(),
                CollisionLayer::PICKABLE.as_mask(),
            ));

        log::info!(
            "Frame driver ready: {}x{} viewport, sensor on body {} against body {}",
            viewport.width,
            viewport.height,
            config.sensor.monitored,
            config.sensor.other
        );

        Ok(Self {
            world,
            scene,
            rig: CameraRig::from_config(&config.camera),
            viewport,
            max_ray_length: config.picking.max_ray_length,
            pick_options,
            monitored,
            other,
            sensor_groups,
            skip_jointed: config.sensor.skip_jointed,
            sensor_threshold: config.sensor.distance_threshold,
            frame: 0,
        })
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Bodies the sensor pair test runs on, as `(monitored, other)`
    pub fn sensor_pair(&self) -> (RigidBodyHandle, RigidBodyHandle) {
        (self.monitored, self.other)
    }

    /// Run one frame
    pub fn update(&mut self, delta_time: f32, input: &FrameInput) -> Result<FrameReport> {
        let frame = self.frame;

        self.world.step(delta_time);
        self.rig.pan(&input.pan, delta_time);

        let transforms = self.rig.transforms(self.viewport)?;
        let unprojector = Unprojector::new(self.viewport, &transforms)?.with_max_length(self.max_ray_length);
        let ray = unprojector.unproject(input.cursor)?;

        let hit = match &ray {
            Some(pick) => {
                let hit = self
                    .world
                    .query()
                    .cast_segment(pick.origin().to_array(), pick.end.to_array(), &self.pick_options);
                match &hit {
                    Some(hit) => log::trace!("frame {frame}: picked {:?} at distance {}", hit.body, hit.distance),
                    None => log::trace!("frame {frame}: pick ray missed"),
                }
                hit
            }
            None => {
                log::trace!("frame {frame}: cursor {:?} outside viewport", input.cursor);
                None
            }
        };

        let mut sensor = ContactSensor::new(self.monitored, frame)
            .with_groups(self.sensor_groups)
            .skip_constraint_linked(self.skip_jointed)
            .with_distance_threshold(self.sensor_threshold);
        self.world.contact_pair_test(self.other, self.monitored, &mut sensor)?;
        let contacts = sensor.into_report();

        let mut touching = Vec::new();
        if !contacts.is_empty() {
            touching.push(self.monitored);
            touching.extend(contacts.touching_bodies());
        }

        let snapshots = self.world.bodies();
        let sleeping = snapshots.iter().filter(|body| body.is_sleeping()).count();
        let hit_body = hit.as_ref().and_then(|hit| hit.body);
        let draw_list = build_draw_list(&self.scene, &snapshots, hit_body, &touching);

        log::debug!(
            "frame {frame}: hit={} contacts={} sleeping={sleeping}",
            hit.is_some(),
            contacts.len()
        );

        self.frame += 1;
        Ok(FrameReport {
            frame,
            ray,
            hit,
            contacts,
            draw_list,
            sleeping,
        })
    }
}

/// Rolling per-interval statistics for the info log
#[derive(Debug, Clone)]
pub struct FrameSummary {
    interval: f32,
    elapsed: f32,
    frames: u32,
    hits: u32,
    contacts: usize,
    sleeping: usize,
}

impl Default for FrameSummary {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl FrameSummary {
    /// Summarize every `interval` seconds of simulated time
    ///
    /// A non-positive or non-finite interval falls back to one second.
    pub fn new(interval: f32) -> Self {
        Self {
            interval: if interval.is_finite() && interval > 0.0 { interval } else { 1.0 },
            elapsed: 0.0,
            frames: 0,
            hits: 0,
            contacts: 0,
            sleeping: 0,
        }
    }

    /// Record a frame; returns the summary line once per interval
    pub fn tick(&mut self, delta_time: f32, report: &FrameReport) -> Option<String> {
        self.elapsed += delta_time;
        self.frames += 1;
        self.hits += report.is_hit() as u32;
        self.contacts = report.contacts.len();
        self.sleeping = report.sleeping;

        if self.elapsed < self.interval {
            return None;
        }

        let line = format!(
            "frame {}: {} frames, {} with a pick, {} sensor contacts, {} sleeping bodies",
            report.frame, self.frames, self.hits, self.contacts, self.sleeping
        );
        // One line however many intervals a long frame spans
        self.elapsed %= self.interval;
        self.frames = 0;
        self.hits = 0;
        Some(line)
    }
}
