//! # pickbox_demo - headless picking demo
//!
//! Drops a stack of cubes onto a ground slab, sweeps a cursor across the
//! viewport and reports, each frame, which cube the mouse ray hits and which
//! bodies touch the monitored body.
//!
//! ```text
//! DemoConfig ──► Frame::new ──► Scene (ground + cubes) in a PhysicsWorld
//!                     │
//! FrameInput ──► Frame::update ──► FrameReport { ray, hit, contacts, draw_list }
//! ```

pub mod camera_rig;
pub mod config;
pub mod error;
pub mod frame;
pub mod input;
pub mod scene;
pub mod visual;

pub use error::{DemoError, Result};

pub mod prelude {
    pub use crate::camera_rig::CameraRig;
    pub use crate::config::{
        CameraConfig, DemoConfig, PickingConfig, SceneConfig, SensorConfig, WindowConfig, DEFAULT_CONFIG_FILE,
    };
    pub use crate::error::{DemoError, Result};
    pub use crate::frame::{Frame, FrameReport, FrameSummary};
    pub use crate::input::{FrameInput, PanKeys, ScriptedInput};
    pub use crate::scene::{cube_tag, Scene, GROUND_TAG};
    pub use crate::visual::{build_draw_list, derive_shade, shade_histogram, CubeShade, DrawItem, ShadeInputs};
}
