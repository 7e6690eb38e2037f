//! # pickbox_math - camera and picking math
//!
//! Column-major vector/matrix primitives plus the cursor unprojection used
//! for mouse picking.

pub mod camera;
pub mod error;
pub mod matrix;
pub mod quaternion;
pub mod ray;
pub mod unproject;
pub mod vector;

pub use camera::*;
pub use error::{CameraError, Result};
pub use matrix::*;
pub use quaternion::*;
pub use ray::*;
pub use unproject::*;
pub use vector::*;

/// Common math constants
pub mod consts {
    pub const PI: f32 = core::f32::consts::PI;
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Convert degrees to radians
#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees * consts::DEG_TO_RAD
}

pub mod prelude {
    pub use crate::camera::{CameraTransforms, PerspectiveCamera};
    pub use crate::error::CameraError;
    pub use crate::matrix::Mat4;
    pub use crate::quaternion::Quat;
    pub use crate::ray::{PickRay, Ray};
    pub use crate::unproject::{unproject, ScreenPoint, Unprojector, Viewport, DEFAULT_PICK_LENGTH};
    pub use crate::vector::{Vec3, Vec4};
    pub use crate::radians;
}
