//! Panning camera rig

use crate::config::CameraConfig;
use crate::input::PanKeys;
use pickbox_math::prelude::*;

/// A fixed-orientation camera that pans in its view plane
///
/// Looks down -Z with +Y up; W/S move along Y and A/D along X.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub camera: PerspectiveCamera,
    /// Units per second
    pub pan_speed: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl CameraRig {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            camera: PerspectiveCamera::new(config.position, Vec3::NEG_Z)
                .with_fov(radians(config.fov_degrees))
                .with_clip_planes(config.near, config.far),
            pan_speed: config.pan_speed,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.camera.position
    }

    /// Move the camera for one frame of held pan keys
    pub fn pan(&mut self, keys: &PanKeys, delta_time: f32) {
        let (x, y) = keys.axis();
        if x == 0.0 && y == 0.0 {
            return;
        }
        let step = self.pan_speed * delta_time;
        self.camera.position += Vec3::X * (x * step) + Vec3::Y * (y * step);
        log::trace!("camera panned to {:?}", self.camera.position);
    }

    /// Projection and view for this frame
    pub fn transforms(&self, viewport: Viewport) -> pickbox_math::Result<CameraTransforms> {
        self.camera.transforms(viewport.aspect())
    }
}
