//! Perspective camera and the per-frame transform pair

use crate::error::{CameraError, Result};
use crate::matrix::Mat4;
use crate::vector::Vec3;

/// Projection and view matrices for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTransforms {
    pub projection: Mat4,
    pub view: Mat4,
}

impl CameraTransforms {
    pub fn new(projection: Mat4, view: Mat4) -> Self {
        Self { projection, view }
    }

    /// Combined `projection * view`
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Project a world point to normalized device coordinates.
    ///
    /// Returns `None` when the point sits on the camera plane (w = 0).
    pub fn world_to_ndc(&self, point: Vec3) -> Option<Vec3> {
        (self.view_projection() * point.extend(1.0)).project()
    }
}

/// A perspective camera looking along `forward`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 30.0),
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            fov_y: core::f32::consts::FRAC_PI_4,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward,
            ..Default::default()
        }
    }

    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn with_fov(mut self, fov_y: f32) -> Self {
        self.fov_y = fov_y;
        self
    }

    /// Build the checked projection/view pair for a viewport aspect ratio.
    pub fn transforms(&self, aspect: f32) -> Result<CameraTransforms> {
        self.validate(aspect)?;

        let projection = Mat4::perspective(self.fov_y, aspect, self.near, self.far);
        let view = Mat4::look_at(self.position, self.position + self.forward, self.up);

        if !view.is_finite() {
            return Err(CameraError::SingularMatrix("view"));
        }
        Ok(CameraTransforms { projection, view })
    }

    fn validate(&self, aspect: f32) -> Result<()> {
        if !(aspect.is_finite() && aspect > 0.0) {
            return Err(CameraError::InvalidProjection(format!("aspect ratio {aspect}")));
        }
        if !(self.fov_y > 0.0 && self.fov_y < core::f32::consts::PI) {
            return Err(CameraError::InvalidProjection(format!("field of view {}", self.fov_y)));
        }
        if !(self.near > 0.0 && self.far > self.near && self.far.is_finite()) {
            return Err(CameraError::InvalidProjection(format!(
                "clip planes near={} far={}",
                self.near, self.far
            )));
        }
        if !self.position.is_finite() {
            return Err(CameraError::InvalidProjection("camera position is not finite".into()));
        }

        // forward must be a direction and not parallel to up
        let forward = self.forward.try_normalize().ok_or(CameraError::SingularMatrix("view"))?;
        if forward.cross(self.up).try_normalize().is_none() {
            return Err(CameraError::SingularMatrix("view"));
        }
        Ok(())
    }
}
