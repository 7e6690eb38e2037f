//! Cursor unprojection
//!
//! Turns a pixel position into a world-space picking ray:
//!
//! 1. pixel -> NDC in [-1, 1], Y flipped (screen Y grows down)
//! 2. near (z = -1) and far (z = 0) clip points at that NDC, w = 1
//! 3. inverse projection, perspective divide -> camera space
//! 4. inverse view, perspective divide -> world space
//! 5. direction = normalize(far - near), end = near + direction * length
//!
//! A cursor outside the viewport yields no ray (`Ok(None)`); a camera whose
//! matrices cannot be inverted yields a [`CameraError`].

use crate::camera::CameraTransforms;
use crate::error::{CameraError, Result};
use crate::matrix::Mat4;
use crate::ray::{PickRay, Ray};
use crate::vector::{Vec3, Vec4};

/// Length of the bounded picking segment
pub const DEFAULT_PICK_LENGTH: f32 = 1000.0;

/// NDC depth of the ray start (near plane)
const NEAR_DEPTH: f32 = -1.0;
/// NDC depth used for the second point defining the direction
const FAR_DEPTH: f32 = 0.0;

/// Pixel position, origin at the top-left of the viewport
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Viewport size in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Create a viewport; both dimensions must be positive
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CameraError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// `0 <= x < width && 0 <= y < height`
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= 0
            && point.y >= 0
            && (point.x as i64) < self.width as i64
            && (point.y as i64) < self.height as i64
    }

    /// Pixel to normalized device coordinates (Y up)
    pub fn to_ndc(&self, point: ScreenPoint) -> (f32, f32) {
        let w = self.width as f32;
        let h = self.height as f32;
        let x = (point.x as f32 / w - 0.5) * 2.0;
        let y = ((h - point.y as f32) / h - 0.5) * 2.0;
        (x, y)
    }
}

/// Inverted camera transforms, reusable for any number of cursor positions
/// within one frame
#[derive(Clone, Copy, Debug)]
pub struct Unprojector {
    viewport: Viewport,
    inv_projection: Mat4,
    inv_view: Mat4,
    max_length: f32,
}

impl Unprojector {
    /// Invert the frame's camera transforms.
    ///
    /// Fails with [`CameraError::SingularMatrix`] if either matrix is not
    /// invertible.
    pub fn new(viewport: Viewport, transforms: &CameraTransforms) -> Result<Self> {
        let inv_projection = transforms
            .projection
            .try_inverse()
            .ok_or(CameraError::SingularMatrix("projection"))?;
        let inv_view = transforms
            .view
            .try_inverse()
            .ok_or(CameraError::SingularMatrix("view"))?;

        Ok(Self {
            viewport,
            inv_projection,
            inv_view,
            max_length: DEFAULT_PICK_LENGTH,
        })
    }

    /// Set the length of the produced picking segment
    pub fn with_max_length(mut self, max_length: f32) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Unproject a cursor position.
    ///
    /// `Ok(None)` when the cursor is outside the viewport.
    pub fn unproject(&self, cursor: ScreenPoint) -> Result<Option<PickRay>> {
        if !self.viewport.contains(cursor) {
            return Ok(None);
        }

        let (ndc_x, ndc_y) = self.viewport.to_ndc(cursor);
        let near = self.ndc_to_world(Vec4::new(ndc_x, ndc_y, NEAR_DEPTH, 1.0))?;
        let far = self.ndc_to_world(Vec4::new(ndc_x, ndc_y, FAR_DEPTH, 1.0))?;

        let direction = (far - near).try_normalize().ok_or(CameraError::NonFinite)?;
        let ray = Ray { origin: near, direction };
        Ok(Some(PickRay::new(ray, self.max_length)))
    }

    fn ndc_to_world(&self, clip: Vec4) -> Result<Vec3> {
        let camera = (self.inv_projection * clip).project().ok_or(CameraError::NonFinite)?;
        (self.inv_view * camera.extend(1.0))
            .project()
            .ok_or(CameraError::NonFinite)
    }
}

/// One-shot unprojection of a cursor position with the default pick length.
pub fn unproject(
    cursor: ScreenPoint,
    viewport: Viewport,
    transforms: &CameraTransforms,
) -> Result<Option<PickRay>> {
    Unprojector::new(viewport, transforms)?.unproject(cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera;
    use approx::assert_abs_diff_eq;

    fn scene_camera() -> (Viewport, CameraTransforms) {
        let viewport = Viewport::new(800, 600).unwrap();
        let transforms = PerspectiveCamera::default().transforms(viewport.aspect()).unwrap();
        (viewport, transforms)
    }

    #[test]
    fn test_zero_sized_viewport_is_rejected() {
        assert_eq!(
            Viewport::new(0, 600),
            Err(CameraError::InvalidViewport { width: 0, height: 600 })
        );
    }

    #[test]
    fn test_viewport_bounds() {
        let viewport = Viewport::new(800, 600).unwrap();
        assert!(viewport.contains(ScreenPoint::new(0, 0)));
        assert!(viewport.contains(ScreenPoint::new(799, 599)));
        assert!(!viewport.contains(ScreenPoint::new(800, 300)));
        assert!(!viewport.contains(ScreenPoint::new(400, 600)));
        assert!(!viewport.contains(ScreenPoint::new(-1, 300)));
        assert!(!viewport.contains(ScreenPoint::new(400, -1)));
    }

    #[test]
    fn test_ndc_flips_vertical_axis() {
        let viewport = Viewport::new(800, 600).unwrap();
        let (x, y) = viewport.to_ndc(ScreenPoint::new(0, 0));
        assert_abs_diff_eq!(x, -1.0);
        assert_abs_diff_eq!(y, 1.0);

        let (x, y) = viewport.to_ndc(ScreenPoint::new(400, 300));
        assert_abs_diff_eq!(x, 0.0);
        assert_abs_diff_eq!(y, 0.0);
    }

    #[test]
    fn test_center_pixel_looks_down_negative_z() {
        let (viewport, transforms) = scene_camera();
        let pick = unproject(ScreenPoint::new(400, 300), viewport, &transforms)
            .unwrap()
            .expect("center is inside the viewport");

        assert_abs_diff_eq!(pick.origin().x, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(pick.origin().y, 10.0, epsilon = 1e-3);
        assert_abs_diff_eq!(pick.origin().z, 30.0, epsilon = 0.2);

        assert_abs_diff_eq!(pick.direction().x, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(pick.direction().y, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(pick.direction().z, -1.0, epsilon = 1e-4);

        assert_abs_diff_eq!(pick.length(), DEFAULT_PICK_LENGTH, epsilon = 0.05);
    }

    #[test]
    fn test_outside_cursor_yields_no_ray() {
        let (viewport, transforms) = scene_camera();
        for cursor in [
            ScreenPoint::new(-5, 300),
            ScreenPoint::new(800, 300),
            ScreenPoint::new(400, 600),
            ScreenPoint::new(400, -1),
        ] {
            assert_eq!(unproject(cursor, viewport, &transforms), Ok(None));
        }
    }

    #[test]
    fn test_singular_projection_fails_fast() {
        let viewport = Viewport::new(800, 600).unwrap();
        let transforms = CameraTransforms::new(Mat4::ZERO, Mat4::IDENTITY);
        assert_eq!(
            unproject(ScreenPoint::new(1, 1), viewport, &transforms),
            Err(CameraError::SingularMatrix("projection"))
        );

        let transforms = CameraTransforms::new(Mat4::IDENTITY, Mat4::ZERO);
        assert_eq!(
            unproject(ScreenPoint::new(1, 1), viewport, &transforms),
            Err(CameraError::SingularMatrix("view"))
        );
    }

    #[test]
    fn test_left_edge_ray_leans_left() {
        let (viewport, transforms) = scene_camera();
        let pick = unproject(ScreenPoint::new(0, 300), viewport, &transforms)
            .unwrap()
            .unwrap();
        assert!(pick.direction().x < 0.0);
        assert!(pick.direction().z < 0.0);
    }
}
