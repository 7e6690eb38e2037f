//! 4x4 transformation matrices
//!
//! Matrices are column-major and multiply column vectors (`m * v`), OpenGL
//! style. Clip-space depth runs from -1 (near) to 1 (far).

use crate::quaternion::Quat;
use crate::vector::{Vec3, Vec4};
use core::ops::Mul;

/// Determinants smaller than this are treated as singular.
const SINGULAR_EPSILON: f32 = 1e-14;

/// 4x4 matrix (column-major)
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C, align(16))]
pub struct Mat4 {
    pub cols: [Vec4; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    pub const ZERO: Self = Self {
        cols: [Vec4::ZERO, Vec4::ZERO, Vec4::ZERO, Vec4::ZERO],
    };

    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self { cols: [c0, c1, c2, c3] }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::from_cols(Vec4::X, Vec4::Y, Vec4::Z, translation.extend(1.0))
    }

    #[inline]
    pub fn from_scale(scale: Vec3) -> Self {
        Self::from_cols(
            Vec4::new(scale.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, scale.y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, scale.z, 0.0),
            Vec4::W,
        )
    }

    /// Create a right-handed look-at view matrix
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - eye).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);

        Self::from_cols(
            Vec4::new(right.x, up.x, -forward.x, 0.0),
            Vec4::new(right.y, up.y, -forward.y, 0.0),
            Vec4::new(right.z, up.z, -forward.z, 0.0),
            Vec4::new(-right.dot(eye), -up.dot(eye), forward.dot(eye), 1.0),
        )
    }

    /// Create a perspective projection matrix (depth [-1, 1])
    ///
    /// Does not validate its inputs; a zero aspect ratio yields a matrix with
    /// infinite entries. See `PerspectiveCamera` for the checked path.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let nf = 1.0 / (near - far);

        Self::from_cols(
            Vec4::new(f / aspect, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f, 0.0, 0.0),
            Vec4::new(0.0, 0.0, (far + near) * nf, -1.0),
            Vec4::new(0.0, 0.0, 2.0 * far * near * nf, 0.0),
        )
    }

    /// Create a rotation matrix from a unit quaternion
    pub fn from_quat(q: Quat) -> Self {
        let x2 = q.x + q.x;
        let y2 = q.y + q.y;
        let z2 = q.z + q.z;

        let xx = q.x * x2;
        let xy = q.x * y2;
        let xz = q.x * z2;
        let yy = q.y * y2;
        let yz = q.y * z2;
        let zz = q.z * z2;
        let wx = q.w * x2;
        let wy = q.w * y2;
        let wz = q.w * z2;

        Self::from_cols(
            Vec4::new(1.0 - (yy + zz), xy + wz, xz - wy, 0.0),
            Vec4::new(xy - wz, 1.0 - (xx + zz), yz + wx, 0.0),
            Vec4::new(xz + wy, yz - wx, 1.0 - (xx + yy), 0.0),
            Vec4::W,
        )
    }

    /// Create a rigid transform from rotation and translation
    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        let mut m = Self::from_quat(rotation);
        m.cols[3] = translation.extend(1.0);
        m
    }

    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.cols[3].truncate()
    }

    /// Transform a point (w=1), dividing by the resulting w
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        let v = *self * point.extend(1.0);
        v.truncate() / v.w
    }

    /// Transform a vector (w=0)
    #[inline]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        (*self * vector.extend(0.0)).truncate()
    }

    pub fn is_finite(&self) -> bool {
        self.cols.iter().all(|c| c.is_finite())
    }

    pub fn determinant(&self) -> f32 {
        let (s, c) = self.minors();
        s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0]
    }

    /// Inverse of this matrix, or `None` if it is singular or contains
    /// non-finite entries.
    pub fn try_inverse(&self) -> Option<Self> {
        if !self.is_finite() {
            return None;
        }

        let (s, c) = self.minors();
        let det = s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0];
        if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let [a, b, cc, d] = self.cols;
        let inv = Self::from_cols(
            Vec4::new(
                (b.y * c[5] - b.z * c[4] + b.w * c[3]) * inv_det,
                (-a.y * c[5] + a.z * c[4] - a.w * c[3]) * inv_det,
                (d.y * s[5] - d.z * s[4] + d.w * s[3]) * inv_det,
                (-cc.y * s[5] + cc.z * s[4] - cc.w * s[3]) * inv_det,
            ),
            Vec4::new(
                (-b.x * c[5] + b.z * c[2] - b.w * c[1]) * inv_det,
                (a.x * c[5] - a.z * c[2] + a.w * c[1]) * inv_det,
                (-d.x * s[5] + d.z * s[2] - d.w * s[1]) * inv_det,
                (cc.x * s[5] - cc.z * s[2] + cc.w * s[1]) * inv_det,
            ),
            Vec4::new(
                (b.x * c[4] - b.y * c[2] + b.w * c[0]) * inv_det,
                (-a.x * c[4] + a.y * c[2] - a.w * c[0]) * inv_det,
                (d.x * s[4] - d.y * s[2] + d.w * s[0]) * inv_det,
                (-cc.x * s[4] + cc.y * s[2] - cc.w * s[0]) * inv_det,
            ),
            Vec4::new(
                (-b.x * c[3] + b.y * c[1] - b.z * c[0]) * inv_det,
                (a.x * c[3] - a.y * c[1] + a.z * c[0]) * inv_det,
                (-d.x * s[3] + d.y * s[1] - d.z * s[0]) * inv_det,
                (cc.x * s[3] - cc.y * s[1] + cc.z * s[0]) * inv_det,
            ),
        );

        inv.is_finite().then_some(inv)
    }

    /// 2x2 minors of the upper (`s`) and lower (`c`) column pairs.
    fn minors(&self) -> ([f32; 6], [f32; 6]) {
        let [a, b, c, d] = self.cols;
        let s = [
            a.x * b.y - b.x * a.y,
            a.x * b.z - b.x * a.z,
            a.x * b.w - b.x * a.w,
            a.y * b.z - b.y * a.z,
            a.y * b.w - b.y * a.w,
            a.z * b.w - b.z * a.w,
        ];
        let c = [
            c.x * d.y - d.x * c.y,
            c.x * d.z - d.x * c.z,
            c.x * d.w - d.x * c.w,
            c.y * d.z - d.y * c.z,
            c.y * d.w - d.y * c.w,
            c.z * d.w - d.z * c.w,
        ];
        (s, c)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_cols(
            self * rhs.cols[0],
            self * rhs.cols[1],
            self * rhs.cols[2],
            self * rhs.cols[3],
        )
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    #[inline]
    fn mul(self, rhs: Vec4) -> Vec4 {
        self.cols[0] * rhs.x + self.cols[1] * rhs.y + self.cols[2] * rhs.z + self.cols[3] * rhs.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_identity(m: Mat4) {
        for (i, col) in m.cols.iter().enumerate() {
            for (j, actual) in col.to_array().into_iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(actual, expected, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_mat4_translation() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let result = m.transform_point(Vec3::ZERO);
        assert!((result - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn test_inverse_of_view_and_projection() {
        let view = Mat4::look_at(Vec3::new(0.0, 10.0, 30.0), Vec3::new(0.0, 10.0, 29.0), Vec3::Y);
        assert_identity(view * view.try_inverse().unwrap());

        let proj = Mat4::perspective(core::f32::consts::FRAC_PI_4, 4.0 / 3.0, 0.1, 100.0);
        assert_identity(proj * proj.try_inverse().unwrap());
    }

    #[test]
    fn test_singular_matrices_have_no_inverse() {
        assert!(Mat4::ZERO.try_inverse().is_none());
        assert!(Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)).try_inverse().is_none());

        // Zero aspect ratio puts an infinity in the first column
        let proj = Mat4::perspective(core::f32::consts::FRAC_PI_4, 0.0, 0.1, 100.0);
        assert!(!proj.is_finite());
        assert!(proj.try_inverse().is_none());
    }

    #[test]
    fn test_look_at_maps_eye_to_origin() {
        let eye = Vec3::new(0.0, 10.0, 30.0);
        let view = Mat4::look_at(eye, eye + Vec3::NEG_Z, Vec3::Y);
        let p = view.transform_point(eye);
        assert!(p.length() < 1e-5);

        // A point in front of the camera lands on -Z in view space
        let ahead = view.transform_point(eye + Vec3::NEG_Z * 5.0);
        assert_abs_diff_eq!(ahead.z, -5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_determinant() {
        let m = Mat4::from_scale(Vec3::new(2.0, 3.0, 4.0));
        assert_abs_diff_eq!(m.determinant(), 24.0, epsilon = 1e-5);
    }
}
