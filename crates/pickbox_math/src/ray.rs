//! 3D rays for picking

use crate::vector::Vec3;

/// 3D ray with a normalized direction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Ray origin point
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray with normalized direction
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Create a ray from two points
    #[inline]
    pub fn from_points(start: Vec3, end: Vec3) -> Self {
        Self::new(start, end - start)
    }

    /// Get a point at distance t along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Get the closest point on the ray to a given point
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let t = (point - self.origin).dot(self.direction);
        if t <= 0.0 {
            self.origin
        } else {
            self.at(t)
        }
    }

    /// Get the distance from a point to the ray
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        (point - self.closest_point(point)).length()
    }
}

/// A ray bounded at a maximum length, ready for a segment cast
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickRay {
    /// World-space ray (origin on the near plane)
    pub ray: Ray,
    /// World-space end point, `origin + direction * length`
    pub end: Vec3,
}

impl PickRay {
    pub fn new(ray: Ray, length: f32) -> Self {
        Self {
            ray,
            end: ray.at(length),
        }
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.ray.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.ray.direction
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.ray.origin.distance(self.end)
    }
}
