//! Physics queries (ray casts, point and shape overlap)

use crate::body::RigidBodyHandle;
use crate::collider::{ColliderHandle, ColliderShape};
use crate::error::Result;
use crate::layers::CollisionGroups;
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::parry::query::RayIntersection;
use rapier3d::prelude as rapier;

/// Segments shorter than this are treated as empty
const MIN_SEGMENT_LENGTH: f32 = 1.0e-6;

/// Result of a ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// The collider that was hit
    pub collider: ColliderHandle,
    /// The body owning that collider, if any
    pub body: Option<RigidBodyHandle>,
    /// Hit point in world space
    pub point: [f32; 3],
    /// Surface normal at the hit point
    pub normal: [f32; 3],
    /// Distance from the ray origin
    pub distance: f32,
    /// Hit position along the cast, 0 at the origin and 1 at the end
    pub fraction: f32,
    /// User data of the collider
    pub user_data: u128,
}

/// Options for ray queries
#[derive(Debug, Clone)]
pub struct RaycastOptions {
    /// Maximum distance for direction-based casts
    pub max_distance: f32,
    /// Whether sensor colliders can be hit
    pub include_sensors: bool,
    /// Collision groups the ray presents to colliders
    pub groups: CollisionGroups,
    /// Colliders the ray passes through
    pub exclude: Vec<ColliderHandle>,
}

impl Default for RaycastOptions {
    fn default() -> Self {
        Self {
            max_distance: f32::MAX,
            include_sensors: false,
            groups: CollisionGroups::ALL,
            exclude: Vec::new(),
        }
    }
}

impl RaycastOptions {
    pub fn with_max_distance(mut self, distance: f32) -> Self {
        self.max_distance = distance;
        self
    }

    pub fn with_sensors(mut self, include_sensors: bool) -> Self {
        self.include_sensors = include_sensors;
        self
    }

    pub fn with_groups(mut self, groups: CollisionGroups) -> Self {
        self.groups = groups;
        self
    }

    pub fn exclude(mut self, collider: ColliderHandle) -> Self {
        self.exclude.push(collider);
        self
    }
}

/// Read-only query interface over the physics world
pub struct PhysicsQuery<'a> {
    pub(crate) query_pipeline: &'a rapier::QueryPipeline,
    pub(crate) colliders: &'a rapier::ColliderSet,
    pub(crate) bodies: &'a rapier::RigidBodySet,
}

impl<'a> PhysicsQuery<'a> {
    /// Run `f` with a Rapier filter built from the options
    fn with_filter<R>(
        &self,
        groups: CollisionGroups,
        include_sensors: bool,
        exclude: &[ColliderHandle],
        f: impl FnOnce(rapier::QueryFilter<'_>) -> R,
    ) -> R {
        let not_excluded =
            |handle: rapier::ColliderHandle, _: &rapier::Collider| !exclude.iter().any(|c| c.0 == handle);

        let mut filter = rapier::QueryFilter::new().groups(groups.to_rapier());
        if !include_sensors {
            filter = filter.exclude_sensors();
        }
        if !exclude.is_empty() {
            filter = filter.predicate(&not_excluded);
        }
        f(filter)
    }

    fn make_hit(
        &self,
        handle: rapier::ColliderHandle,
        ray: &rapier::Ray,
        intersection: &RayIntersection,
        length: f32,
    ) -> RaycastHit {
        let point = ray.point_at(intersection.time_of_impact);
        let collider = self.colliders.get(handle);

        RaycastHit {
            collider: ColliderHandle(handle),
            body: collider.and_then(|c| c.parent()).map(RigidBodyHandle),
            point: [point.x, point.y, point.z],
            normal: [intersection.normal.x, intersection.normal.y, intersection.normal.z],
            distance: intersection.time_of_impact * length,
            fraction: intersection.time_of_impact,
            user_data: collider.map(|c| c.user_data).unwrap_or_default(),
        }
    }

    /// Closest hit along the segment from `origin` to `end`
    ///
    /// `options.max_distance` is ignored; the segment bounds the cast.
    pub fn cast_segment(&self, origin: [f32; 3], end: [f32; 3], options: &RaycastOptions) -> Option<RaycastHit> {
        let delta = rapier::Vector::new(end[0] - origin[0], end[1] - origin[1], end[2] - origin[2]);
        let length = delta.norm();
        if !length.is_finite() || length < MIN_SEGMENT_LENGTH {
            log::debug!("cast_segment: degenerate segment {origin:?} -> {end:?}");
            return None;
        }

        // Unnormalized direction: time of impact is the fraction along the segment
        let ray = rapier::Ray::new(rapier::Point::new(origin[0], origin[1], origin[2]), delta);

        let hit = self.with_filter(options.groups, options.include_sensors, &options.exclude, |filter| {
            self.query_pipeline
                .cast_ray_and_get_normal(self.bodies, self.colliders, &ray, 1.0, true, filter)
        });

        match hit {
            Some((handle, intersection)) => Some(self.make_hit(handle, &ray, &intersection, length)),
            None => {
                log::trace!("cast_segment: no hit between {origin:?} and {end:?}");
                None
            }
        }
    }

    /// Closest hit along a ray, up to `options.max_distance`
    pub fn raycast(&self, origin: [f32; 3], direction: [f32; 3], options: &RaycastOptions) -> Option<RaycastHit> {
        let dir = rapier::Vector::new(direction[0], direction[1], direction[2]);
        let dir = dir.try_normalize(MIN_SEGMENT_LENGTH)?;
        let ray = rapier::Ray::new(rapier::Point::new(origin[0], origin[1], origin[2]), dir);

        self.with_filter(options.groups, options.include_sensors, &options.exclude, |filter| {
            self.query_pipeline
                .cast_ray_and_get_normal(self.bodies, self.colliders, &ray, options.max_distance, true, filter)
        })
        .map(|(handle, intersection)| {
            let mut hit = self.make_hit(handle, &ray, &intersection, 1.0);
            hit.fraction = if options.max_distance.is_finite() && options.max_distance > 0.0 {
                hit.distance / options.max_distance
            } else {
                0.0
            };
            hit
        })
    }

    /// Every hit along a ray, nearest first
    pub fn raycast_all(&self, origin: [f32; 3], direction: [f32; 3], options: &RaycastOptions) -> Vec<RaycastHit> {
        let dir = rapier::Vector::new(direction[0], direction[1], direction[2]);
        let Some(dir) = dir.try_normalize(MIN_SEGMENT_LENGTH) else {
            return Vec::new();
        };
        let ray = rapier::Ray::new(rapier::Point::new(origin[0], origin[1], origin[2]), dir);

        let mut hits = Vec::new();
        self.with_filter(options.groups, options.include_sensors, &options.exclude, |filter| {
            self.query_pipeline.intersections_with_ray(
                self.bodies,
                self.colliders,
                &ray,
                options.max_distance,
                true,
                filter,
                |handle, intersection| {
                    hits.push(self.make_hit(handle, &ray, &intersection, 1.0));
                    true
                },
            );
        });

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// First collider containing `point`
    pub fn point_inside(&self, point: [f32; 3], groups: CollisionGroups) -> Option<ColliderHandle> {
        let point = rapier::Point::new(point[0], point[1], point[2]);

        let mut result = None;
        self.with_filter(groups, true, &[], |filter| {
            self.query_pipeline
                .intersections_with_point(self.bodies, self.colliders, &point, filter, |handle| {
                    result = Some(ColliderHandle(handle));
                    false
                });
        });
        result
    }

    /// Every collider overlapping `shape` placed at `position` / `rotation`
    pub fn overlap_shape(
        &self,
        shape: &ColliderShape,
        position: [f32; 3],
        rotation: [f32; 4],
        groups: CollisionGroups,
    ) -> Result<Vec<ColliderHandle>> {
        let rapier_shape = shape.to_rapier()?;
        let [x, y, z, w] = rotation;
        let pos = rapier::Isometry::from_parts(
            rapier::Translation::new(position[0], position[1], position[2]),
            UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z)),
        );

        let mut results = Vec::new();
        self.with_filter(groups, false, &[], |filter| {
            self.query_pipeline.intersections_with_shape(
                self.bodies,
                self.colliders,
                &pos,
                rapier_shape.as_ref(),
                filter,
                |handle| {
                    results.push(ColliderHandle(handle));
                    true
                },
            );
        });
        Ok(results)
    }
}
