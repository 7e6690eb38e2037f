//! Collider shapes and descriptions

use crate::error::{PhysicsError, Result};
use crate::layers::CollisionGroups;
use crate::material::PhysicsMaterial;
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::parry::transformation::try_convex_hull;
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Handle to a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub(crate) rapier::ColliderHandle);

impl ColliderHandle {
    pub fn from_raw(handle: rapier::ColliderHandle) -> Self {
        Self(handle)
    }
}

/// Collision shape type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    /// Box with half-extents
    Box { half_extents: [f32; 3] },
    /// Capsule aligned along Y
    CapsuleY { half_height: f32, radius: f32 },
    /// Cylinder aligned along Y
    CylinderY { half_height: f32, radius: f32 },
    /// Convex hull of a point cloud
    ConvexHull { points: Vec<[f32; 3]> },
}

impl Default for ColliderShape {
    fn default() -> Self {
        Self::Box {
            half_extents: [0.5, 0.5, 0.5],
        }
    }
}

impl ColliderShape {
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Box from half-extents
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::Box {
            half_extents: [hx, hy, hz],
        }
    }

    /// Axis-aligned cube with equal half-extents
    pub fn cube(half_extent: f32) -> Self {
        Self::cuboid(half_extent, half_extent, half_extent)
    }

    fn check_extent(name: &str, value: f32) -> Result<()> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(PhysicsError::ShapeCreationFailed(format!(
                "{name} must be positive and finite, got {value}"
            )))
        }
    }

    /// Build a Rapier shared shape
    pub(crate) fn to_rapier(&self) -> Result<rapier::SharedShape> {
        match self {
            Self::Sphere { radius } => {
                Self::check_extent("radius", *radius)?;
                Ok(rapier::SharedShape::ball(*radius))
            }
            Self::Box { half_extents } => {
                for extent in half_extents {
                    Self::check_extent("half extent", *extent)?;
                }
                Ok(rapier::SharedShape::cuboid(half_extents[0], half_extents[1], half_extents[2]))
            }
            Self::CapsuleY { half_height, radius } => {
                Self::check_extent("radius", *radius)?;
                Ok(rapier::SharedShape::capsule_y(*half_height, *radius))
            }
            Self::CylinderY { half_height, radius } => {
                Self::check_extent("half height", *half_height)?;
                Self::check_extent("radius", *radius)?;
                Ok(rapier::SharedShape::cylinder(*half_height, *radius))
            }
            Self::ConvexHull { points } => {
                let degenerate = |why: String| {
                    PhysicsError::ShapeCreationFailed(format!("convex hull of {} points: {why}", points.len()))
                };
                if points.len() < 4 {
                    return Err(degenerate("needs at least 4 points".to_string()));
                }
                if points.iter().flatten().any(|c| !c.is_finite()) {
                    return Err(degenerate("non-finite point".to_string()));
                }

                let rapier_points: Vec<_> = points
                    .iter()
                    .map(|p| rapier::Point::new(p[0], p[1], p[2]))
                    .collect();
                let (vertices, indices) =
                    try_convex_hull(&rapier_points).map_err(|err| degenerate(format!("{err:?}")))?;

                // Flat and collinear input comes back from Parry as a zero-volume mesh
                let scale = points.iter().flatten().fold(0.0f32, |m, c| m.max(c.abs())).max(1.0);
                if hull_volume(&vertices, &indices) <= f32::EPSILON * scale.powi(3) {
                    return Err(degenerate("points are coplanar".to_string()));
                }
                rapier::SharedShape::convex_mesh(vertices, &indices)
                    .ok_or_else(|| degenerate("hull is flat or inconsistent".to_string()))
            }
        }
    }
}

/// Volume enclosed by a closed, outward-wound triangle mesh
fn hull_volume(vertices: &[rapier::Point<f32>], indices: &[[u32; 3]]) -> f32 {
    let six_v: f32 = indices
        .iter()
        .map(|[a, b, c]| {
            let (a, b, c) = (
                vertices[*a as usize].coords,
                vertices[*b as usize].coords,
                vertices[*c as usize].coords,
            );
            a.dot(&b.cross(&c))
        })
        .sum();
    six_v.abs() / 6.0
}

/// Description for creating a collider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColliderDesc {
    pub shape: ColliderShape,
    /// Position offset from the parent body
    pub position_offset: [f32; 3],
    /// Rotation offset (quaternion: x, y, z, w)
    pub rotation_offset: [f32; 4],
    /// Sensors report overlaps but produce no contact forces
    pub is_sensor: bool,
    pub material: PhysicsMaterial,
    pub collision_groups: CollisionGroups,
    /// Which colliders exchange contact forces with this one
    pub solver_groups: CollisionGroups,
    pub user_data: u128,
}

impl Default for ColliderDesc {
    fn default() -> Self {
        Self {
            shape: ColliderShape::default(),
            position_offset: [0.0, 0.0, 0.0],
            rotation_offset: [0.0, 0.0, 0.0, 1.0],
            is_sensor: false,
            material: PhysicsMaterial::default(),
            collision_groups: CollisionGroups::ALL,
            solver_groups: CollisionGroups::ALL,
            user_data: 0,
        }
    }
}

impl ColliderDesc {
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            ..Default::default()
        }
    }

    /// Create a sensor (trigger volume)
    pub fn sensor(shape: ColliderShape) -> Self {
        Self {
            shape,
            is_sensor: true,
            ..Default::default()
        }
    }

    pub fn with_offset(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position_offset = [x, y, z];
        self
    }

    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn with_collision_groups(mut self, groups: CollisionGroups) -> Self {
        self.collision_groups = groups;
        self
    }

    pub fn with_user_data(mut self, data: u128) -> Self {
        self.user_data = data;
        self
    }

    /// Build a Rapier collider builder
    pub(crate) fn to_rapier_builder(&self) -> Result<rapier::ColliderBuilder> {
        let [x, y, z, w] = self.rotation_offset;
        let offset = rapier::Isometry::from_parts(
            rapier::Translation::new(
                self.position_offset[0],
                self.position_offset[1],
                self.position_offset[2],
            ),
            UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z)),
        );

        Ok(rapier::ColliderBuilder::new(self.shape.to_rapier()?)
            .position(offset)
            .sensor(self.is_sensor)
            .friction(self.material.friction)
            .friction_combine_rule(self.material.friction_combine.into())
            .restitution(self.material.restitution)
            .restitution_combine_rule(self.material.restitution_combine.into())
            .density(self.material.density)
            .collision_groups(self.collision_groups.to_rapier())
            .solver_groups(self.solver_groups.to_rapier())
            .user_data(self.user_data))
    }
}
