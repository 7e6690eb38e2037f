//! Rigid body descriptions, handles and snapshots

use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Handle to a rigid body in the physics world
///
/// A generational index: a handle to a removed body never aliases a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub(crate) rapier::RigidBodyHandle);

impl RigidBodyHandle {
    pub fn from_raw(handle: rapier::RigidBodyHandle) -> Self {
        Self(handle)
    }
}

/// Type of rigid body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RigidBodyType {
    /// Never moves, infinite mass
    Static,
    /// Fully simulated
    #[default]
    Dynamic,
    /// Moved by setting its next position
    KinematicPositionBased,
    /// Moved by setting its velocity
    KinematicVelocityBased,
}

impl From<RigidBodyType> for rapier::RigidBodyType {
    fn from(t: RigidBodyType) -> Self {
        match t {
            RigidBodyType::Static => rapier::RigidBodyType::Fixed,
            RigidBodyType::Dynamic => rapier::RigidBodyType::Dynamic,
            RigidBodyType::KinematicPositionBased => rapier::RigidBodyType::KinematicPositionBased,
            RigidBodyType::KinematicVelocityBased => rapier::RigidBodyType::KinematicVelocityBased,
        }
    }
}

impl From<rapier::RigidBodyType> for RigidBodyType {
    fn from(t: rapier::RigidBodyType) -> Self {
        match t {
            rapier::RigidBodyType::Fixed => RigidBodyType::Static,
            rapier::RigidBodyType::Dynamic => RigidBodyType::Dynamic,
            rapier::RigidBodyType::KinematicPositionBased => RigidBodyType::KinematicPositionBased,
            rapier::RigidBodyType::KinematicVelocityBased => RigidBodyType::KinematicVelocityBased,
        }
    }
}

/// Whether a body is currently simulated or asleep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationState {
    Active,
    Sleeping,
}

impl ActivationState {
    pub fn is_sleeping(self) -> bool {
        matches!(self, Self::Sleeping)
    }
}

/// Description for creating a rigid body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RigidBodyDesc {
    pub body_type: RigidBodyType,
    /// Initial position
    pub position: [f32; 3],
    /// Initial rotation (quaternion: x, y, z, w)
    pub rotation: [f32; 4],
    pub linear_velocity: [f32; 3],
    pub angular_velocity: [f32; 3],
    /// Gravity scale (0 = no gravity, 1 = normal)
    pub gravity_scale: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Enable continuous collision detection
    pub ccd_enabled: bool,
    /// Can this body fall asleep when at rest
    pub can_sleep: bool,
    /// Start asleep
    pub sleeping: bool,
    /// Caller tag reported back in snapshots and ray hits
    pub user_data: u128,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            linear_velocity: [0.0, 0.0, 0.0],
            angular_velocity: [0.0, 0.0, 0.0],
            gravity_scale: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            ccd_enabled: false,
            can_sleep: true,
            sleeping: false,
            user_data: 0,
        }
    }
}

impl RigidBodyDesc {
    pub fn fixed() -> Self {
        Self {
            body_type: RigidBodyType::Static,
            ..Default::default()
        }
    }

    pub fn dynamic() -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            ..Default::default()
        }
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = [x, y, z];
        self
    }

    /// Set rotation from a quaternion given as `[x, y, z, w]`
    pub fn with_rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_sleeping(mut self, sleeping: bool) -> Self {
        self.sleeping = sleeping;
        self
    }

    pub fn with_user_data(mut self, data: u128) -> Self {
        self.user_data = data;
        self
    }

    pub(crate) fn rapier_isometry(&self) -> rapier::Isometry<f32> {
        let [x, y, z, w] = self.rotation;
        rapier::Isometry::from_parts(
            rapier::Translation::new(self.position[0], self.position[1], self.position[2]),
            UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z)),
        )
    }

    /// Build a Rapier rigid body builder
    ///
    /// World-level switches override the per-body CCD and sleep requests.
    pub(crate) fn to_rapier_builder(&self, ccd_allowed: bool, sleep_allowed: bool) -> rapier::RigidBodyBuilder {
        let mut builder = rapier::RigidBodyBuilder::new(self.body_type.into())
            .position(self.rapier_isometry())
            .linvel(rapier::Vector::new(
                self.linear_velocity[0],
                self.linear_velocity[1],
                self.linear_velocity[2],
            ))
            .angvel(rapier::Vector::new(
                self.angular_velocity[0],
                self.angular_velocity[1],
                self.angular_velocity[2],
            ))
            .gravity_scale(self.gravity_scale)
            .linear_damping(self.linear_damping)
            .angular_damping(self.angular_damping)
            .ccd_enabled(self.ccd_enabled && ccd_allowed)
            .can_sleep(self.can_sleep && sleep_allowed)
            .user_data(self.user_data);

        if self.sleeping && sleep_allowed {
            builder = builder.sleeping(true);
        }

        builder
    }
}

/// Read-only view of one body, as enumerated by the world each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub handle: RigidBodyHandle,
    pub body_type: RigidBodyType,
    /// World position
    pub position: [f32; 3],
    /// World rotation (quaternion: x, y, z, w)
    pub rotation: [f32; 4],
    pub user_data: u128,
    pub activation: ActivationState,
}

impl BodySnapshot {
    pub(crate) fn from_rapier(handle: rapier::RigidBodyHandle, body: &rapier::RigidBody) -> Self {
        let translation = body.translation();
        let rotation = body.rotation();
        Self {
            handle: RigidBodyHandle(handle),
            body_type: body.body_type().into(),
            position: [translation.x, translation.y, translation.z],
            rotation: [rotation.i, rotation.j, rotation.k, rotation.w],
            user_data: body.user_data,
            activation: if body.is_sleeping() {
                ActivationState::Sleeping
            } else {
                ActivationState::Active
            },
        }
    }

    pub fn is_sleeping(&self) -> bool {
        self.activation.is_sleeping()
    }
}
