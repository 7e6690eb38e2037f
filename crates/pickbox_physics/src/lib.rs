//! Pickbox Physics - Rapier 3D facade
//!
//! Owns the simulation state and exposes what the picking demo needs from it.
//!
//! # Features
//!
//! - Rigid bodies (fixed and dynamic) with per-frame snapshots
//! - Colliders, collision layers and physics materials
//! - Joints with an optional "no contacts between joined bodies" flag
//! - Segment and ray casts, point and shape overlap
//! - Pairwise contact tests driven by a [`ContactResultCallback`]
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │                   PhysicsWorld                    │
//! │  ┌─────────────┐  ┌─────────────┐  ┌───────────┐  │
//! │  │ RigidBodySet│  │ ColliderSet │  │ JointSet  │  │
//! │  └─────────────┘  └─────────────┘  └───────────┘  │
//! │  ┌─────────────────────────────────────────────┐  │
//! │  │        PhysicsPipeline (fixed step)         │  │
//! │  └─────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────┘
//!          │                              │
//!          ▼                              ▼
//!   ┌─────────────┐            ┌─────────────────────┐
//!   │ PhysicsQuery│            │  contact_pair_test  │
//!   │ cast_segment│            │ContactResultCallback│
//!   └─────────────┘            └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pickbox_physics::prelude::*;
//!
//! let mut physics = PhysicsWorld::new(PhysicsConfig::default());
//!
//! let a = physics.create_rigid_body(RigidBodyDesc::dynamic());
//! physics.create_collider(ColliderDesc::new(ColliderShape::cube(1.0)), Some(a))?;
//! let b = physics.create_rigid_body(RigidBodyDesc::dynamic().with_position(1.5, 0.0, 0.0));
//! physics.create_collider(ColliderDesc::new(ColliderShape::cube(1.0)), Some(b))?;
//!
//! let mut sensor = ContactSensor::new(a, "left cube");
//! physics.contact_pair_test(a, b, &mut sensor)?;
//! let report = sensor.into_report();
//! ```

pub mod body;
pub mod collider;
pub mod config;
pub mod contact;
pub mod error;
pub mod joint;
pub mod layers;
pub mod material;
pub mod query;
pub mod world;

pub mod prelude {
    //! Common imports for physics functionality
    pub use crate::body::{ActivationState, BodySnapshot, RigidBodyDesc, RigidBodyHandle, RigidBodyType};
    pub use crate::collider::{ColliderDesc, ColliderHandle, ColliderShape};
    pub use crate::config::PhysicsConfig;
    pub use crate::contact::{
        ContactProxy, ContactRecord, ContactReport, ContactResultCallback, ContactSensor, ContactSide,
        FnContactCallback, ManifoldPoint,
    };
    pub use crate::error::{PhysicsError, Result};
    pub use crate::joint::{JointDesc, JointHandle, JointKind};
    pub use crate::layers::{CollisionGroups, CollisionLayer, CollisionMatrix};
    pub use crate::material::{CombineRule, PhysicsMaterial};
    pub use crate::query::{PhysicsQuery, RaycastHit, RaycastOptions};
    pub use crate::world::PhysicsWorld;
}

pub use prelude::*;
