//! Error types for the physics facade

use thiserror::Error;

/// Physics system errors
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Rigid body not found
    #[error("Rigid body not found: {0:?}")]
    BodyNotFound(crate::body::RigidBodyHandle),

    /// Collider not found
    #[error("Collider not found: {0:?}")]
    ColliderNotFound(crate::collider::ColliderHandle),

    /// Joint not found
    #[error("Joint not found: {0:?}")]
    JointNotFound(crate::joint::JointHandle),

    /// A pair query was given the same body twice
    #[error("Contact pair test needs two distinct bodies, got {0:?} twice")]
    InvalidPair(crate::body::RigidBodyHandle),

    /// Invalid configuration
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),

    /// Invalid collision layer
    #[error("Invalid collision layer: {0}")]
    InvalidLayer(String),

    /// Shape creation failed
    #[error("Failed to create collision shape: {0}")]
    ShapeCreationFailed(String),

    /// Joint description cannot be built
    #[error("Failed to create joint: {0}")]
    JointFailed(String),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
