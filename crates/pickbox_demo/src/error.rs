//! Demo error type

use pickbox_math::CameraError;
use pickbox_physics::PhysicsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Physics(#[from] PhysicsError),

    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid demo configuration: {0}")]
    InvalidConfig(String),

    /// A sensor body index points past the scene's body list
    #[error("Sensor body index {index} is out of range for a scene of {bodies} bodies")]
    SceneTooSmall { index: usize, bodies: usize },
}

pub type Result<T> = std::result::Result<T, DemoError>;
