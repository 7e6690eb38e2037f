//! Error types for camera and unprojection math

use thiserror::Error;

/// Invalid camera state
///
/// Raised instead of letting NaNs flow into a picking ray.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CameraError {
    /// Viewport with a zero dimension
    #[error("Invalid viewport: {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    /// Projection parameters that cannot form a perspective frustum
    #[error("Invalid projection: {0}")]
    InvalidProjection(String),

    /// Projection or view matrix is not invertible
    #[error("Singular {0} matrix")]
    SingularMatrix(&'static str),

    /// Unprojection produced a non-finite point or a zero-length direction
    #[error("Unprojection produced a degenerate ray")]
    NonFinite,
}

/// Result type for camera operations
pub type Result<T> = std::result::Result<T, CameraError>;
