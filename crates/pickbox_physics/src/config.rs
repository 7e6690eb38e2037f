//! Physics configuration

use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};

/// Physics world configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.81 in Y)
    pub gravity: [f32; 3],

    /// Fixed timestep for physics simulation
    pub timestep: f32,

    /// Maximum number of fixed steps run for one `step(dt)` call
    pub max_substeps: u32,

    /// Allow continuous collision detection on bodies that request it
    pub ccd_enabled: bool,

    /// Solver iterations
    pub solver_iterations: usize,

    /// Allow bodies to fall asleep when they come to rest
    pub sleeping_enabled: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            timestep: 1.0 / 60.0,
            max_substeps: 4,
            ccd_enabled: true,
            solver_iterations: 4,
            sleeping_enabled: true,
        }
    }
}

impl PhysicsConfig {
    /// Create a configuration for high-precision simulation
    pub fn high_precision() -> Self {
        Self {
            solver_iterations: 8,
            max_substeps: 8,
            ..Default::default()
        }
    }

    /// Create a configuration for fast simulation (lower quality)
    pub fn fast() -> Self {
        Self {
            solver_iterations: 2,
            max_substeps: 2,
            ccd_enabled: false,
            ..Default::default()
        }
    }

    /// Set timestep
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    /// Reject values the stepper cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.max_substeps == 0 {
            return Err(PhysicsError::InvalidConfig("max_substeps must be at least 1".into()));
        }
        if self.solver_iterations == 0 {
            return Err(PhysicsError::InvalidConfig("solver_iterations must be at least 1".into()));
        }
        if !self.gravity.iter().all(|g| g.is_finite()) {
            return Err(PhysicsError::InvalidConfig("gravity must be finite".into()));
        }
        Ok(())
    }
}
