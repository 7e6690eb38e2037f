//! Surface materials for colliders

use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Friction, restitution and density applied to a collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsMaterial {
    /// Friction coefficient (0 = frictionless)
    pub friction: f32,
    /// Restitution (0 = no bounce, 1 = perfect bounce)
    pub restitution: f32,
    /// Density used for mass computation
    pub density: f32,
    pub friction_combine: CombineRule,
    pub restitution_combine: CombineRule,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            friction: 0.5,
            restitution: 0.0,
            density: 1.0,
            friction_combine: CombineRule::Average,
            restitution_combine: CombineRule::Average,
        }
    }
}

impl PhysicsMaterial {
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
            ..Default::default()
        }
    }

    /// Heavy, grippy and dead: suits a static floor
    pub fn ground() -> Self {
        Self {
            friction: 0.8,
            restitution: 0.0,
            density: 2.5,
            friction_combine: CombineRule::Max,
            ..Default::default()
        }
    }

    /// Stackable crate material
    pub fn crate_box() -> Self {
        Self {
            friction: 0.6,
            restitution: 0.05,
            density: 1.0,
            ..Default::default()
        }
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution.clamp(0.0, 1.0);
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density.max(0.001);
        self
    }

    /// Effective friction between two materials
    pub fn combine_friction(&self, other: &PhysicsMaterial) -> f32 {
        let rule = self.friction_combine.max_priority(other.friction_combine);
        rule.combine(self.friction, other.friction)
    }

    /// Effective restitution between two materials
    pub fn combine_restitution(&self, other: &PhysicsMaterial) -> f32 {
        let rule = self.restitution_combine.max_priority(other.restitution_combine);
        rule.combine(self.restitution, other.restitution)
    }
}

/// Rule for combining a coefficient of two touching colliders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CombineRule {
    #[default]
    Average,
    Min,
    Multiply,
    Max,
}

impl CombineRule {
    /// The rule that wins when two colliders disagree
    ///
    /// Same precedence as the engine: Max > Multiply > Min > Average.
    pub fn max_priority(self, other: Self) -> Self {
        if other.priority() > self.priority() {
            other
        } else {
            self
        }
    }

    fn priority(self) -> u8 {
        match self {
            Self::Average => 0,
            Self::Min => 1,
            Self::Multiply => 2,
            Self::Max => 3,
        }
    }

    pub fn combine(self, a: f32, b: f32) -> f32 {
        match self {
            Self::Average => (a + b) * 0.5,
            Self::Min => a.min(b),
            Self::Max => a.max(b),
            Self::Multiply => a * b,
        }
    }
}

impl From<CombineRule> for rapier::CoefficientCombineRule {
    fn from(rule: CombineRule) -> Self {
        match rule {
            CombineRule::Average => rapier::CoefficientCombineRule::Average,
            CombineRule::Min => rapier::CoefficientCombineRule::Min,
            CombineRule::Multiply => rapier::CoefficientCombineRule::Multiply,
            CombineRule::Max => rapier::CoefficientCombineRule::Max,
        }
    }
}
