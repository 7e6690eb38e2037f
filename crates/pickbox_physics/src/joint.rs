//! Joints between pairs of rigid bodies

use crate::error::{PhysicsError, Result};
use rapier3d::na::Unit;
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Handle to an impulse joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointHandle(pub(crate) rapier::ImpulseJointHandle);

/// Kind of constraint a joint enforces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JointKind {
    /// No relative motion
    Fixed,
    /// Shared anchor, free rotation
    Spherical,
    /// Shared anchor, rotation about one axis
    Revolute { axis: [f32; 3] },
}

/// Description for creating a joint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointDesc {
    pub kind: JointKind,
    /// Anchor in the first body's local frame
    pub local_anchor1: [f32; 3],
    /// Anchor in the second body's local frame
    pub local_anchor2: [f32; 3],
    /// Whether the two joined bodies still collide with each other
    pub contacts_enabled: bool,
}

impl JointDesc {
    pub fn new(kind: JointKind) -> Self {
        Self {
            kind,
            local_anchor1: [0.0; 3],
            local_anchor2: [0.0; 3],
            contacts_enabled: true,
        }
    }

    pub fn fixed() -> Self {
        Self::new(JointKind::Fixed)
    }

    pub fn spherical() -> Self {
        Self::new(JointKind::Spherical)
    }

    pub fn revolute(axis: [f32; 3]) -> Self {
        Self::new(JointKind::Revolute { axis })
    }

    pub fn with_anchors(mut self, local_anchor1: [f32; 3], local_anchor2: [f32; 3]) -> Self {
        self.local_anchor1 = local_anchor1;
        self.local_anchor2 = local_anchor2;
        self
    }

    pub fn with_contacts_enabled(mut self, enabled: bool) -> Self {
        self.contacts_enabled = enabled;
        self
    }

    pub(crate) fn to_rapier(&self) -> Result<rapier::GenericJoint> {
        if !self
            .local_anchor1
            .iter()
            .chain(self.local_anchor2.iter())
            .all(|v| v.is_finite())
        {
            return Err(PhysicsError::JointFailed("anchors must be finite".into()));
        }

        let a1 = rapier::Point::new(self.local_anchor1[0], self.local_anchor1[1], self.local_anchor1[2]);
        let a2 = rapier::Point::new(self.local_anchor2[0], self.local_anchor2[1], self.local_anchor2[2]);

        let mut joint: rapier::GenericJoint = match self.kind {
            JointKind::Fixed => rapier::FixedJointBuilder::new()
                .local_anchor1(a1)
                .local_anchor2(a2)
                .build()
                .into(),
            JointKind::Spherical => rapier::SphericalJointBuilder::new()
                .local_anchor1(a1)
                .local_anchor2(a2)
                .build()
                .into(),
            JointKind::Revolute { axis } => {
                let axis = Unit::try_new(rapier::Vector::new(axis[0], axis[1], axis[2]), 1.0e-6)
                    .ok_or_else(|| PhysicsError::JointFailed("revolute axis has zero length".into()))?;
                rapier::RevoluteJointBuilder::new(axis)
                    .local_anchor1(a1)
                    .local_anchor2(a2)
                    .build()
                    .into()
            }
        };

        joint.contacts_enabled = self.contacts_enabled;
        Ok(joint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contacts_flag_is_carried() {
        let joint = JointDesc::fixed().with_contacts_enabled(false).to_rapier().unwrap();
        assert!(!joint.contacts_enabled);

        let joint = JointDesc::spherical().to_rapier().unwrap();
        assert!(joint.contacts_enabled);
    }

    #[test]
    fn test_zero_axis_is_rejected() {
        let result = JointDesc::revolute([0.0, 0.0, 0.0]).to_rapier();
        assert!(matches!(result, Err(PhysicsError::JointFailed(_))));
        assert!(JointDesc::revolute([0.0, 1.0, 0.0]).to_rapier().is_ok());
    }

    #[test]
    fn test_non_finite_anchor_is_rejected() {
        let result = JointDesc::fixed()
            .with_anchors([f32::NAN, 0.0, 0.0], [0.0; 3])
            .to_rapier();
        assert!(result.is_err());
    }
}
