//! Collision layers and group/mask filtering

use crate::error::{PhysicsError, Result};
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A collision layer identifier (bit index, 0..32)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionLayer(pub u32);

impl CollisionLayer {
    /// Default layer
    pub const DEFAULT: Self = Self(0);
    /// Static ground and environment
    pub const GROUND: Self = Self(1);
    /// Dynamic cubes
    pub const CUBES: Self = Self(2);
    /// Contact sensors
    pub const SENSORS: Self = Self(3);
    /// Objects the picking ray may hit
    pub const PICKABLE: Self = Self(4);

    /// Create a custom layer; `id` must be below 32
    pub fn custom(id: u32) -> Result<Self> {
        if id >= 32 {
            return Err(PhysicsError::InvalidLayer(format!("layer index {id} out of range")));
        }
        Ok(Self(id))
    }

    /// Get the layer as a bitmask
    pub fn as_mask(&self) -> u32 {
        1 << self.0
    }
}

impl Default for CollisionLayer {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Collision group/mask pair
///
/// Two objects interact when each one's memberships intersect the other's
/// filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionGroups {
    /// Which groups this object belongs to
    pub memberships: u32,
    /// Which groups this object can collide with
    pub filter: u32,
}

impl CollisionGroups {
    /// Collide with everything
    pub const ALL: Self = Self {
        memberships: u32::MAX,
        filter: u32::MAX,
    };

    /// Collide with nothing
    pub const NONE: Self = Self {
        memberships: 0,
        filter: 0,
    };

    pub fn new(memberships: u32, filter: u32) -> Self {
        Self { memberships, filter }
    }

    /// Membership in one layer, colliding with the listed layers
    pub fn from_layer(layer: CollisionLayer, collides_with: &[CollisionLayer]) -> Self {
        let filter = collides_with.iter().fold(0u32, |acc, l| acc | l.as_mask());
        Self {
            memberships: layer.as_mask(),
            filter,
        }
    }

    /// Check if two groups can collide
    pub fn can_collide(&self, other: &CollisionGroups) -> bool {
        (self.memberships & other.filter) != 0 && (other.memberships & self.filter) != 0
    }

    pub fn add_membership(mut self, layer: CollisionLayer) -> Self {
        self.memberships |= layer.as_mask();
        self
    }

    pub(crate) fn to_rapier(self) -> rapier::InteractionGroups {
        rapier::InteractionGroups::new(
            rapier::Group::from_bits_truncate(self.memberships),
            rapier::Group::from_bits_truncate(self.filter),
        )
    }

    pub(crate) fn from_rapier(groups: rapier::InteractionGroups) -> Self {
        Self {
            memberships: groups.memberships.bits(),
            filter: groups.filter.bits(),
        }
    }
}

impl Default for CollisionGroups {
    fn default() -> Self {
        Self::ALL
    }
}

/// Named layers plus the rules for which layers collide
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionMatrix {
    layer_names: HashMap<String, CollisionLayer>,
    rules: HashMap<CollisionLayer, Vec<CollisionLayer>>,
}

impl Default for CollisionMatrix {
    fn default() -> Self {
        let mut matrix = Self::new();

        matrix.register_layer("default", CollisionLayer::DEFAULT);
        matrix.register_layer("ground", CollisionLayer::GROUND);
        matrix.register_layer("cubes", CollisionLayer::CUBES);
        matrix.register_layer("sensors", CollisionLayer::SENSORS);
        matrix.register_layer("pickable", CollisionLayer::PICKABLE);

        matrix.set_collides_with(CollisionLayer::GROUND, &[
            CollisionLayer::DEFAULT,
            CollisionLayer::CUBES,
            CollisionLayer::SENSORS,
        ]);

        matrix.set_collides_with(CollisionLayer::CUBES, &[
            CollisionLayer::DEFAULT,
            CollisionLayer::GROUND,
            CollisionLayer::CUBES,
            CollisionLayer::SENSORS,
        ]);

        // Sensors only watch the simulated world, never each other
        matrix.set_collides_with(CollisionLayer::SENSORS, &[
            CollisionLayer::GROUND,
            CollisionLayer::CUBES,
        ]);

        matrix
    }
}

impl CollisionMatrix {
    /// Create an empty collision matrix
    pub fn new() -> Self {
        Self {
            layer_names: HashMap::new(),
            rules: HashMap::new(),
        }
    }

    pub fn register_layer(&mut self, name: &str, layer: CollisionLayer) {
        self.layer_names.insert(name.to_string(), layer);
    }

    pub fn get_layer(&self, name: &str) -> Option<CollisionLayer> {
        self.layer_names.get(name).copied()
    }

    /// Set which layers a given layer collides with
    pub fn set_collides_with(&mut self, layer: CollisionLayer, collides_with: &[CollisionLayer]) {
        self.rules.insert(layer, collides_with.to_vec());
    }

    /// Collision groups for a layer; layers without rules collide with all
    pub fn get_groups(&self, layer: CollisionLayer) -> CollisionGroups {
        let filter = self
            .rules
            .get(&layer)
            .map(|layers| layers.iter().fold(0u32, |acc, l| acc | l.as_mask()))
            .unwrap_or(u32::MAX);

        CollisionGroups {
            memberships: layer.as_mask(),
            filter,
        }
    }

    /// Collision groups by layer name
    pub fn groups_by_name(&self, name: &str) -> Result<CollisionGroups> {
        self.get_layer(name)
            .map(|layer| self.get_groups(layer))
            .ok_or_else(|| PhysicsError::InvalidLayer(name.to_string()))
    }

    /// Check if two layers can collide
    pub fn can_collide(&self, a: CollisionLayer, b: CollisionLayer) -> bool {
        self.get_groups(a).can_collide(&self.get_groups(b))
    }
}
