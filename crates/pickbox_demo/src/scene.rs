//! Demo scene: a static ground slab and a stack of dynamic cubes

use crate::config::{PickingConfig, SceneConfig, SensorConfig};
use crate::error::{DemoError, Result};
use pickbox_physics::prelude::*;

/// User tag of the ground body
pub const GROUND_TAG: u128 = u128::MAX;

/// User tag of the cube created at `index` (0-based)
pub fn cube_tag(index: usize) -> u128 {
    index as u128 + 1
}

/// Handles of the bodies the demo created
#[derive(Debug, Clone)]
pub struct Scene {
    pub ground: RigidBodyHandle,
    pub cubes: Vec<RigidBodyHandle>,
    pub cube_half_extent: f32,
    pub ground_half_extent: f32,
}

impl Scene {
    /// Populate `world` with the ground and the cube stack
    ///
    /// The stack is centred on the origin in X and Z and rests `drop_height`
    /// above the ground, so the cubes settle during the first second.
    pub fn build(world: &mut PhysicsWorld, config: &SceneConfig, picking: &PickingConfig) -> Result<Self> {
        let matrix = CollisionMatrix::default();

        let mut ground_groups = matrix.get_groups(CollisionLayer::GROUND);
        if picking.ground_pickable {
            ground_groups = ground_groups.add_membership(CollisionLayer::PICKABLE);
        }
        let cube_groups = matrix
            .get_groups(CollisionLayer::CUBES)
            .add_membership(CollisionLayer::PICKABLE);

        let g = config.ground_half_extent;
        let ground = world.create_rigid_body(
            RigidBodyDesc::fixed()
                .with_position(0.0, -g, 0.0)
                .with_user_data(GROUND_TAG),
        );
        world.create_collider(
            ColliderDesc::new(ColliderShape::cube(g))
                .with_material(PhysicsMaterial::ground())
                .with_collision_groups(ground_groups)
                .with_user_data(GROUND_TAG),
            Some(ground),
        )?;

        let [nx, ny, nz] = config.stack;
        let half = config.cube_half_extent;
        let offset = |n: u32, i: u32| (i as f32 - (n as f32 - 1.0) * 0.5) * config.spacing;

        let mut cubes = Vec::with_capacity(config.cube_count());
        for layer in 0..ny {
            for i in 0..nx {
                for k in 0..nz {
                    let tag = cube_tag(cubes.len());
                    let y = config.drop_height + half + layer as f32 * config.spacing;
                    let body = world.create_rigid_body(
                        RigidBodyDesc::dynamic()
                            .with_position(offset(nx, i), y, offset(nz, k))
                            .with_user_data(tag),
                    );
                    world.create_collider(
                        ColliderDesc::new(ColliderShape::cube(half))
                            .with_material(PhysicsMaterial::crate_box())
                            .with_collision_groups(cube_groups)
                            .with_user_data(tag),
                        Some(body),
                    )?;
                    cubes.push(body);
                }
            }
        }

        world.sync_query_pipeline();
        log::info!("Scene built: ground + {} cubes", cubes.len());

        Ok(Self {
            ground,
            cubes,
            cube_half_extent: half,
            ground_half_extent: g,
        })
    }

    /// Ground first, then cubes in creation order
    pub fn body(&self, index: usize) -> Option<RigidBodyHandle> {
        match index {
            0 => Some(self.ground),
            i => self.cubes.get(i - 1).copied(),
        }
    }

    pub fn body_count(&self) -> usize {
        self.cubes.len() + 1
    }

    pub fn is_ground(&self, handle: RigidBodyHandle) -> bool {
        handle == self.ground
    }

    /// Resolve the configured sensor pair as `(monitored, other)`
    pub fn sensor_pair(&self, sensor: &SensorConfig) -> Result<(RigidBodyHandle, RigidBodyHandle)> {
        let lookup = |index: usize| {
            self.body(index).ok_or(DemoError::SceneTooSmall {
                index,
                bodies: self.body_count(),
            })
        };
        Ok((lookup(sensor.monitored)?, lookup(sensor.other)?))
    }

    /// Half extent to draw a body with
    pub fn half_extent_of(&self, handle: RigidBodyHandle) -> f32 {
        if self.is_ground(handle) {
            self.ground_half_extent
        } else {
            self.cube_half_extent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_scene(world: &mut PhysicsWorld) -> Scene {
        let config = SceneConfig {
            stack: [2, 3, 1],
            ..Default::default()
        };
        Scene::build(world, &config, &PickingConfig::default()).unwrap()
    }

    #[test]
    fn test_build_creates_tagged_bodies() {
        let mut world = PhysicsWorld::default();
        let scene = small_scene(&mut world);

        assert_eq!(scene.cubes.len(), 6);
        assert_eq!(world.body_count(), 7);
        assert_eq!(world.body(scene.ground).unwrap().user_data, GROUND_TAG);
        assert_eq!(world.body(scene.cubes[0]).unwrap().user_data, 1);
        assert_eq!(world.body(scene.cubes[5]).unwrap().user_data, 6);
    }

    #[test]
    fn test_stack_rests_above_ground() {
        let mut world = PhysicsWorld::default();
        let scene = small_scene(&mut world);

        let ground = world.body(scene.ground).unwrap();
        assert_eq!(ground.position, [0.0, -50.0, 0.0]);

        for cube in &scene.cubes {
            let y = world.get_body_position(*cube).unwrap()[1];
            assert!(y >= 2.0 - 1e-6, "cube below the drop height: {y}");
        }
        let xs: Vec<f32> = scene
            .cubes
            .iter()
            .map(|c| world.get_body_position(*c).unwrap()[0])
            .collect();
        assert!(xs.contains(&-1.0) && xs.contains(&1.0));
    }

    #[test]
    fn test_sensor_pair_out_of_range() {
        let mut world = PhysicsWorld::default();
        let scene = small_scene(&mut world);

        let (monitored, other) = scene.sensor_pair(&SensorConfig::default()).unwrap();
        assert_eq!(monitored, scene.ground);
        assert_eq!(other, scene.cubes[0]);

        let sensor = SensorConfig {
            other: 7,
            ..Default::default()
        };
        assert!(matches!(
            scene.sensor_pair(&sensor),
            Err(DemoError::SceneTooSmall { index: 7, bodies: 7 })
        ));
    }
}
