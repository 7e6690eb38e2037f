//! Integration tests for pickbox_physics
//!
//! Pairwise contact reporting, segment casts and body snapshots

use approx::assert_abs_diff_eq;
use pickbox_physics::prelude::*;

fn cube(world: &mut PhysicsWorld, desc: RigidBodyDesc, half: f32) -> RigidBodyHandle {
    let body = world.create_rigid_body(desc);
    world
        .create_collider(ColliderDesc::new(ColliderShape::cube(half)), Some(body))
        .unwrap();
    body
}

fn cube_at(world: &mut PhysicsWorld, x: f32, y: f32, z: f32) -> RigidBodyHandle {
    cube(world, RigidBodyDesc::dynamic().with_position(x, y, z), 1.0)
}

#[test]
fn test_separated_bodies_report_nothing() {
    let mut world = PhysicsWorld::default();
    let a = cube_at(&mut world, 0.0, 0.0, 0.0);
    let b = cube_at(&mut world, 5.0, 0.0, 0.0);

    let mut sensor = ContactSensor::new(a, ());
    let count = world.contact_pair_test(a, b, &mut sensor).unwrap();

    assert_eq!(count, 0);
    assert!(sensor.into_report().is_empty());
}

#[test]
fn test_overlapping_bodies_report_points_in_monitored_frame() {
    let mut world = PhysicsWorld::default();
    let a = cube_at(&mut world, 10.0, 0.0, 0.0);
    let b = cube_at(&mut world, 11.5, 0.0, 0.0);

    let mut sensor = ContactSensor::new(a, 17u32);
    let count = world.contact_pair_test(a, b, &mut sensor).unwrap();
    let report = sensor.into_report();

    assert!(count >= 1);
    assert_eq!(report.len(), count);
    assert_eq!(report.context, 17);
    assert_eq!(report.touching_bodies(), vec![b]);

    for record in &report.contacts {
        // A-local, not world: A sits at x = 10
        assert!(record.local_point[0] > 0.4, "local point {:?}", record.local_point);
        assert!(record.local_point[0] < 1.5);
        assert!(record.world_point[0] > 10.4);
        assert_abs_diff_eq!(record.normal[0], 1.0, epsilon = 1e-4);
        assert!(record.distance < 0.0);
        assert_eq!(record.other_body, b);
    }
}

#[test]
fn test_distance_threshold_reports_near_misses() {
    let mut world = PhysicsWorld::default();
    let a = cube_at(&mut world, 0.0, 0.0, 0.0);
    let b = cube_at(&mut world, 2.01, 0.0, 0.0);

    let mut exact = ContactSensor::new(a, ());
    assert_eq!(world.contact_pair_test(a, b, &mut exact).unwrap(), 0);

    let mut near = ContactSensor::new(a, ()).with_distance_threshold(0.05);
    assert!(world.contact_pair_test(a, b, &mut near).unwrap() >= 1);
    for record in near.contacts() {
        assert!(record.distance > 0.0 && record.distance <= 0.05);
        assert_eq!(record.depth(), 0.0);
    }
}

#[test]
fn test_monitoring_second_body_uses_its_own_side() {
    let mut world = PhysicsWorld::default();
    let a = cube_at(&mut world, 0.0, 0.0, 0.0);
    let b = cube_at(&mut world, 1.5, 0.0, 0.0);

    let mut sensor = ContactSensor::new(b, ());
    world.contact_pair_test(a, b, &mut sensor).unwrap();
    let report = sensor.into_report();

    assert!(!report.is_empty());
    for record in &report.contacts {
        assert!(record.local_point[0] < -0.4, "local point {:?}", record.local_point);
        assert_abs_diff_eq!(record.normal[0], -1.0, epsilon = 1e-4);
        assert_eq!(record.other_body, a);
    }
}

#[test]
fn test_local_point_follows_body_rotation() {
    let mut world = PhysicsWorld::default();
    let half_angle = std::f32::consts::FRAC_PI_4;
    // 90 degrees about +Y: world +X is the body's local +Z
    let a = cube(
        &mut world,
        RigidBodyDesc::dynamic().with_rotation([0.0, half_angle.sin(), 0.0, half_angle.cos()]),
        1.0,
    );
    let b = cube_at(&mut world, 1.5, 0.0, 0.0);

    let mut sensor = ContactSensor::new(a, ());
    world.contact_pair_test(a, b, &mut sensor).unwrap();

    assert!(!sensor.contacts().is_empty());
    for record in sensor.contacts() {
        assert!(record.local_point[2] > 0.4, "local point {:?}", record.local_point);
        assert!(record.world_point[0] > 0.4);
    }
}

#[test]
fn test_offset_collider_reports_body_frame_point() {
    let mut world = PhysicsWorld::default();
    let a = world.create_rigid_body(RigidBodyDesc::dynamic());
    world
        .create_collider(ColliderDesc::new(ColliderShape::cube(1.0)).with_offset(3.0, 0.0, 0.0), Some(a))
        .unwrap();
    let b = cube_at(&mut world, 4.5, 0.0, 0.0);

    let mut sensor = ContactSensor::new(a, ());
    world.contact_pair_test(a, b, &mut sensor).unwrap();

    assert!(!sensor.contacts().is_empty());
    for record in sensor.contacts() {
        assert!(record.local_point[0] > 3.4, "local point {:?}", record.local_point);
    }
}

#[test]
fn test_group_rejection_never_reaches_add_single_result() {
    let mut world = PhysicsWorld::default();
    let a = cube_at(&mut world, 0.0, 0.0, 0.0);
    let b = world.create_rigid_body(RigidBodyDesc::dynamic().with_position(1.5, 0.0, 0.0));
    world
        .create_collider(
            ColliderDesc::new(ColliderShape::cube(1.0)).with_collision_groups(CollisionGroups::from_layer(
                CollisionLayer::CUBES,
                &[CollisionLayer::GROUND],
            )),
            Some(b),
        )
        .unwrap();

    let sensor_groups = CollisionGroups::from_layer(CollisionLayer::SENSORS, &[CollisionLayer::CUBES]);

    let mut sensor = ContactSensor::new(a, ()).with_groups(sensor_groups);
    assert_eq!(world.contact_pair_test(a, b, &mut sensor).unwrap(), 0);
    assert!(sensor.contacts().is_empty());

    // The same pair is reported once the groups agree
    let mut open = ContactSensor::new(a, ());
    assert!(world.contact_pair_test(a, b, &mut open).unwrap() > 0);
}

#[test]
fn test_jointed_bodies_skipped_only_when_enabled() {
    let mut world = PhysicsWorld::default();
    let a = cube_at(&mut world, 0.0, 0.0, 0.0);
    let b = cube_at(&mut world, 1.5, 0.0, 0.0);
    world
        .create_joint(a, b, JointDesc::fixed().with_contacts_enabled(false))
        .unwrap();

    let mut keep = ContactSensor::new(a, ());
    assert!(world.contact_pair_test(a, b, &mut keep).unwrap() > 0);

    let mut skip = ContactSensor::new(a, ()).skip_constraint_linked(true);
    assert_eq!(world.contact_pair_test(a, b, &mut skip).unwrap(), 0);
}

#[test]
fn test_joint_with_contacts_enabled_is_not_skipped() {
    let mut world = PhysicsWorld::default();
    let a = cube_at(&mut world, 0.0, 0.0, 0.0);
    let b = cube_at(&mut world, 1.5, 0.0, 0.0);
    world.create_joint(a, b, JointDesc::spherical()).unwrap();

    let mut sensor = ContactSensor::new(a, ()).skip_constraint_linked(true);
    assert!(world.contact_pair_test(a, b, &mut sensor).unwrap() > 0);
}

#[test]
fn test_invalid_pairs_are_errors() {
    let mut world = PhysicsWorld::default();
    let a = cube_at(&mut world, 0.0, 0.0, 0.0);
    let b = cube_at(&mut world, 1.5, 0.0, 0.0);
    world.remove_rigid_body(b).unwrap();

    let mut sensor = ContactSensor::new(a, ());
    assert!(matches!(
        world.contact_pair_test(a, a, &mut sensor),
        Err(PhysicsError::InvalidPair(_))
    ));
    assert!(matches!(
        world.contact_pair_test(a, b, &mut sensor),
        Err(PhysicsError::BodyNotFound(handle)) if handle == b
    ));
}

#[test]
fn test_closure_callback_sees_sides_in_call_order() {
    let mut world = PhysicsWorld::default();
    let a = cube_at(&mut world, 0.0, 0.0, 0.0);
    let b = cube_at(&mut world, 0.0, 1.5, 0.0);

    let mut sides = Vec::new();
    let mut callback = FnContactCallback::new(|point: &ManifoldPoint, s0: &ContactSide, s1: &ContactSide| {
        sides.push((s0.body, s1.body, point.depth()));
    });
    let count = world.contact_pair_test(a, b, &mut callback).unwrap();
    drop(callback);

    assert_eq!(sides.len(), count);
    for (s0, s1, depth) in sides {
        assert_eq!(s0, a);
        assert_eq!(s1, b);
        assert_abs_diff_eq!(depth, 0.5, epsilon = 1e-3);
    }
}

#[test]
fn test_sleeping_bodies_snapshot_and_contact() {
    let mut world = PhysicsWorld::default();
    let a = cube(&mut world, RigidBodyDesc::dynamic().with_sleeping(true), 1.0);
    let b = cube(
        &mut world,
        RigidBodyDesc::dynamic().with_position(1.5, 0.0, 0.0).with_sleeping(true),
        1.0,
    );

    let snapshots = world.bodies();
    assert_eq!(snapshots.len(), 2);
    assert!(snapshots.iter().all(BodySnapshot::is_sleeping));

    let mut sensor = ContactSensor::new(a, ());
    assert!(world.contact_pair_test(a, b, &mut sensor).unwrap() > 0);
}

#[test]
fn test_cast_segment_hit_and_miss() {
    let mut world = PhysicsWorld::default();
    let a = cube(&mut world, RigidBodyDesc::fixed().with_user_data(3), 1.0);
    world.sync_query_pipeline();

    let options = RaycastOptions::default();
    let hit = world
        .query()
        .cast_segment([0.0, 0.0, 10.0], [0.0, 0.0, -10.0], &options)
        .expect("segment through the cube should hit");

    assert_eq!(hit.body, Some(a));
    assert_abs_diff_eq!(hit.point[2], 1.0, epsilon = 1e-4);
    assert_abs_diff_eq!(hit.normal[2], 1.0, epsilon = 1e-4);
    assert_abs_diff_eq!(hit.distance, 9.0, epsilon = 1e-3);
    assert_abs_diff_eq!(hit.fraction, 0.45, epsilon = 1e-4);
    assert_eq!(world.body(a).unwrap().user_data, 3);

    assert!(world
        .query()
        .cast_segment([5.0, 5.0, 10.0], [5.0, 5.0, -10.0], &options)
        .is_none());

    // The segment stops short of the cube
    assert!(world
        .query()
        .cast_segment([0.0, 0.0, 10.0], [0.0, 0.0, 5.0], &options)
        .is_none());
}

#[test]
fn test_cast_segment_respects_exclusions() {
    let mut world = PhysicsWorld::default();
    let near = cube(&mut world, RigidBodyDesc::fixed().with_position(0.0, 0.0, 3.0), 1.0);
    let far = cube(&mut world, RigidBodyDesc::fixed(), 1.0);
    world.sync_query_pipeline();

    let near_collider = world.body_colliders(near).unwrap()[0];
    let options = RaycastOptions::default().exclude(near_collider);
    let hit = world
        .query()
        .cast_segment([0.0, 0.0, 10.0], [0.0, 0.0, -10.0], &options)
        .unwrap();

    assert_eq!(hit.body, Some(far));

    let all = world
        .query()
        .raycast_all([0.0, 0.0, 10.0], [0.0, 0.0, -1.0], &RaycastOptions::default());
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].body, Some(near));
}
