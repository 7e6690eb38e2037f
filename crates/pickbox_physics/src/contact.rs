//! Pairwise contact reporting
//!
//! A [`ContactResultCallback`] is driven by
//! [`PhysicsWorld::contact_pair_test`](crate::world::PhysicsWorld::contact_pair_test):
//! it first filters candidate colliders through `needs_collision`, then
//! receives every generated contact point through `add_single_result`.
//!
//! [`ContactSensor`] is the standard implementation. It watches one body,
//! keeps the contacts that involve it and hands them back as a
//! [`ContactReport`] together with a caller supplied context value.

use crate::body::RigidBodyHandle;
use crate::collider::ColliderHandle;
use crate::layers::CollisionGroups;

/// One candidate collider presented to [`ContactResultCallback::needs_collision`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactProxy {
    /// Body owning the collider
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
    /// Collision groups of the collider
    pub groups: CollisionGroups,
    /// User data of the owning body
    pub user_data: u128,
    /// The body is joined to the opposite body by a joint with contacts disabled
    pub constraint_linked: bool,
}

/// Identifies which collider part produced a contact point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactSide {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
    /// Sub-shape of a composite collider, 0 for simple shapes
    pub part: u32,
    /// Ordinal of the point within its manifold
    pub index: usize,
}

/// A single contact point between side 0 and side 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManifoldPoint {
    /// Point on side 0, in side 0's body frame
    pub local_point_a: [f32; 3],
    /// Point on side 1, in side 1's body frame
    pub local_point_b: [f32; 3],
    /// Point on side 0, in world space
    pub world_point_a: [f32; 3],
    /// Point on side 1, in world space
    pub world_point_b: [f32; 3],
    /// World-space contact normal, pointing from side 0 toward side 1
    pub normal: [f32; 3],
    /// Signed separation, negative when penetrating
    pub distance: f32,
}

impl ManifoldPoint {
    /// Penetration depth, zero for separated points
    pub fn depth(&self) -> f32 {
        (-self.distance).max(0.0)
    }
}

/// Receives the results of a pairwise contact test
pub trait ContactResultCallback {
    /// Whether a candidate collider takes part in the test
    fn needs_collision(&self, proxy: &ContactProxy) -> bool;

    /// Called once per contact point
    ///
    /// The returned value is not used by the pair test.
    fn add_single_result(&mut self, point: &ManifoldPoint, side0: &ContactSide, side1: &ContactSide) -> f32;

    /// Separation below which points are reported; 0 reports touching or penetrating points only
    fn closest_distance_threshold(&self) -> f32 {
        0.0
    }
}

/// A contact kept by a [`ContactSensor`], seen from the monitored body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactRecord {
    /// Contact point in the monitored body's frame
    pub local_point: [f32; 3],
    /// Contact point on the monitored body, in world space
    pub world_point: [f32; 3],
    /// World normal pointing from the monitored body toward the other body
    pub normal: [f32; 3],
    /// Signed separation, negative when penetrating
    pub distance: f32,
    /// Monitored body's collider
    pub collider: ColliderHandle,
    pub other_body: RigidBodyHandle,
    pub other_collider: ColliderHandle,
}

impl ContactRecord {
    pub fn depth(&self) -> f32 {
        (-self.distance).max(0.0)
    }
}

/// Contacts collected for one body during one query
#[derive(Debug, Clone, PartialEq)]
pub struct ContactReport<C> {
    pub context: C,
    pub contacts: Vec<ContactRecord>,
}

impl<C> ContactReport<C> {
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Distinct bodies touching the monitored body, in first-contact order
    pub fn touching_bodies(&self) -> Vec<RigidBodyHandle> {
        let mut bodies: Vec<RigidBodyHandle> = Vec::new();
        for record in &self.contacts {
            if !bodies.contains(&record.other_body) {
                bodies.push(record.other_body);
            }
        }
        bodies
    }

    /// Deepest penetration among the collected contacts
    pub fn max_depth(&self) -> f32 {
        self.contacts.iter().map(ContactRecord::depth).fold(0.0, f32::max)
    }
}

/// Collects the contacts of one monitored body
///
/// The context value is carried through the query untouched and returned in
/// the [`ContactReport`].
#[derive(Debug, Clone)]
pub struct ContactSensor<C> {
    monitored: RigidBodyHandle,
    context: C,
    groups: CollisionGroups,
    skip_constraint_linked: bool,
    distance_threshold: f32,
    contacts: Vec<ContactRecord>,
}

impl<C> ContactSensor<C> {
    pub fn new(monitored: RigidBodyHandle, context: C) -> Self {
        Self {
            monitored,
            context,
            groups: CollisionGroups::ALL,
            skip_constraint_linked: false,
            distance_threshold: 0.0,
            contacts: Vec::new(),
        }
    }

    /// Only accept colliders whose groups intersect `groups` both ways
    pub fn with_groups(mut self, groups: CollisionGroups) -> Self {
        self.groups = groups;
        self
    }

    /// Reject bodies joined to the monitored body with contacts disabled
    pub fn skip_constraint_linked(mut self, skip: bool) -> Self {
        self.skip_constraint_linked = skip;
        self
    }

    /// Also report points separated by up to `distance`
    pub fn with_distance_threshold(mut self, distance: f32) -> Self {
        self.distance_threshold = distance.max(0.0);
        self
    }

    pub fn monitored(&self) -> RigidBodyHandle {
        self.monitored
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn contacts(&self) -> &[ContactRecord] {
        &self.contacts
    }

    pub fn into_report(self) -> ContactReport<C> {
        ContactReport {
            context: self.context,
            contacts: self.contacts,
        }
    }
}

impl<C> ContactResultCallback for ContactSensor<C> {
    fn needs_collision(&self, proxy: &ContactProxy) -> bool {
        if proxy.body == self.monitored {
            return true;
        }
        if self.skip_constraint_linked && proxy.constraint_linked {
            return false;
        }
        self.groups.can_collide(&proxy.groups)
    }

    fn add_single_result(&mut self, point: &ManifoldPoint, side0: &ContactSide, side1: &ContactSide) -> f32 {
        debug_assert!(
            side0.body == self.monitored || side1.body == self.monitored,
            "contact between {:?} and {:?} does not involve monitored body {:?}",
            side0.body,
            side1.body,
            self.monitored
        );

        let record = if side0.body == self.monitored {
            ContactRecord {
                local_point: point.local_point_a,
                world_point: point.world_point_a,
                normal: point.normal,
                distance: point.distance,
                collider: side0.collider,
                other_body: side1.body,
                other_collider: side1.collider,
            }
        } else if side1.body == self.monitored {
            let [nx, ny, nz] = point.normal;
            ContactRecord {
                local_point: point.local_point_b,
                world_point: point.world_point_b,
                normal: [-nx, -ny, -nz],
                distance: point.distance,
                collider: side1.collider,
                other_body: side0.body,
                other_collider: side0.collider,
            }
        } else {
            log::warn!(
                "ignoring contact between {:?} and {:?}: monitored body {:?} is on neither side",
                side0.body,
                side1.body,
                self.monitored
            );
            return 0.0;
        };

        self.contacts.push(record);
        0.0
    }

    fn closest_distance_threshold(&self) -> f32 {
        self.distance_threshold
    }
}

/// Adapts a closure into a callback that accepts every collider
pub struct FnContactCallback<F> {
    f: F,
}

impl<F> FnContactCallback<F>
where
    F: FnMut(&ManifoldPoint, &ContactSide, &ContactSide),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> ContactResultCallback for FnContactCallback<F>
where
    F: FnMut(&ManifoldPoint, &ContactSide, &ContactSide),
{
    fn needs_collision(&self, _proxy: &ContactProxy) -> bool {
        true
    }

    fn add_single_result(&mut self, point: &ManifoldPoint, side0: &ContactSide, side1: &ContactSide) -> f32 {
        (self.f)(point, side0, side1);
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::CollisionLayer;
    use rapier3d::prelude as rapier;

    fn body(index: u32) -> RigidBodyHandle {
        RigidBodyHandle::from_raw(rapier::RigidBodyHandle::from_raw_parts(index, 0))
    }

    fn collider(index: u32) -> ColliderHandle {
        ColliderHandle::from_raw(rapier::ColliderHandle::from_raw_parts(index, 0))
    }

    fn side(b: u32, index: usize) -> ContactSide {
        ContactSide {
            body: body(b),
            collider: collider(b),
            part: 0,
            index,
        }
    }

    fn proxy(b: u32, groups: CollisionGroups) -> ContactProxy {
        ContactProxy {
            body: body(b),
            collider: collider(b),
            groups,
            user_data: 0,
            constraint_linked: false,
        }
    }

    fn point() -> ManifoldPoint {
        ManifoldPoint {
            local_point_a: [0.5, 0.0, 0.0],
            local_point_b: [-0.5, 0.0, 0.0],
            world_point_a: [0.5, 0.0, 0.0],
            world_point_b: [0.4, 0.0, 0.0],
            normal: [1.0, 0.0, 0.0],
            distance: -0.1,
        }
    }

    #[test]
    fn test_monitored_proxy_always_passes() {
        let sensor = ContactSensor::new(body(1), ()).with_groups(CollisionGroups::NONE);
        assert!(sensor.needs_collision(&proxy(1, CollisionGroups::NONE)));
        assert!(!sensor.needs_collision(&proxy(2, CollisionGroups::ALL)));
    }

    #[test]
    fn test_group_filter_is_bidirectional() {
        let sensor = ContactSensor::new(body(1), ())
            .with_groups(CollisionGroups::from_layer(CollisionLayer::SENSORS, &[CollisionLayer::CUBES]));

        let cube = CollisionGroups::from_layer(CollisionLayer::CUBES, &[CollisionLayer::SENSORS]);
        let deaf_cube = CollisionGroups::from_layer(CollisionLayer::CUBES, &[CollisionLayer::GROUND]);

        assert!(sensor.needs_collision(&proxy(2, cube)));
        assert!(!sensor.needs_collision(&proxy(2, deaf_cube)));
    }

    #[test]
    fn test_constraint_linked_skipped_only_when_enabled() {
        let mut linked = proxy(2, CollisionGroups::ALL);
        linked.constraint_linked = true;

        assert!(ContactSensor::new(body(1), ()).needs_collision(&linked));
        assert!(!ContactSensor::new(body(1), ())
            .skip_constraint_linked(true)
            .needs_collision(&linked));
    }

    #[test]
    fn test_records_monitored_side_when_on_side_zero() {
        let mut sensor = ContactSensor::new(body(1), "a");
        sensor.add_single_result(&point(), &side(1, 0), &side(2, 0));
        assert_eq!(sensor.monitored(), body(1));
        assert_eq!(*sensor.context(), "a");

        let report = sensor.into_report();
        assert_eq!(report.context, "a");
        assert_eq!(report.contacts.len(), 1);
        assert_eq!(report.contacts[0].local_point, [0.5, 0.0, 0.0]);
        assert_eq!(report.contacts[0].normal, [1.0, 0.0, 0.0]);
        assert_eq!(report.contacts[0].other_body, body(2));
    }

    #[test]
    fn test_records_monitored_side_when_on_side_one() {
        let mut sensor = ContactSensor::new(body(2), ());
        sensor.add_single_result(&point(), &side(1, 0), &side(2, 0));

        let record = sensor.contacts()[0];
        assert_eq!(record.local_point, [-0.5, 0.0, 0.0]);
        assert_eq!(record.world_point, [0.4, 0.0, 0.0]);
        assert_eq!(record.normal, [-1.0, 0.0, 0.0]);
        assert_eq!(record.other_body, body(1));
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "does not involve monitored body"))]
    fn test_mismatched_contact_is_rejected() {
        let mut sensor = ContactSensor::new(body(9), ());
        sensor.add_single_result(&point(), &side(1, 0), &side(2, 0));
        assert!(sensor.contacts().is_empty());
    }

    #[test]
    fn test_report_helpers() {
        let mut sensor = ContactSensor::new(body(1), ());
        sensor.add_single_result(&point(), &side(1, 0), &side(2, 0));
        sensor.add_single_result(&point(), &side(1, 1), &side(2, 1));
        sensor.add_single_result(&point(), &side(3, 0), &side(1, 0));

        let report = sensor.into_report();
        assert_eq!(report.len(), 3);
        assert_eq!(report.touching_bodies(), vec![body(2), body(3)]);
        assert!((report.max_depth() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_closure_adaptor_sees_every_point() {
        let mut seen = 0;
        let mut callback = FnContactCallback::new(|_: &ManifoldPoint, _: &ContactSide, _: &ContactSide| seen += 1);
        assert!(callback.needs_collision(&proxy(5, CollisionGroups::NONE)));
        callback.add_single_result(&point(), &side(1, 0), &side(2, 0));
        callback.add_single_result(&point(), &side(1, 1), &side(2, 1));
        drop(callback);
        assert_eq!(seen, 2);
    }
}
