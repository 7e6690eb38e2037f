//! Physics world - main simulation container

use crate::body::{ActivationState, BodySnapshot, RigidBodyDesc, RigidBodyHandle};
use crate::collider::{ColliderDesc, ColliderHandle};
use crate::config::PhysicsConfig;
use crate::contact::{ContactProxy, ContactResultCallback, ContactSide, ManifoldPoint};
use crate::error::{PhysicsError, Result};
use crate::joint::{JointDesc, JointHandle};
use crate::layers::CollisionGroups;
use crate::query::PhysicsQuery;
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::parry::query::{
    ContactManifold, ContactManifoldsWorkspace, DefaultQueryDispatcher, PersistentQueryDispatcher,
};
use rapier3d::prelude as rapier;
use std::num::NonZeroUsize;

/// The main physics world containing all simulation state
pub struct PhysicsWorld {
    config: PhysicsConfig,

    /// Rapier physics pipeline
    pipeline: rapier::PhysicsPipeline,

    gravity: rapier::Vector<f32>,

    integration_params: rapier::IntegrationParameters,

    islands: rapier::IslandManager,

    broad_phase: rapier::DefaultBroadPhase,

    narrow_phase: rapier::NarrowPhase,

    impulse_joints: rapier::ImpulseJointSet,

    multibody_joints: rapier::MultibodyJointSet,

    ccd_solver: rapier::CCDSolver,

    query_pipeline: rapier::QueryPipeline,

    bodies: rapier::RigidBodySet,

    colliders: rapier::ColliderSet,

    /// Accumulated time for fixed timestep
    accumulated_time: f32,
}

impl PhysicsWorld {
    /// Create a new physics world
    pub fn new(config: PhysicsConfig) -> Self {
        let gravity = rapier::Vector::new(config.gravity[0], config.gravity[1], config.gravity[2]);

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = config.timestep;
        integration_params.num_solver_iterations =
            NonZeroUsize::new(config.solver_iterations).unwrap_or(NonZeroUsize::MIN);

        Self {
            config,
            pipeline: rapier::PhysicsPipeline::new(),
            gravity,
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            query_pipeline: rapier::QueryPipeline::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            accumulated_time: 0.0,
        }
    }

    /// Create a world after validating the configuration
    pub fn try_new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    // ==================== Rigid Bodies ====================

    /// Create a rigid body
    pub fn create_rigid_body(&mut self, desc: RigidBodyDesc) -> RigidBodyHandle {
        let builder = desc.to_rapier_builder(self.config.ccd_enabled, self.config.sleeping_enabled);
        let handle = RigidBodyHandle(self.bodies.insert(builder));
        log::trace!("created {:?} body {handle:?} at {:?}", desc.body_type, desc.position);
        handle
    }

    /// Remove a rigid body together with its colliders and joints
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) -> Result<()> {
        self.bodies
            .remove(
                handle.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .map(|_| ())
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    fn body_ref(&self, handle: RigidBodyHandle) -> Result<&rapier::RigidBody> {
        self.bodies.get(handle.0).ok_or(PhysicsError::BodyNotFound(handle))
    }

    fn body_mut(&mut self, handle: RigidBodyHandle) -> Result<&mut rapier::RigidBody> {
        self.bodies.get_mut(handle.0).ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Snapshot of every body
    ///
    /// The order follows the internal arena and may change after removals.
    pub fn bodies(&self) -> Vec<BodySnapshot> {
        self.bodies
            .iter()
            .map(|(handle, body)| BodySnapshot::from_rapier(handle, body))
            .collect()
    }

    /// Snapshot of one body
    pub fn body(&self, handle: RigidBodyHandle) -> Result<BodySnapshot> {
        self.body_ref(handle).map(|b| BodySnapshot::from_rapier(handle.0, b))
    }

    pub fn activation_state(&self, handle: RigidBodyHandle) -> Result<ActivationState> {
        self.body(handle).map(|snapshot| snapshot.activation)
    }

    /// Wake a sleeping body
    pub fn wake_up(&mut self, handle: RigidBodyHandle) -> Result<()> {
        self.body_mut(handle).map(|b| b.wake_up(true))
    }

    /// Put a body to sleep until something touches it
    pub fn sleep(&mut self, handle: RigidBodyHandle) -> Result<()> {
        self.body_mut(handle).map(|b| b.sleep())
    }

    pub fn get_body_position(&self, handle: RigidBodyHandle) -> Result<[f32; 3]> {
        self.body_ref(handle).map(|b| {
            let pos = b.translation();
            [pos.x, pos.y, pos.z]
        })
    }

    // ==================== Colliders ====================

    /// Create a collider, attached to `parent` when given
    pub fn create_collider(&mut self, desc: ColliderDesc, parent: Option<RigidBodyHandle>) -> Result<ColliderHandle> {
        let builder = desc.to_rapier_builder()?;
        let handle = match parent {
            Some(body) => {
                if !self.bodies.contains(body.0) {
                    return Err(PhysicsError::BodyNotFound(body));
                }
                self.colliders.insert_with_parent(builder, body.0, &mut self.bodies)
            }
            None => self.colliders.insert(builder),
        };
        Ok(ColliderHandle(handle))
    }

    /// Colliders attached to a body
    pub fn body_colliders(&self, handle: RigidBodyHandle) -> Result<Vec<ColliderHandle>> {
        self.body_ref(handle)
            .map(|b| b.colliders().iter().copied().map(ColliderHandle).collect())
    }

    // ==================== Joints ====================

    /// Join two bodies
    pub fn create_joint(&mut self, body1: RigidBodyHandle, body2: RigidBodyHandle, desc: JointDesc) -> Result<JointHandle> {
        if body1 == body2 {
            return Err(PhysicsError::JointFailed(format!("cannot join {body1:?} to itself")));
        }
        self.body_ref(body1)?;
        self.body_ref(body2)?;

        let joint = desc.to_rapier()?;
        let handle = self.impulse_joints.insert(body1.0, body2.0, joint, true);
        log::debug!("created {:?} joint between {body1:?} and {body2:?}", desc.kind);
        Ok(JointHandle(handle))
    }

    pub fn remove_joint(&mut self, handle: JointHandle) -> Result<()> {
        self.impulse_joints
            .remove(handle.0, true)
            .map(|_| ())
            .ok_or(PhysicsError::JointNotFound(handle))
    }

    /// Whether a joint between the two bodies disables their mutual contacts
    pub fn contacts_disabled_between(&self, body1: RigidBodyHandle, body2: RigidBodyHandle) -> bool {
        self.impulse_joints
            .joints_between(body1.0, body2.0)
            .chain(self.impulse_joints.joints_between(body2.0, body1.0))
            .any(|(_, joint)| !joint.data.contacts_enabled)
    }

    // ==================== Simulation ====================

    /// Advance the simulation by `delta_time` in fixed steps
    ///
    /// At most `max_substeps` steps run per call; leftover time carries over.
    pub fn step(&mut self, delta_time: f32) {
        if !delta_time.is_finite() || delta_time < 0.0 {
            log::warn!("ignoring invalid step delta {delta_time}");
            return;
        }

        self.accumulated_time += delta_time;

        let mut steps = 0;
        while self.accumulated_time >= self.config.timestep && steps < self.config.max_substeps {
            self.step_internal();
            self.accumulated_time -= self.config.timestep;
            steps += 1;
        }

        if steps == self.config.max_substeps {
            // Drop the backlog instead of spiralling
            self.accumulated_time = self.accumulated_time.min(self.config.timestep);
        }

        self.query_pipeline.update(&self.colliders);
    }

    /// Sync the query pipeline with the current colliders
    ///
    /// Needed to query colliders added since the last `step()`.
    pub fn sync_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.colliders);
    }

    fn step_internal(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    // ==================== Queries ====================

    /// Ray casts and overlap tests against the last synced state
    pub fn query(&self) -> PhysicsQuery<'_> {
        PhysicsQuery {
            query_pipeline: &self.query_pipeline,
            colliders: &self.colliders,
            bodies: &self.bodies,
        }
    }

    fn proxy(
        &self,
        body: RigidBodyHandle,
        user_data: u128,
        collider: rapier::ColliderHandle,
        constraint_linked: bool,
    ) -> Option<(ContactProxy, &rapier::Collider)> {
        let co = self.colliders.get(collider)?;
        let proxy = ContactProxy {
            body,
            collider: ColliderHandle(collider),
            groups: CollisionGroups::from_rapier(co.collision_groups()),
            user_data,
            constraint_linked,
        };
        Some((proxy, co))
    }

    /// Report every contact point between two bodies to `callback`
    ///
    /// Contacts are computed from the current poses, not from the last
    /// simulation step, so sleeping bodies and freshly created bodies are
    /// reported too. Returns the number of `add_single_result` calls.
    pub fn contact_pair_test<R>(
        &self,
        body_a: RigidBodyHandle,
        body_b: RigidBodyHandle,
        callback: &mut R,
    ) -> Result<usize>
    where
        R: ContactResultCallback + ?Sized,
    {
        if body_a == body_b {
            return Err(PhysicsError::InvalidPair(body_a));
        }
        let rb_a = self.body_ref(body_a)?;
        let rb_b = self.body_ref(body_b)?;

        let linked = self.contacts_disabled_between(body_a, body_b);
        let prediction = callback.closest_distance_threshold().max(0.0);
        let dispatcher = DefaultQueryDispatcher;
        let mut manifolds: Vec<ContactManifold<(), ()>> = Vec::new();
        let mut reported = 0;

        for &handle_a in rb_a.colliders() {
            let Some((proxy_a, co_a)) = self.proxy(body_a, rb_a.user_data, handle_a, linked) else {
                continue;
            };
            if !callback.needs_collision(&proxy_a) {
                continue;
            }

            for &handle_b in rb_b.colliders() {
                let Some((proxy_b, co_b)) = self.proxy(body_b, rb_b.user_data, handle_b, linked) else {
                    continue;
                };
                if !callback.needs_collision(&proxy_b) {
                    continue;
                }

                let pos_a = co_a.position();
                let pos_b = co_b.position();
                let pos12 = pos_a.inv_mul(pos_b);

                manifolds.clear();
                let mut workspace: Option<ContactManifoldsWorkspace> = None;
                if let Err(err) = dispatcher.contact_manifolds(
                    &pos12,
                    co_a.shape(),
                    co_b.shape(),
                    prediction,
                    &mut manifolds,
                    &mut workspace,
                ) {
                    log::debug!("skipping collider pair {handle_a:?}/{handle_b:?}: {err:?}");
                    continue;
                }

                let body_frame_a = co_a.position_wrt_parent().copied().unwrap_or_else(rapier::Isometry::identity);
                let body_frame_b = co_b.position_wrt_parent().copied().unwrap_or_else(rapier::Isometry::identity);

                for manifold in &manifolds {
                    let normal = pos_a * manifold.local_n1;

                    for (index, contact) in manifold.points.iter().enumerate() {
                        if contact.dist > prediction {
                            continue;
                        }

                        let local_a = body_frame_a * contact.local_p1;
                        let local_b = body_frame_b * contact.local_p2;
                        let world_a = pos_a * contact.local_p1;
                        let world_b = pos_b * contact.local_p2;

                        let point = ManifoldPoint {
                            local_point_a: [local_a.x, local_a.y, local_a.z],
                            local_point_b: [local_b.x, local_b.y, local_b.z],
                            world_point_a: [world_a.x, world_a.y, world_a.z],
                            world_point_b: [world_b.x, world_b.y, world_b.z],
                            normal: [normal.x, normal.y, normal.z],
                            distance: contact.dist,
                        };
                        let side0 = ContactSide {
                            body: body_a,
                            collider: proxy_a.collider,
                            part: manifold.subshape1,
                            index,
                        };
                        let side1 = ContactSide {
                            body: body_b,
                            collider: proxy_b.collider,
                            part: manifold.subshape2,
                            index,
                        };

                        callback.add_single_result(&point, &side0, &side1);
                        reported += 1;
                    }
                }
            }
        }

        log::trace!("contact pair test {body_a:?}/{body_b:?}: {reported} points");
        Ok(reported)
    }

    // ==================== Debug ====================

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}
