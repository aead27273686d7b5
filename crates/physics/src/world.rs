use std::collections::{BTreeMap, HashMap};

use glam::{Quat, Vec3};
use rapier3d::na::{Isometry3, Quaternion, Translation3, Unit, UnitQuaternion, Vector3};
use rapier3d::prelude::{
    CCDSolver, ColliderBuilder, ColliderSet, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline,
    QueryFilter, QueryPipeline, RigidBodyBuilder, RigidBodyHandle, RigidBodySet,
};
use tankyard_common::{NodeId, Transform};

use crate::character::{CharacterState, ControllerHandle};
use crate::shape::CollisionShape;

/// Errors from physics world operations.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    /// The world cannot hold another body. Treated as fatal by callers.
    #[error("physics world exhausted: capacity of {limit} bodies reached")]
    ResourceExhausted { limit: usize },
    #[error("body {0:?} not found")]
    UnknownBody(BodyHandle),
    #[error("character controller {0:?} not found")]
    UnknownController(ControllerHandle),
}

/// Handle to a rigid body owned by the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

impl PartialOrd for BodyHandle {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BodyHandle {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.into_raw_parts().cmp(&other.0.into_raw_parts())
    }
}

/// One entry of [`PhysicsWorld::for_each_body`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub handle: BodyHandle,
    pub transform: Transform,
    /// Scene node this body drives, if any.
    pub node: Option<NodeId>,
}

/// The dynamics world.
///
/// Owns every body, collider and character controller. Other layers hold
/// handles and look them up on each use.
pub struct PhysicsWorld {
    gravity: f32,
    max_bodies: usize,
    pipeline: PhysicsPipeline,
    params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    characters: HashMap<ControllerHandle, CharacterState>,
    /// Body-to-node association.
    bindings: BTreeMap<BodyHandle, NodeId>,
    steps: u64,
}

impl PhysicsWorld {
    /// Create an empty world with the given vertical gravity and body capacity.
    pub fn new(gravity: f32, max_bodies: usize) -> Self {
        Self {
            gravity,
            max_bodies,
            pipeline: PhysicsPipeline::new(),
            params: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            characters: HashMap::new(),
            bindings: BTreeMap::new(),
            steps: 0,
        }
    }

    pub fn from_config(config: &tankyard_common::GameConfig) -> Self {
        Self::new(config.gravity, config.max_bodies)
    }

    /// Number of completed simulation steps.
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Number of bodies, character proxies included.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of collision objects (colliders) in the world.
    pub fn collision_object_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    fn ensure_capacity(&self) -> Result<(), PhysicsError> {
        if self.bodies.len() >= self.max_bodies {
            tracing::error!(limit = self.max_bodies, "physics body capacity exhausted");
            return Err(PhysicsError::ResourceExhausted {
                limit: self.max_bodies,
            });
        }
        Ok(())
    }

    /// Add an immovable infinite plane `normal . x = offset`.
    pub fn add_static_plane(&mut self, normal: Vec3, offset: f32) -> Result<BodyHandle, PhysicsError> {
        self.ensure_capacity()?;
        let normal = normal.normalize();
        let origin = normal * offset;
        let body = RigidBodyBuilder::fixed()
            .translation(Vector3::new(origin.x, origin.y, origin.z))
            .build();
        let handle = self.bodies.insert(body);
        let collider =
            ColliderBuilder::halfspace(Unit::new_normalize(Vector3::new(normal.x, normal.y, normal.z)))
                .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        tracing::debug!(?normal, offset, "static plane added");
        Ok(BodyHandle(handle))
    }

    /// Add a rigid body. `mass == 0` makes it static; positive mass makes it dynamic.
    pub fn add_rigid_body(
        &mut self,
        mass: f32,
        initial: Transform,
        shape: CollisionShape,
    ) -> Result<BodyHandle, PhysicsError> {
        debug_assert!(mass >= 0.0, "negative body mass {mass}");
        self.ensure_capacity()?;
        let builder = if mass > 0.0 {
            RigidBodyBuilder::dynamic()
        } else {
            RigidBodyBuilder::fixed()
        };
        let handle = self.bodies.insert(builder.position(to_isometry(&initial)).build());
        let mut collider = shape.collider_builder();
        if mass > 0.0 {
            collider = collider.mass(mass);
        }
        self.colliders
            .insert_with_parent(collider.build(), handle, &mut self.bodies);
        tracing::debug!(mass, ?shape, "rigid body added");
        Ok(BodyHandle(handle))
    }

    /// Add a kinematic body whose pose is set directly (used for puppeted players).
    pub fn add_kinematic_body(
        &mut self,
        initial: Transform,
        shape: CollisionShape,
    ) -> Result<BodyHandle, PhysicsError> {
        self.ensure_capacity()?;
        let body = RigidBodyBuilder::kinematic_position_based()
            .position(to_isometry(&initial))
            .build();
        let handle = self.bodies.insert(body);
        self.colliders
            .insert_with_parent(shape.collider_builder().build(), handle, &mut self.bodies);
        Ok(BodyHandle(handle))
    }

    /// Add a kinematic character controller with the given proxy shape.
    pub fn add_character_controller(
        &mut self,
        shape: CollisionShape,
        step_height: f32,
        initial: Transform,
    ) -> Result<ControllerHandle, PhysicsError> {
        self.ensure_capacity()?;
        let body = RigidBodyBuilder::kinematic_position_based()
            .position(to_isometry(&initial))
            .build();
        let body = self.bodies.insert(body);
        let collider = self.colliders.insert_with_parent(
            shape.collider_builder().build(),
            body,
            &mut self.bodies,
        );
        let handle = ControllerHandle(body);
        self.characters.insert(
            handle,
            CharacterState::new(
                body,
                collider,
                shape.shared_shape(),
                step_height,
                initial.position,
                initial.rotation.normalize(),
            ),
        );
        tracing::debug!(?shape, step_height, "character controller added");
        Ok(handle)
    }

    /// Remove a body and its colliders. Its node binding, if any, goes with it.
    pub fn remove_body(&mut self, body: BodyHandle) -> Result<(), PhysicsError> {
        self.bindings.remove(&body);
        self.bodies
            .remove(
                body.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .map(|_| ())
            .ok_or(PhysicsError::UnknownBody(body))
    }

    pub fn remove_character_controller(&mut self, ctrl: ControllerHandle) -> Result<(), PhysicsError> {
        let state = self
            .characters
            .remove(&ctrl)
            .ok_or(PhysicsError::UnknownController(ctrl))?;
        self.bodies.remove(
            state.body,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        Ok(())
    }

    pub fn contains_body(&self, body: BodyHandle) -> bool {
        self.bodies.contains(body.0)
    }

    pub fn contains_controller(&self, ctrl: ControllerHandle) -> bool {
        self.characters.contains_key(&ctrl)
    }

    /// Associate a body with the scene node it drives.
    pub fn bind_node(&mut self, body: BodyHandle, node: NodeId) -> Result<(), PhysicsError> {
        if !self.bodies.contains(body.0) {
            return Err(PhysicsError::UnknownBody(body));
        }
        self.bindings.insert(body, node);
        Ok(())
    }

    pub fn unbind_node(&mut self, body: BodyHandle) -> Option<NodeId> {
        self.bindings.remove(&body)
    }

    pub fn bound_node(&self, body: BodyHandle) -> Option<NodeId> {
        self.bindings.get(&body).copied()
    }

    pub fn body_transform(&self, body: BodyHandle) -> Option<Transform> {
        self.bodies.get(body.0).map(|b| from_isometry(b.position()))
    }

    /// Set a body's pose. Kinematic bodies reach it on the next step; others are teleported.
    pub fn set_body_transform(&mut self, body: BodyHandle, transform: Transform) -> Result<(), PhysicsError> {
        let rb = self
            .bodies
            .get_mut(body.0)
            .ok_or(PhysicsError::UnknownBody(body))?;
        let iso = to_isometry(&transform);
        if rb.is_kinematic() {
            rb.set_next_kinematic_position(iso);
        } else {
            rb.set_position(iso, true);
        }
        Ok(())
    }

    /// Request a walk velocity for the character; consumed by the next `step`.
    pub fn set_character_velocity(&mut self, ctrl: ControllerHandle, velocity: Vec3) -> Result<(), PhysicsError> {
        let state = self
            .characters
            .get_mut(&ctrl)
            .ok_or(PhysicsError::UnknownController(ctrl))?;
        state.walk_velocity = velocity;
        Ok(())
    }

    pub fn set_character_rotation(&mut self, ctrl: ControllerHandle, rotation: Quat) -> Result<(), PhysicsError> {
        let state = self
            .characters
            .get_mut(&ctrl)
            .ok_or(PhysicsError::UnknownController(ctrl))?;
        state.rotation = rotation.normalize();
        Ok(())
    }

    /// Current pose of the character proxy (capsule center).
    pub fn character_transform(&self, ctrl: ControllerHandle) -> Result<Transform, PhysicsError> {
        self.characters
            .get(&ctrl)
            .map(|c| Transform::new(c.position, c.rotation))
            .ok_or(PhysicsError::UnknownController(ctrl))
    }

    pub fn character_grounded(&self, ctrl: ControllerHandle) -> Result<bool, PhysicsError> {
        self.characters
            .get(&ctrl)
            .map(|c| c.grounded)
            .ok_or(PhysicsError::UnknownController(ctrl))
    }

    /// Advance the simulation by exactly `dt` seconds.
    ///
    /// Dynamic bodies are integrated first; character controllers then resolve
    /// their requested motion against the refreshed collision state.
    pub fn step(&mut self, dt: f32) {
        self.params.dt = dt;
        self.pipeline.step(
            &Vector3::new(0.0, self.gravity, 0.0),
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        for state in self.characters.values_mut() {
            let desired = state.desired_translation(self.gravity, dt);
            let pose = Isometry3::from_parts(
                Translation3::new(state.position.x, state.position.y, state.position.z),
                to_unit_quaternion(state.rotation),
            );
            let movement = state.controller.move_shape(
                dt,
                &self.bodies,
                &self.colliders,
                &self.query_pipeline,
                &*state.shape,
                &pose,
                Vector3::new(desired.x, desired.y, desired.z),
                QueryFilter::default()
                    .exclude_rigid_body(state.body)
                    .exclude_collider(state.collider),
                |_| {},
            );
            let t = movement.translation;
            state.position += Vec3::new(t.x, t.y, t.z);
            state.grounded = movement.grounded;
            if let Some(body) = self.bodies.get_mut(state.body) {
                body.set_next_kinematic_position(Isometry3::from_parts(
                    Translation3::new(state.position.x, state.position.y, state.position.z),
                    to_unit_quaternion(state.rotation),
                ));
            }
        }

        self.steps += 1;
    }

    /// Bodies whose transforms should be pushed to the scene.
    ///
    /// Character proxies are skipped, as are static bodies without a bound node.
    pub fn for_each_body(&self) -> impl Iterator<Item = BodySnapshot> + '_ {
        self.bodies.iter().filter_map(move |(handle, body)| {
            if self.characters.contains_key(&ControllerHandle(handle)) {
                return None;
            }
            let handle = BodyHandle(handle);
            let node = self.bindings.get(&handle).copied();
            if body.is_fixed() && node.is_none() {
                return None;
            }
            Some(BodySnapshot {
                handle,
                transform: from_isometry(body.position()),
                node,
            })
        })
    }
}

fn to_unit_quaternion(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

fn to_isometry(t: &Transform) -> Isometry3<f32> {
    Isometry3::from_parts(
        Translation3::new(t.position.x, t.position.y, t.position.z),
        to_unit_quaternion(t.rotation),
    )
}

fn from_isometry(iso: &Isometry3<f32>) -> Transform {
    let p = iso.translation.vector;
    // nalgebra stores quaternion coordinates as [i, j, k, w]
    let q = iso.rotation.coords;
    Transform::new(Vec3::new(p.x, p.y, p.z), Quat::from_xyzw(q.x, q.y, q.z, q.w))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn ground_world() -> PhysicsWorld {
        let mut world = PhysicsWorld::new(-9.81, 64);
        world.add_static_plane(Vec3::Y, 0.0).unwrap();
        world
    }

    fn capsule() -> CollisionShape {
        CollisionShape::Capsule {
            half_height: 0.9,
            radius: 0.5,
        }
    }

    #[test]
    fn step_counts_ticks() {
        let mut world = PhysicsWorld::new(-9.81, 8);
        world.step(DT);
        world.step(DT);
        assert_eq!(world.step_count(), 2);
    }

    #[test]
    fn dynamic_body_falls_and_rests_on_ground() {
        let mut world = ground_world();
        let ball = world
            .add_rigid_body(
                1.0,
                Transform::from_position(Vec3::new(0.0, 5.0, 0.0)),
                CollisionShape::Sphere { radius: 0.5 },
            )
            .unwrap();
        world.step(DT);
        let after_one = world.body_transform(ball).unwrap().position.y;
        assert!(after_one < 5.0);
        for _ in 0..300 {
            world.step(DT);
        }
        let rest = world.body_transform(ball).unwrap().position.y;
        assert!(rest > 0.3 && rest < 0.7, "ball rests at {rest}");
    }

    #[test]
    fn zero_mass_body_does_not_move() {
        let mut world = ground_world();
        let crate_box = world
            .add_rigid_body(
                0.0,
                Transform::from_position(Vec3::new(2.0, 3.0, 0.0)),
                CollisionShape::default(),
            )
            .unwrap();
        for _ in 0..30 {
            world.step(DT);
        }
        assert_eq!(
            world.body_transform(crate_box).unwrap().position,
            Vec3::new(2.0, 3.0, 0.0)
        );
    }

    #[test]
    fn capacity_exhaustion_is_reported() {
        let mut world = PhysicsWorld::new(-9.81, 1);
        world.add_static_plane(Vec3::Y, 0.0).unwrap();
        let err = world
            .add_rigid_body(1.0, Transform::default(), CollisionShape::default())
            .unwrap_err();
        assert!(matches!(err, PhysicsError::ResourceExhausted { limit: 1 }));
    }

    #[test]
    fn enumeration_skips_character_and_unbound_static_bodies() {
        let mut world = ground_world();
        let ctrl = world
            .add_character_controller(capsule(), 0.35, Transform::from_position(Vec3::new(0.0, 1.5, 0.0)))
            .unwrap();
        let bound_static = world
            .add_rigid_body(0.0, Transform::default(), CollisionShape::default())
            .unwrap();
        world.bind_node(bound_static, NodeId(7)).unwrap();
        let dynamic = world
            .add_rigid_body(
                2.0,
                Transform::from_position(Vec3::new(3.0, 2.0, 0.0)),
                CollisionShape::default(),
            )
            .unwrap();

        let seen: Vec<BodySnapshot> = world.for_each_body().collect();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().any(|s| s.handle == bound_static && s.node == Some(NodeId(7))));
        assert!(seen.iter().any(|s| s.handle == dynamic && s.node.is_none()));
        assert!(world.contains_controller(ctrl));
        assert_eq!(world.body_count(), 4);
    }

    #[test]
    fn removing_body_drops_binding() {
        let mut world = ground_world();
        let body = world
            .add_rigid_body(1.0, Transform::default(), CollisionShape::default())
            .unwrap();
        world.bind_node(body, NodeId(3)).unwrap();
        world.remove_body(body).unwrap();
        assert!(world.bound_node(body).is_none());
        assert!(!world.contains_body(body));
        assert!(matches!(world.remove_body(body), Err(PhysicsError::UnknownBody(_))));
        assert!(matches!(world.bind_node(body, NodeId(3)), Err(PhysicsError::UnknownBody(_))));
    }

    #[test]
    fn character_falls_onto_ground() {
        let mut world = ground_world();
        let ctrl = world
            .add_character_controller(capsule(), 0.35, Transform::from_position(Vec3::new(0.0, 3.0, 0.0)))
            .unwrap();
        for _ in 0..180 {
            world.step(DT);
        }
        let y = world.character_transform(ctrl).unwrap().position.y;
        assert!(y > 1.3 && y < 1.7, "character rests at {y}");
        assert!(world.character_grounded(ctrl).unwrap());
    }

    #[test]
    fn character_walks_with_requested_velocity() {
        let mut world = ground_world();
        let ctrl = world
            .add_character_controller(capsule(), 0.35, Transform::from_position(Vec3::new(0.0, 1.45, 0.0)))
            .unwrap();
        world
            .set_character_velocity(ctrl, Vec3::new(0.0, 0.0, -5.0))
            .unwrap();
        for _ in 0..60 {
            world.step(DT);
        }
        let p = world.character_transform(ctrl).unwrap().position;
        assert!(p.z < -4.5 && p.z > -5.5, "character at {p}");
        assert!(p.y > 1.3, "character sank to {}", p.y);
    }

    #[test]
    fn removed_controller_is_unknown() {
        let mut world = ground_world();
        let ctrl = world
            .add_character_controller(capsule(), 0.35, Transform::default())
            .unwrap();
        world.remove_character_controller(ctrl).unwrap();
        assert!(matches!(
            world.character_transform(ctrl),
            Err(PhysicsError::UnknownController(_))
        ));
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn kinematic_body_follows_set_transform_after_step() {
        let mut world = ground_world();
        let puppet = world
            .add_kinematic_body(Transform::default(), capsule())
            .unwrap();
        let target = Transform::from_position(Vec3::new(4.0, 1.4, -2.0));
        world.set_body_transform(puppet, target).unwrap();
        world.step(DT);
        let p = world.body_transform(puppet).unwrap().position;
        assert!((p - target.position).length() < 1e-4);
    }

    #[test]
    fn isometry_conversion_preserves_rotation() {
        let t = Transform::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.7));
        let back = from_isometry(&to_isometry(&t));
        assert!((back.position - t.position).length() < 1e-6);
        assert!(back.rotation.dot(t.rotation).abs() > 0.99999);
    }
}
