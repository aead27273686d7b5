use glam::{Quat, Vec3};
use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::prelude::{ColliderHandle, RigidBodyHandle, SharedShape};

/// Handle to a kinematic character controller owned by the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerHandle(pub(crate) RigidBodyHandle);

/// Kinematic controller plus its collision proxy.
///
/// The proxy is a kinematic body with a capsule collider; it collides with the
/// world but is never driven by the solver. Its pose is owned here and pushed
/// to the body as the next kinematic target.
pub(crate) struct CharacterState {
    pub(crate) body: RigidBodyHandle,
    pub(crate) collider: ColliderHandle,
    pub(crate) shape: SharedShape,
    pub(crate) controller: KinematicCharacterController,
    pub(crate) position: Vec3,
    pub(crate) rotation: Quat,
    /// Requested horizontal walk velocity, applied on the next step.
    pub(crate) walk_velocity: Vec3,
    /// Accumulated fall speed while airborne.
    pub(crate) vertical_velocity: f32,
    pub(crate) grounded: bool,
}

impl CharacterState {
    pub(crate) fn new(
        body: RigidBodyHandle,
        collider: ColliderHandle,
        shape: SharedShape,
        step_height: f32,
        position: Vec3,
        rotation: Quat,
    ) -> Self {
        let controller = KinematicCharacterController {
            autostep: (step_height > 0.0).then_some(CharacterAutostep {
                max_height: CharacterLength::Absolute(step_height),
                min_width: CharacterLength::Absolute(0.2),
                include_dynamic_bodies: true,
            }),
            ..KinematicCharacterController::default()
        };
        Self {
            body,
            collider,
            shape,
            controller,
            position,
            rotation,
            walk_velocity: Vec3::ZERO,
            vertical_velocity: 0.0,
            grounded: false,
        }
    }

    /// Translation the character wants to make this step, before collision.
    pub(crate) fn desired_translation(&mut self, gravity: f32, dt: f32) -> Vec3 {
        if self.grounded {
            self.vertical_velocity = 0.0;
        } else {
            self.vertical_velocity += gravity * dt;
        }
        Vec3::new(
            self.walk_velocity.x * dt,
            self.vertical_velocity * dt,
            self.walk_velocity.z * dt,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> CharacterState {
        CharacterState::new(
            RigidBodyHandle::invalid(),
            ColliderHandle::invalid(),
            SharedShape::capsule_y(0.9, 0.5),
            0.35,
            Vec3::ZERO,
            Quat::IDENTITY,
        )
    }

    #[test]
    fn airborne_character_accelerates_downward() {
        let mut c = state();
        let first = c.desired_translation(-10.0, 0.1);
        let second = c.desired_translation(-10.0, 0.1);
        assert!(first.y < 0.0);
        assert!(second.y < first.y);
    }

    #[test]
    fn grounded_character_does_not_fall() {
        let mut c = state();
        c.grounded = true;
        c.walk_velocity = Vec3::new(0.0, 0.0, -5.0);
        let t = c.desired_translation(-10.0, 0.5);
        assert_eq!(t, Vec3::new(0.0, 0.0, -2.5));
    }

    #[test]
    fn walk_velocity_ignores_vertical_component() {
        let mut c = state();
        c.grounded = true;
        c.walk_velocity = Vec3::new(1.0, 7.0, 0.0);
        assert_eq!(c.desired_translation(-10.0, 1.0).y, 0.0);
    }
}
