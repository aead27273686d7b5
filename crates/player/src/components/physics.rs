use tankyard_physics::{BodyHandle, ControllerHandle, PhysicsWorld};

use crate::data::PlayerData;

/// What the player is in the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsBinding {
    /// Locally simulated through a kinematic character controller.
    Character(ControllerHandle),
    /// Networked: a kinematic body placed wherever the last packet says.
    Puppet(BodyHandle),
}

/// Bridges `PlayerData` and the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsComponent {
    binding: PhysicsBinding,
}

impl PhysicsComponent {
    pub fn new(binding: PhysicsBinding) -> Self {
        Self { binding }
    }

    pub fn binding(&self) -> PhysicsBinding {
        self.binding
    }

    pub fn is_networked(&self) -> bool {
        matches!(self.binding, PhysicsBinding::Puppet(_))
    }

    /// Run the physics phase. Returns `false` when the player's physics
    /// handle is gone, meaning the player should be treated as disconnected.
    ///
    /// A local player drives the controller and steps the world by `dt`,
    /// then takes its position from the controller. A networked player is
    /// never simulated: its body is placed at the pose already in `data`.
    pub fn update(&self, data: &mut PlayerData, physics: &mut PhysicsWorld, dt: f32) -> bool {
        match self.binding {
            PhysicsBinding::Character(ctrl) => {
                let applied = physics
                    .set_character_rotation(ctrl, data.orientation)
                    .and_then(|()| physics.set_character_velocity(ctrl, data.velocity));
                if let Err(e) = applied {
                    tracing::warn!("local player lost its controller: {e}");
                    return false;
                }
                physics.step(dt);
                match physics.character_transform(ctrl) {
                    Ok(t) => {
                        data.position = t.position;
                        true
                    }
                    Err(e) => {
                        tracing::warn!("local player lost its controller: {e}");
                        false
                    }
                }
            }
            PhysicsBinding::Puppet(body) => match physics.set_body_transform(body, data.transform()) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("networked player lost its body: {e}");
                    false
                }
            },
        }
    }
}
