use glam::{Quat, Vec3};
use tankyard_common::Transform;

/// State shared by a player's components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerData {
    /// Capsule center in world space.
    pub position: Vec3,
    pub orientation: Quat,
    pub velocity: Vec3,
    /// Cannon tilt in degrees.
    pub pitch: f32,
}

impl Default for PlayerData {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            pitch: 0.0,
        }
    }
}

impl PlayerData {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.orientation)
    }
}
