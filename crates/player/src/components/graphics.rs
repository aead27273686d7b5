use glam::{Quat, Vec3};
use tankyard_common::NodeId;
use tankyard_render::{SceneError, SceneGraph};

use crate::data::PlayerData;

/// Pushes the player's pose onto its scene nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphicsComponent {
    pub body_node: NodeId,
    pub cannon_node: NodeId,
    /// Capsule center to feet.
    pub half_height: f32,
}

impl GraphicsComponent {
    pub fn new(body_node: NodeId, cannon_node: NodeId, half_height: f32) -> Self {
        Self {
            body_node,
            cannon_node,
            half_height,
        }
    }

    /// Where the body node goes for a capsule centered at `position`.
    pub fn render_position(&self, position: Vec3) -> Vec3 {
        Vec3::new(position.x, position.y - self.half_height, position.z)
    }

    pub fn update(&self, data: &PlayerData, scene: &mut SceneGraph) -> Result<(), SceneError> {
        scene.set_position(self.body_node, self.render_position(data.position))?;
        scene.set_orientation(self.body_node, data.orientation)?;
        scene.set_orientation(self.cannon_node, Quat::from_rotation_x(data.pitch.to_radians()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tankyard_common::Transform;

    fn rig(scene: &mut SceneGraph, half_height: f32) -> GraphicsComponent {
        let body = scene
            .create_child(SceneGraph::ROOT, "body", Transform::default())
            .unwrap();
        let cannon = scene.create_child(body, "cannon", Transform::default()).unwrap();
        GraphicsComponent::new(body, cannon, half_height)
    }

    #[test]
    fn node_sits_half_height_below_capsule_center() {
        let mut scene = SceneGraph::new();
        let graphics = rig(&mut scene, 1.4);
        let data = PlayerData {
            position: Vec3::new(2.0, 5.0, -3.0),
            orientation: Quat::from_rotation_y(0.3),
            ..PlayerData::default()
        };
        graphics.update(&data, &mut scene).unwrap();
        let node = scene.get(graphics.body_node).unwrap();
        assert_eq!(node.local.position, Vec3::new(2.0, 5.0 - 1.4, -3.0));
        assert!(node.local.rotation.dot(data.orientation).abs() > 0.99999);
    }

    #[test]
    fn cannon_tilts_with_pitch() {
        let mut scene = SceneGraph::new();
        let graphics = rig(&mut scene, 1.0);
        let data = PlayerData {
            pitch: 30.0,
            ..PlayerData::default()
        };
        graphics.update(&data, &mut scene).unwrap();
        let cannon = scene.get(graphics.cannon_node).unwrap().local.rotation;
        assert!(cannon.dot(Quat::from_rotation_x(30f32.to_radians())).abs() > 0.99999);
    }

    #[test]
    fn destroyed_node_is_an_error() {
        let mut scene = SceneGraph::new();
        let graphics = rig(&mut scene, 1.0);
        scene.destroy(graphics.body_node).unwrap();
        assert!(graphics.update(&PlayerData::default(), &mut scene).is_err());
    }
}
