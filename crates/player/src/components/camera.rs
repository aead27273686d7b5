use tankyard_common::NodeId;
use tankyard_render::{ChaseCamera, SceneError, SceneGraph};

/// Aims the chase camera from two nodes attached to the player.
///
/// Reads the nodes' derived world positions rather than `PlayerData`, so any
/// offsets the graphics phase applied are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraComponent {
    pub camera_node: NodeId,
    pub sight_node: NodeId,
}

impl CameraComponent {
    pub fn new(camera_node: NodeId, sight_node: NodeId) -> Self {
        Self {
            camera_node,
            sight_node,
        }
    }

    pub fn update(&self, scene: &SceneGraph, camera: &mut ChaseCamera) -> Result<(), SceneError> {
        let eye = scene
            .derived_position(self.camera_node)
            .ok_or(SceneError::UnknownNode(self.camera_node))?;
        let sight = scene
            .derived_position(self.sight_node)
            .ok_or(SceneError::UnknownNode(self.sight_node))?;
        camera.update(eye, sight);
        Ok(())
    }
}
