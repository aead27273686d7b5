use glam::{Quat, Vec3};
use tankyard_common::{GameConfig, NodeId, Transform};
use tankyard_input::InputSnapshot;
use tankyard_physics::{CollisionShape, PhysicsError, PhysicsWorld};
use tankyard_protocol::{PACKET_LEN, PacketInbox, PositionPacket, ProtocolError};
use tankyard_render::{ChaseCamera, SceneError, SceneGraph};

use crate::components::{
    CameraComponent, GraphicsComponent, InputComponent, NetworkComponent, PhysicsBinding,
    PhysicsComponent,
};
use crate::data::PlayerData;

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Where a player's intent comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    Local(InputComponent),
    Remote(NetworkComponent),
}

/// Scene nodes created for one player. The scene graph owns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerNodes {
    pub body: NodeId,
    pub cannon: NodeId,
    pub sight: NodeId,
    pub camera_mount: NodeId,
}

/// Everything a player touches during one tick, borrowed from the frame loop.
pub struct TickContext<'a> {
    pub dt: f32,
    pub physics: &'a mut PhysicsWorld,
    pub scene: &'a mut SceneGraph,
    pub camera: Option<&'a mut ChaseCamera>,
    pub input: &'a InputSnapshot,
    pub inbox: &'a PacketInbox,
}

/// A tank in the session, local or networked.
#[derive(Debug, Clone)]
pub struct Player {
    name: String,
    number: i32,
    data: PlayerData,
    control: Control,
    physics: PhysicsComponent,
    graphics: GraphicsComponent,
    camera: Option<CameraComponent>,
    nodes: PlayerNodes,
}

impl Player {
    /// Spawn the locally controlled player with its capsule centered at `position`.
    pub fn spawn_local(
        name: impl Into<String>,
        number: i32,
        position: Vec3,
        config: &GameConfig,
        scene: &mut SceneGraph,
        physics: &mut PhysicsWorld,
    ) -> Result<Self, PlayerError> {
        let ctrl = physics.add_character_controller(
            capsule(config),
            config.step_height,
            Transform::from_position(position),
        )?;
        let nodes = match create_nodes(scene, config, position) {
            Ok(nodes) => nodes,
            Err(e) => {
                physics.remove_character_controller(ctrl)?;
                return Err(e.into());
            }
        };
        Ok(Self::assemble(
            name.into(),
            number,
            position,
            config,
            Control::Local(InputComponent::from_config(config)),
            PhysicsBinding::Character(ctrl),
            nodes,
            true,
        ))
    }

    /// Spawn a networked player. It is puppeted by packets, never simulated.
    pub fn spawn_remote(
        name: impl Into<String>,
        number: i32,
        position: Vec3,
        config: &GameConfig,
        scene: &mut SceneGraph,
        physics: &mut PhysicsWorld,
    ) -> Result<Self, PlayerError> {
        let body = physics.add_kinematic_body(Transform::from_position(position), capsule(config))?;
        let nodes = match create_nodes(scene, config, position) {
            Ok(nodes) => nodes,
            Err(e) => {
                physics.remove_body(body)?;
                return Err(e.into());
            }
        };
        Ok(Self::assemble(
            name.into(),
            number,
            position,
            config,
            Control::Remote(NetworkComponent::new(number)),
            PhysicsBinding::Puppet(body),
            nodes,
            false,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        name: String,
        number: i32,
        position: Vec3,
        config: &GameConfig,
        control: Control,
        binding: PhysicsBinding,
        nodes: PlayerNodes,
        chase_camera: bool,
    ) -> Self {
        tracing::info!(%name, number, remote = matches!(control, Control::Remote(_)), "player spawned");
        Self {
            name,
            number,
            data: PlayerData::at(position),
            control,
            physics: PhysicsComponent::new(binding),
            graphics: GraphicsComponent::new(nodes.body, nodes.cannon, capsule(config).half_height()),
            camera: chase_camera.then(|| CameraComponent::new(nodes.camera_mount, nodes.sight)),
            nodes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn data(&self) -> &PlayerData {
        &self.data
    }

    pub fn nodes(&self) -> PlayerNodes {
        self.nodes
    }

    pub fn control(&self) -> &Control {
        &self.control
    }

    pub fn physics_binding(&self) -> PhysicsBinding {
        self.physics.binding()
    }

    pub fn is_networked(&self) -> bool {
        self.physics.is_networked()
    }

    pub fn has_camera(&self) -> bool {
        self.camera.is_some()
    }

    /// Run one tick: input or network, then physics, then graphics, then camera.
    ///
    /// Returns `false` when the physics phase reports the player gone; the
    /// graphics and camera phases are skipped so the scene keeps the last
    /// good pose.
    pub fn update(&mut self, ctx: &mut TickContext<'_>) -> bool {
        match &self.control {
            Control::Local(input) => {
                input.update(&mut self.data, ctx.input, ctx.input, ctx.dt);
            }
            Control::Remote(network) => {
                network.update(&mut self.data, ctx.inbox);
            }
        }

        if !self.physics.update(&mut self.data, ctx.physics, ctx.dt) {
            return false;
        }

        if let Err(e) = self.graphics.update(&self.data, ctx.scene) {
            tracing::warn!(player = self.number, "graphics update skipped: {e}");
        }
        if let (Some(component), Some(camera)) = (&self.camera, ctx.camera.as_deref_mut()) {
            if let Err(e) = component.update(ctx.scene, camera) {
                tracing::warn!(player = self.number, "camera update skipped: {e}");
            }
        }
        tracing::trace!(player = self.number, position = ?self.data.position, "player updated");
        true
    }

    /// Capsule-center pose.
    pub fn world_transform(&self) -> Transform {
        self.data.transform()
    }

    /// Unit vector along the cannon barrel in world space.
    pub fn cannon_direction(&self) -> Vec3 {
        let barrel = self.data.orientation * Quat::from_rotation_x(self.data.pitch.to_radians());
        (barrel * Vec3::NEG_Z).normalize()
    }

    /// Encode this player's pose as a position packet.
    pub fn serialize(&self) -> [u8; PACKET_LEN] {
        self.packet().encode()
    }

    pub fn packet(&self) -> PositionPacket {
        PositionPacket::from_pose(
            self.number,
            self.data.position,
            self.data.orientation,
            self.data.pitch,
        )
    }

    /// Apply a received packet's pose to this player and return the player
    /// number it carried. On error the player is left untouched.
    pub fn deserialize(&mut self, bytes: &[u8]) -> Result<i32, ProtocolError> {
        let packet = PositionPacket::decode(bytes)?;
        self.data.position = packet.position;
        self.data.orientation = packet.orientation();
        self.data.pitch = packet.pitch;
        Ok(packet.player)
    }

    /// Destroy the player's scene nodes and physics objects.
    pub fn teardown(self, scene: &mut SceneGraph, physics: &mut PhysicsWorld) -> Result<(), PlayerError> {
        let removed = match scene.destroy(self.nodes.body) {
            Ok(n) => n,
            Err(SceneError::UnknownNode(_)) => 0,
            Err(e) => return Err(e.into()),
        };
        let physics_result = match self.physics.binding() {
            PhysicsBinding::Character(ctrl) if physics.contains_controller(ctrl) => {
                physics.remove_character_controller(ctrl)
            }
            PhysicsBinding::Puppet(body) if physics.contains_body(body) => physics.remove_body(body),
            _ => Ok(()),
        };
        tracing::info!(name = %self.name, number = self.number, nodes = removed, "player removed");
        physics_result.map_err(PlayerError::from)
    }
}

fn capsule(config: &GameConfig) -> CollisionShape {
    CollisionShape::Capsule {
        half_height: config.capsule_half_height,
        radius: config.capsule_radius,
    }
}

fn create_nodes(
    scene: &mut SceneGraph,
    config: &GameConfig,
    position: Vec3,
) -> Result<PlayerNodes, SceneError> {
    let half = capsule(config).half_height();
    let feet = position - Vec3::Y * half;
    let body = scene.create_child(SceneGraph::ROOT, "tank", Transform::from_position(feet))?;
    let turret = Vec3::Y * (2.0 * half);
    let cannon = scene.create_child(body, "cannon", Transform::from_position(turret))?;
    let sight = scene.create_child(body, "sight", Transform::from_position(config.sight_offset()))?;
    let camera_mount = scene.create_child(
        body,
        "camera",
        Transform::from_position(config.camera_offset()),
    )?;
    Ok(PlayerNodes {
        body,
        cannon,
        sight,
        camera_mount,
    })
}
