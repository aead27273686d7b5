use glam::Vec3;
use tankyard_common::{GameConfig, NodeId, Transform};
use tankyard_input::{InputSnapshot, Key, KeyboardState};
use tankyard_physics::{BodyHandle, CollisionShape, PhysicsWorld};
use tankyard_player::{Control, PhysicsBinding, Player, TickContext};
use tankyard_protocol::{PACKET_LEN, PacketInbox, ProtocolError};
use tankyard_render::{ChaseCamera, RenderView, Renderer, SceneGraph};

use crate::clock::FixedStepClock;
use crate::error::GameError;

/// What the shell should do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    /// The shutdown flag is set; return control to the caller for teardown.
    Shutdown,
}

/// Owns the session: physics world, scene, camera and players.
///
/// The shell calls [`FrameLoop::frame`] once per rendered frame with the real
/// elapsed time and the captured input.
pub struct FrameLoop {
    config: GameConfig,
    clock: FixedStepClock,
    physics: PhysicsWorld,
    scene: SceneGraph,
    camera: ChaseCamera,
    players: Vec<Player>,
    inbox: PacketInbox,
    outbox: Vec<[u8; PACKET_LEN]>,
    ground: BodyHandle,
    shutdown: bool,
}

impl FrameLoop {
    /// Validate the configuration and build the world with its ground plane.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let mut physics = PhysicsWorld::from_config(&config);
        let mut scene = SceneGraph::new();
        let ground = physics.add_static_plane(Vec3::Y, 0.0)?;
        scene.create_child(SceneGraph::ROOT, "ground", Transform::IDENTITY)?;
        tracing::info!(fixed_step = config.fixed_step, gravity = config.gravity, "session ready");
        Ok(Self {
            clock: FixedStepClock::new(config.fixed_step),
            config,
            physics,
            scene,
            camera: ChaseCamera::default(),
            players: Vec::new(),
            inbox: PacketInbox::new(),
            outbox: Vec::new(),
            ground,
            shutdown: false,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn clock(&self) -> &FixedStepClock {
        &self.clock
    }

    pub fn tick_count(&self) -> u64 {
        self.clock.ticks()
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &ChaseCamera {
        &self.camera
    }

    pub fn ground(&self) -> BodyHandle {
        self.ground
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, number: i32) -> Option<&Player> {
        self.players.iter().find(|p| p.number() == number)
    }

    pub fn local_player(&self) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| matches!(p.control(), Control::Local(_)))
    }

    pub fn inbox(&self) -> &PacketInbox {
        &self.inbox
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    pub fn request_shutdown(&mut self) {
        if !self.shutdown {
            tracing::info!(ticks = self.clock.ticks(), "shutdown requested");
        }
        self.shutdown = true;
    }

    /// The window went away; same as a shutdown request.
    pub fn window_closed(&mut self) {
        self.request_shutdown();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        tracing::debug!(width, height, aspect = self.camera.aspect, "viewport resized");
    }

    /// Add the locally controlled player. Only one may exist.
    pub fn add_local_player(
        &mut self,
        name: &str,
        number: i32,
        position: Vec3,
    ) -> Result<(), GameError> {
        if self.local_player().is_some() {
            return Err(GameError::Setup("a local player already exists".into()));
        }
        self.ensure_free_number(number)?;
        let player = Player::spawn_local(
            name,
            number,
            position,
            &self.config,
            &mut self.scene,
            &mut self.physics,
        )?;
        self.players.push(player);
        Ok(())
    }

    /// Add a networked player puppeted by incoming packets.
    pub fn add_remote_player(
        &mut self,
        name: &str,
        number: i32,
        position: Vec3,
    ) -> Result<(), GameError> {
        self.ensure_free_number(number)?;
        let player = Player::spawn_remote(
            name,
            number,
            position,
            &self.config,
            &mut self.scene,
            &mut self.physics,
        )?;
        self.players.push(player);
        Ok(())
    }

    fn ensure_free_number(&self, number: i32) -> Result<(), GameError> {
        if self.player(number).is_some() {
            return Err(GameError::Setup(format!("player number {number} is taken")));
        }
        Ok(())
    }

    /// Add a physics-driven prop whose scene node follows its body.
    pub fn spawn_prop(
        &mut self,
        name: &str,
        mass: f32,
        shape: CollisionShape,
        initial: Transform,
    ) -> Result<(BodyHandle, NodeId), GameError> {
        let body = self.physics.add_rigid_body(mass, initial, shape)?;
        let node = match self.scene.create_child(SceneGraph::ROOT, name, initial) {
            Ok(node) => node,
            Err(e) => {
                self.physics.remove_body(body)?;
                return Err(e.into());
            }
        };
        self.physics.bind_node(body, node)?;
        tracing::debug!(name, mass, ?node, "prop spawned");
        Ok((body, node))
    }

    /// Remove a prop's body, binding and node together.
    pub fn remove_prop(&mut self, body: BodyHandle) -> Result<(), GameError> {
        let node = self.physics.bound_node(body);
        self.physics.remove_body(body)?;
        if let Some(node) = node {
            self.scene.destroy(node)?;
        }
        Ok(())
    }

    /// Cut a networked player's physics presence. Its next update reports it
    /// gone and the frame loop removes it.
    pub fn disconnect(&mut self, number: i32) -> Result<(), GameError> {
        let player = self
            .players
            .iter()
            .find(|p| p.number() == number)
            .ok_or(GameError::UnknownPlayer(number))?;
        match player.physics_binding() {
            PhysicsBinding::Puppet(body) => {
                self.physics.remove_body(body)?;
                tracing::info!(number, "networked player disconnected");
                Ok(())
            }
            PhysicsBinding::Character(_) => Err(GameError::Setup(format!(
                "player {number} is local and cannot be disconnected"
            ))),
        }
    }

    /// Hand a received datagram to the inbox.
    pub fn receive_packet(&mut self, bytes: &[u8]) -> Result<i32, ProtocolError> {
        self.inbox.receive(bytes)
    }

    /// Take the local player's packets produced since the last drain.
    pub fn drain_outbox(&mut self) -> Vec<[u8; PACKET_LEN]> {
        std::mem::take(&mut self.outbox)
    }

    /// Run one rendered frame.
    pub fn frame(&mut self, frame_dt: f64, input: &InputSnapshot) -> FrameOutcome {
        if input.is_key_down(Key::Escape) {
            self.request_shutdown();
        }
        if self.shutdown {
            return FrameOutcome::Shutdown;
        }
        if self.clock.advance(frame_dt) {
            self.tick(input);
        }
        FrameOutcome::Continue
    }

    fn tick(&mut self, input: &InputSnapshot) {
        let dt = self.clock.step() as f32;
        let steps_before = self.physics.step_count();

        // puppets place their bodies before the local player's phase steps the world
        let (puppets, locals): (Vec<usize>, Vec<usize>) =
            (0..self.players.len()).partition(|&i| self.players[i].is_networked());

        let mut gone = Vec::new();
        for index in puppets.into_iter().chain(locals) {
            let player = &mut self.players[index];
            let mut ctx = TickContext {
                dt,
                physics: &mut self.physics,
                scene: &mut self.scene,
                camera: player.has_camera().then_some(&mut self.camera),
                input,
                inbox: &self.inbox,
            };
            if !player.update(&mut ctx) {
                gone.push(index);
            }
        }

        // the local player's physics phase steps the world; without one we do it here
        if self.physics.step_count() == steps_before {
            self.physics.step(dt);
        }

        gone.sort_unstable();
        for index in gone.into_iter().rev() {
            let player = self.players.remove(index);
            let number = player.number();
            self.inbox.forget(number);
            if let Err(e) = player.teardown(&mut self.scene, &mut self.physics) {
                tracing::warn!(number, "player teardown incomplete: {e}");
            }
        }

        let mut synced = 0usize;
        for body in self.physics.for_each_body() {
            let Some(node) = body.node else { continue };
            match self.scene.set_transform(node, body.transform) {
                Ok(()) => synced += 1,
                Err(e) => tracing::warn!(?node, "bound node missing: {e}"),
            }
            tracing::trace!(?node, position = ?body.transform.position, "body synced");
        }

        if let Some(packet) = self.local_player().map(Player::serialize) {
            self.outbox.push(packet);
        }

        tracing::debug!(
            tick = self.clock.ticks(),
            players = self.players.len(),
            synced,
            "tick complete"
        );
    }

    /// Render the current scene from the chase camera.
    pub fn render<R: Renderer>(&self, renderer: &R) -> R::Output {
        renderer.render(&self.scene, &RenderView::from(&self.camera))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use tankyard_protocol::PositionPacket;
    use tankyard_render::DebugTextRenderer;

    fn session() -> FrameLoop {
        let config = GameConfig {
            fixed_step: 0.25,
            ..GameConfig::default()
        };
        FrameLoop::new(config).unwrap()
    }

    fn standing(config: &GameConfig) -> Vec3 {
        Vec3::new(0.0, config.capsule_total_half_height() + 0.05, 0.0)
    }

    #[test]
    fn invalid_config_aborts_setup() {
        let config = GameConfig {
            fixed_step: 0.0,
            ..GameConfig::default()
        };
        let Err(err) = FrameLoop::new(config) else {
            panic!("zero fixed step was accepted");
        };
        assert!(matches!(err, GameError::Config(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn one_tick_per_frame_at_most() {
        let mut game = session();
        let input = InputSnapshot::new();
        assert_eq!(game.frame(1.0, &input), FrameOutcome::Continue);
        assert_eq!(game.tick_count(), 1);
        assert_eq!(game.physics().step_count(), 1);
        game.frame(0.0, &input);
        assert_eq!(game.tick_count(), 2);
        game.frame(0.1, &input);
        assert_eq!(game.physics().step_count(), 3);
    }

    #[test]
    fn local_player_steps_world_once_per_tick() {
        let mut game = session();
        let start = standing(game.config());
        game.add_local_player("p1", 1, start).unwrap();
        let input = InputSnapshot::new();
        for _ in 0..10 {
            game.frame(0.25, &input);
        }
        assert_eq!(game.physics().step_count(), 10);
    }

    #[test]
    fn no_tick_means_no_step() {
        let mut game = session();
        game.frame(0.1, &InputSnapshot::new());
        assert_eq!(game.tick_count(), 0);
        assert_eq!(game.physics().step_count(), 0);
        assert!(game.drain_outbox().is_empty());
    }

    #[test]
    fn escape_requests_shutdown() {
        let mut game = session();
        let mut input = InputSnapshot::new();
        assert_eq!(game.frame(0.25, &input), FrameOutcome::Continue);
        input.set_key(Key::Escape, true);
        assert_eq!(game.frame(0.25, &input), FrameOutcome::Shutdown);
        assert!(game.is_shutdown());
        assert_eq!(game.tick_count(), 1);
    }

    #[test]
    fn window_close_requests_shutdown() {
        let mut game = session();
        game.window_closed();
        assert_eq!(game.frame(0.25, &InputSnapshot::new()), FrameOutcome::Shutdown);
    }

    #[test]
    fn props_are_synced_to_their_nodes() {
        let mut game = session();
        let start = Transform::from_position(Vec3::new(3.0, 10.0, 0.0));
        let (_, node) = game
            .spawn_prop("crate", 2.0, CollisionShape::default(), start)
            .unwrap();
        let input = InputSnapshot::new();
        for _ in 0..4 {
            game.frame(0.25, &input);
        }
        let synced = game.scene().get(node).unwrap().local.position;
        assert!(synced.y < 9.0, "prop node at {synced}");
        assert!((synced.x - 3.0).abs() < 1e-3);
    }

    #[test]
    fn removing_a_prop_clears_node_and_body() {
        let mut game = session();
        let (body, node) = game
            .spawn_prop("crate", 1.0, CollisionShape::default(), Transform::IDENTITY)
            .unwrap();
        game.remove_prop(body).unwrap();
        assert!(!game.scene().contains(node));
        assert!(!game.physics().contains_body(body));
    }

    #[test]
    fn capacity_exhaustion_is_fatal() {
        let config = GameConfig {
            max_bodies: 2,
            ..GameConfig::default()
        };
        let mut game = FrameLoop::new(config).unwrap();
        game.spawn_prop("a", 1.0, CollisionShape::default(), Transform::IDENTITY)
            .unwrap();
        let err = game
            .spawn_prop("b", 1.0, CollisionShape::default(), Transform::IDENTITY)
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn second_local_player_is_rejected() {
        let mut game = session();
        let start = standing(game.config());
        game.add_local_player("p1", 1, start).unwrap();
        assert!(matches!(
            game.add_local_player("p1b", 2, start),
            Err(GameError::Setup(_))
        ));
        assert!(matches!(
            game.add_remote_player("dup", 1, start),
            Err(GameError::Setup(_))
        ));
    }

    #[test]
    fn local_packets_land_in_outbox() {
        let mut game = session();
        let start = standing(game.config());
        game.add_local_player("p1", 1, start).unwrap();
        let input = InputSnapshot::new();
        game.frame(0.25, &input);
        game.frame(0.25, &input);
        let out = game.drain_outbox();
        assert_eq!(out.len(), 2);
        let packet = PositionPacket::decode(&out[1]).unwrap();
        assert_eq!(packet.player, 1);
        assert_eq!(packet.position, game.local_player().unwrap().data().position);
        assert!(game.drain_outbox().is_empty());
    }

    #[test]
    fn remote_player_follows_received_packets() {
        let mut game = session();
        game.add_remote_player("p2", 2, Vec3::new(0.0, 1.4, 0.0)).unwrap();
        let bytes = PositionPacket::from_pose(2, Vec3::new(4.0, 1.4, -8.0), Quat::from_rotation_y(1.0), 5.0)
            .encode();
        assert_eq!(game.receive_packet(&bytes).unwrap(), 2);
        assert!(game.receive_packet(b"JUNKJUNKJUNKJUNKJUNKJUNKJUNK").is_err());

        game.frame(0.25, &InputSnapshot::new());
        let remote = game.player(2).unwrap();
        assert_eq!(remote.data().position, Vec3::new(4.0, 1.4, -8.0));
        let half = game.config().capsule_total_half_height();
        let node = game.scene().get(remote.nodes().body).unwrap().local.position;
        assert!((node - Vec3::new(4.0, 1.4 - half, -8.0)).length() < 1e-5);
        assert_eq!(game.inbox().rejected_count(), 1);
    }

    #[test]
    fn puppet_body_matches_packet_in_the_same_tick() {
        let mut game = session();
        let start = standing(game.config());
        game.add_local_player("p1", 1, start).unwrap();
        game.add_remote_player("p2", 2, Vec3::new(0.0, start.y, 5.0)).unwrap();
        let target = Vec3::new(10.0, start.y, 5.0);
        let bytes = PositionPacket::from_pose(2, target, Quat::IDENTITY, 0.0).encode();
        game.receive_packet(&bytes).unwrap();

        game.frame(0.25, &InputSnapshot::new());
        assert_eq!(game.physics().step_count(), 1);
        let remote = game.player(2).unwrap();
        assert_eq!(remote.data().position, target);
        let PhysicsBinding::Puppet(body) = remote.physics_binding() else {
            panic!("remote player has no puppet body");
        };
        let placed = game.physics().body_transform(body).unwrap().position;
        assert!((placed - target).length() < 1e-5, "puppet body at {placed}");
    }

    #[test]
    fn non_finite_packet_leaves_puppet_pose_intact() {
        let mut game = session();
        let start = Vec3::new(0.0, 1.4, 0.0);
        game.add_remote_player("p2", 2, start).unwrap();
        let poisoned = PositionPacket {
            player: 2,
            position: Vec3::new(f32::NAN, 1.4, 0.0),
            orientation_w: f32::NAN,
            pitch: f32::NAN,
        };
        assert!(matches!(
            game.receive_packet(&poisoned.encode()),
            Err(ProtocolError::NonFinite(_))
        ));
        for _ in 0..5 {
            game.frame(0.25, &InputSnapshot::new());
        }
        let data = game.player(2).unwrap().data();
        assert_eq!(data.position, start);
        assert!(data.orientation.is_finite());
        assert!(data.orientation.is_normalized());
        assert_eq!(game.inbox().rejected_count(), 1);
    }

    #[test]
    fn disconnected_player_is_removed_on_next_tick() {
        let mut game = session();
        game.add_remote_player("p2", 2, Vec3::new(0.0, 1.4, 0.0)).unwrap();
        let nodes_with_player = game.scene().len();
        game.disconnect(2).unwrap();
        assert!(game.player(2).is_some());

        game.frame(0.25, &InputSnapshot::new());
        assert!(game.player(2).is_none());
        assert_eq!(game.scene().len(), nodes_with_player - 4);
        assert!(matches!(game.disconnect(2), Err(GameError::UnknownPlayer(2))));
    }

    #[test]
    fn local_player_cannot_be_disconnected() {
        let mut game = session();
        let start = standing(game.config());
        game.add_local_player("p1", 1, start).unwrap();
        assert!(matches!(game.disconnect(1), Err(GameError::Setup(_))));
    }

    #[test]
    fn resize_updates_camera_aspect() {
        let mut game = session();
        game.resize(800, 400);
        assert!((game.camera().aspect - 2.0).abs() < 1e-6);
    }

    #[test]
    fn camera_trails_local_player() {
        let mut game = session();
        let start = standing(game.config());
        game.add_local_player("p1", 1, start).unwrap();
        game.frame(0.25, &InputSnapshot::new());
        let local = game.local_player().unwrap();
        let mount = game.scene().derived_position(local.nodes().camera_mount).unwrap();
        assert_eq!(game.camera().position, mount);
    }

    #[test]
    fn renders_scene_as_text() {
        let mut game = session();
        game.add_local_player("p1", 1, standing(game.config())).unwrap();
        let text = game.render(&DebugTextRenderer::new());
        assert!(text.contains("tank"));
        assert!(text.contains("cannon"));
    }
}
