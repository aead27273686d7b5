use glam::{EulerRot, Vec3};
use serde::Serialize;
use tankyard_kernel::FrameLoop;
use tankyard_player::Player;

/// Session inspector for developer tooling.
///
/// Read-only queries against a running frame loop, for logs, the CLI and the
/// window title.
pub struct SessionInspector;

impl SessionInspector {
    pub fn summary(game: &FrameLoop) -> SessionSummary {
        SessionSummary {
            tick: game.tick_count(),
            physics_steps: game.physics().step_count(),
            players: game.players().len(),
            bodies: game.physics().body_count(),
            colliders: game.physics().collision_object_count(),
            scene_nodes: game.scene().len(),
            rejected_packets: game.inbox().rejected_count(),
        }
    }

    pub fn inspect_player(game: &FrameLoop, number: i32) -> Option<PlayerInfo> {
        game.player(number).map(PlayerInfo::from)
    }

    pub fn list_players(game: &FrameLoop) -> Vec<PlayerInfo> {
        game.players().iter().map(PlayerInfo::from).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub tick: u64,
    pub physics_steps: u64,
    pub players: usize,
    pub bodies: usize,
    pub colliders: usize,
    pub scene_nodes: usize,
    pub rejected_packets: u64,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tick={} steps={} players={} bodies={} colliders={} nodes={} rejected={}",
            self.tick,
            self.physics_steps,
            self.players,
            self.bodies,
            self.colliders,
            self.scene_nodes,
            self.rejected_packets
        )
    }
}

/// One player's pose as shown to developers.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerInfo {
    pub number: i32,
    pub name: String,
    pub networked: bool,
    pub position: Vec3,
    /// Heading around +Y, degrees.
    pub yaw: f32,
    pub pitch: f32,
}

impl From<&Player> for PlayerInfo {
    fn from(player: &Player) -> Self {
        let data = player.data();
        let (yaw, _, _) = data.orientation.to_euler(EulerRot::YXZ);
        Self {
            number: player.number(),
            name: player.name().to_owned(),
            networked: player.is_networked(),
            position: data.position,
            yaw: yaw.to_degrees(),
            pitch: data.pitch,
        }
    }
}

impl std::fmt::Display for PlayerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Player #{} {:<8} {} pos=({:.2}, {:.2}, {:.2}) yaw={:.1} pitch={:.1}",
            self.number,
            self.name,
            if self.networked { "remote" } else { "local " },
            self.position.x,
            self.position.y,
            self.position.z,
            self.yaw,
            self.pitch,
        )
    }
}
