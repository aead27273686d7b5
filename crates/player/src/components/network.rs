use glam::Vec3;
use tankyard_protocol::PacketInbox;

use crate::data::PlayerData;

/// Feeds a networked player's data from the latest received packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkComponent {
    pub player_number: i32,
}

impl NetworkComponent {
    pub fn new(player_number: i32) -> Self {
        Self { player_number }
    }

    /// Copy the latest packet into `data`. Returns `false` if nothing has
    /// arrived yet, in which case `data` keeps its last known state.
    pub fn update(&self, data: &mut PlayerData, inbox: &PacketInbox) -> bool {
        let Some(packet) = inbox.latest(self.player_number) else {
            return false;
        };
        data.position = packet.position;
        data.orientation = packet.orientation();
        data.pitch = packet.pitch;
        data.velocity = Vec3::ZERO;
        true
    }
}
