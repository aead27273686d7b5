use std::collections::BTreeMap;

use crate::codec::{PositionPacket, ProtocolError};

/// Most recent packet per remote player.
///
/// Arrival order is the only order: a packet replaces whatever was stored for
/// its player, so dropped or reordered packets simply leave the last one in place.
#[derive(Debug, Default)]
pub struct PacketInbox {
    latest: BTreeMap<i32, PositionPacket>,
    rejected: u64,
}

impl PacketInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode raw bytes and store the packet. Malformed input is counted and
    /// discarded; previously stored packets are left untouched.
    pub fn receive(&mut self, bytes: &[u8]) -> Result<i32, ProtocolError> {
        match PositionPacket::decode(bytes) {
            Ok(packet) => {
                self.deliver(packet);
                Ok(packet.player)
            }
            Err(e) => {
                self.rejected += 1;
                tracing::warn!(len = bytes.len(), "discarding position packet: {e}");
                Err(e)
            }
        }
    }

    /// Store an already decoded packet. Packets carrying non-finite numbers
    /// are counted as rejected and dropped.
    pub fn deliver(&mut self, packet: PositionPacket) {
        if !packet.is_finite() {
            self.rejected += 1;
            tracing::warn!(player = packet.player, "discarding non-finite position packet");
            return;
        }
        self.latest.insert(packet.player, packet);
    }

    pub fn latest(&self, player: i32) -> Option<&PositionPacket> {
        self.latest.get(&player)
    }

    /// Drop state for a player that left the session.
    pub fn forget(&mut self, player: i32) -> Option<PositionPacket> {
        self.latest.remove(&player)
    }

    pub fn rejected_count(&self) -> u64 {
        self.rejected
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}
