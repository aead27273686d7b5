//! Wire format for multiplayer position sync.
//!
//! One fixed 28-byte packet per networked player per tick, sent unreliably.
//! There is no sequencing or acknowledgement; receivers always apply the most
//! recently received packet.

pub mod codec;
mod inbox;

pub use codec::{PACKET_LEN, PACKET_MAGIC, PositionPacket, ProtocolError};
pub use inbox::PacketInbox;

pub fn crate_info() -> &'static str {
    "tankyard-protocol v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("protocol"));
    }
}
