//! Binary codec for the position packet.
//!
//! Layout (little-endian, no padding):
//!
//! ```text
//! offset  size  field
//!      0     4  magic "PINF"
//!      4     4  player number (i32)
//!      8     4  position.x (f32)
//!     12     4  position.y (f32)
//!     16     4  position.z (f32)
//!     20     4  orientation.w (f32, yaw-only quaternion)
//!     24     4  cannon pitch, degrees (f32)
//! ```

use glam::{Quat, Vec3};

/// Leading tag of every position packet.
pub const PACKET_MAGIC: [u8; 4] = *b"PINF";

/// Encoded size of a position packet.
pub const PACKET_LEN: usize = 28;

/// Errors that can occur while decoding a packet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("bad magic tag {0:?}")]
    BadMagic([u8; 4]),
    #[error("packet truncated: {len} of {} bytes", PACKET_LEN)]
    Truncated { len: usize },
    #[error("non-finite {0} field")]
    NonFinite(&'static str),
}

/// A player's pose as sent over the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionPacket {
    pub player: i32,
    pub position: Vec3,
    /// Scalar part of the facing quaternion. The vector part is implied: the
    /// rotation is a pure yaw around +Y with a non-negative Y component.
    pub orientation_w: f32,
    /// Cannon tilt in degrees.
    pub pitch: f32,
}

impl PositionPacket {
    /// Build a packet from a full orientation, keeping only its yaw.
    pub fn from_pose(player: i32, position: Vec3, orientation: Quat, pitch: f32) -> Self {
        Self {
            player,
            position,
            orientation_w: yaw_to_wire(orientation),
            pitch,
        }
    }

    /// Orientation reconstructed from the transmitted scalar part.
    pub fn orientation(&self) -> Quat {
        yaw_from_wire(self.orientation_w)
    }

    pub fn encode(&self) -> [u8; PACKET_LEN] {
        let mut buf = [0u8; PACKET_LEN];
        buf[0..4].copy_from_slice(&PACKET_MAGIC);
        buf[4..8].copy_from_slice(&self.player.to_le_bytes());
        buf[8..12].copy_from_slice(&self.position.x.to_le_bytes());
        buf[12..16].copy_from_slice(&self.position.y.to_le_bytes());
        buf[16..20].copy_from_slice(&self.position.z.to_le_bytes());
        buf[20..24].copy_from_slice(&self.orientation_w.to_le_bytes());
        buf[24..28].copy_from_slice(&self.pitch.to_le_bytes());
        buf
    }

    /// Whether every float field is a usable number.
    pub fn is_finite(&self) -> bool {
        self.non_finite_field().is_none()
    }

    fn non_finite_field(&self) -> Option<&'static str> {
        if !self.position.is_finite() {
            Some("position")
        } else if !self.orientation_w.is_finite() {
            Some("orientation")
        } else if !self.pitch.is_finite() {
            Some("pitch")
        } else {
            None
        }
    }

    /// Decode a packet. Nothing is produced unless the tag matches, the
    /// buffer holds a whole packet and every float is finite.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let Some(tag) = data.get(0..4) else {
            return Err(ProtocolError::Truncated { len: data.len() });
        };
        let tag = read4(tag);
        if tag != PACKET_MAGIC {
            return Err(ProtocolError::BadMagic(tag));
        }
        if data.len() < PACKET_LEN {
            return Err(ProtocolError::Truncated { len: data.len() });
        }
        let f = |at: usize| f32::from_le_bytes(read4(&data[at..at + 4]));
        let packet = Self {
            player: i32::from_le_bytes(read4(&data[4..8])),
            position: Vec3::new(f(8), f(12), f(16)),
            orientation_w: f(20),
            pitch: f(24),
        };
        match packet.non_finite_field() {
            Some(field) => Err(ProtocolError::NonFinite(field)),
            None => Ok(packet),
        }
    }
}

fn read4(bytes: &[u8]) -> [u8; 4] {
    [bytes[0], bytes[1], bytes[2], bytes[3]]
}

/// Scalar part of the yaw of `q`, sign-adjusted so the receiver can rebuild
/// the rotation with a non-negative Y component.
pub fn yaw_to_wire(q: Quat) -> f32 {
    let (axis_y, w) = (q.y, q.w);
    let norm = (axis_y * axis_y + w * w).sqrt();
    if norm <= f32::EPSILON {
        return 1.0;
    }
    let w = w / norm;
    if axis_y < 0.0 { -w } else { w }
}

/// Pure yaw rotation whose scalar part is `w`. A non-finite `w` gives the
/// identity.
pub fn yaw_from_wire(w: f32) -> Quat {
    if !w.is_finite() {
        return Quat::IDENTITY;
    }
    let w = w.clamp(-1.0, 1.0);
    Quat::from_xyzw(0.0, (1.0 - w * w).max(0.0).sqrt(), 0.0, w)
}
