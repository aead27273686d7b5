//! Game kernel: the fixed-timestep clock and the frame loop that owns the
//! physics world, scene, camera and players.
//!
//! # Invariants
//! - At most one logic/physics tick runs per rendered frame; leftover time
//!   carries over in the accumulator.
//! - The physics world advances by exactly the fixed step, once per tick.
//! - Bound scene nodes are written only after the tick's physics step.
//! - Players flagged as gone are torn down before the tick ends.

mod clock;
mod error;
mod frame;

pub use clock::FixedStepClock;
pub use error::GameError;
pub use frame::{FrameLoop, FrameOutcome};

pub fn crate_info() -> &'static str {
    "tankyard-kernel v0.1.0"
}
