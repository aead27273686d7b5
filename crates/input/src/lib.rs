//! Input boundary: a per-frame snapshot of keyboard and mouse state, queried
//! by polling, and the mapping from key states to a single movement intent.
//!
//! # Invariants
//! - Devices are captured once per rendered frame, before game logic runs.
//! - At most one movement intent is active; the first matching direction wins.

pub mod action;
pub mod device;

pub use action::MoveIntent;
pub use device::{InputSnapshot, Key, KeyboardState, MouseButton, MouseState};

pub fn crate_info() -> &'static str {
    "tankyard-input v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("input"));
    }
}
