//! Shared types for the tankyard client: transforms, scene-node handles and
//! game configuration.
//!
//! # Invariants
//! - Orientations stored in a `Transform` are unit quaternions.
//! - Handles are plain ids; the owning subsystem validates them on every use.

pub mod config;
pub mod types;

pub use config::{ConfigError, GameConfig};
pub use types::{NodeId, Transform};

pub fn crate_info() -> &'static str {
    "tankyard-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
