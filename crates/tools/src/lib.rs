//! Developer tooling: read-only session inspection for the CLI and the
//! desktop window title.
//!
//! # Invariants
//! - Tools never mutate the session they inspect.

mod inspector;

pub use inspector::{PlayerInfo, SessionInspector, SessionSummary};

pub fn crate_info() -> &'static str {
    "tankyard-tools v0.1.0"
}
