//! Physics World: owns the dynamics world and exposes the narrow surface the
//! game needs (create bodies, step, enumerate transforms).
//!
//! # Invariants
//! - `step` always advances by the fixed step it is given; callers never pass
//!   a variable frame time.
//! - The physics layer knows nothing about rendering. Bodies map to scene nodes
//!   through a typed binding table, never through an opaque pointer.
//! - Character controllers are excluded from body enumeration; they are read
//!   back through the character API.

mod character;
mod shape;
mod world;

pub use character::ControllerHandle;
pub use shape::CollisionShape;
pub use world::{BodyHandle, BodySnapshot, PhysicsError, PhysicsWorld};

pub fn crate_info() -> &'static str {
    "tankyard-physics v0.1.0"
}
