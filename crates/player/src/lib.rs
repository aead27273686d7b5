//! Player model: one shared data record mutated by a fixed sequence of
//! components each tick.
//!
//! # Invariants
//! - `PlayerData` is owned by exactly one `Player`.
//! - Per tick, components run in the order input/network, physics, graphics,
//!   camera; each phase is the only writer of the data it touches.
//! - Components hold handles, never the engine objects themselves.
//! - A physics update that fails marks the player as gone; the remaining
//!   phases are skipped for that tick.

pub mod components;
mod data;
mod player;

pub use components::{
    CameraComponent, GraphicsComponent, InputComponent, NetworkComponent, PhysicsBinding,
    PhysicsComponent,
};
pub use data::PlayerData;
pub use player::{Control, Player, PlayerError, PlayerNodes, TickContext};

pub fn crate_info() -> &'static str {
    "tankyard-player v0.1.0"
}
