//! The five player components. Each reads and writes `PlayerData` and talks
//! to exactly one external subsystem.

mod camera;
mod graphics;
mod input;
mod network;
mod physics;

pub use camera::CameraComponent;
pub use graphics::GraphicsComponent;
pub use input::InputComponent;
pub use network::NetworkComponent;
pub use physics::{PhysicsBinding, PhysicsComponent};
