//! Rendering Adapter: the engine-side scene graph and a renderer-agnostic
//! interface over it.
//!
//! # Invariants
//! - The scene graph owns every node; everyone else holds `NodeId`s and looks
//!   nodes up on each use.
//! - The chase camera stores no offset of its own; it is re-derived every tick
//!   from two world-space points.
//! - Renderers read the scene and a view, never mutate them.

mod camera;
mod renderer;
mod scene;

pub use camera::ChaseCamera;
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use scene::{SceneError, SceneGraph, SceneNode};

pub fn crate_info() -> &'static str {
    "tankyard-render v0.1.0"
}
