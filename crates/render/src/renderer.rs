use glam::Vec3;

use crate::camera::ChaseCamera;
use crate::scene::SceneGraph;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 10.0, 10.0),
            target: Vec3::ZERO,
            fov_degrees: 60.0,
        }
    }
}

impl From<&ChaseCamera> for RenderView {
    fn from(camera: &ChaseCamera) -> Self {
        Self {
            eye: camera.position,
            target: camera.target,
            fov_degrees: camera.fov.to_degrees(),
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene graph and a view configuration, then produces
/// output. It never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &SceneGraph, view: &RenderView) -> Self::Output;
}

/// Text renderer for headless runs, logs and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &SceneGraph, view: &RenderView) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== Scene ({} nodes) ===\n", scene.len()));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));

        for (id, node) in scene.iter() {
            if id == SceneGraph::ROOT {
                continue;
            }
            let Some(world) = scene.derived_transform(id) else {
                continue;
            };
            let p = world.position;
            out.push_str(&format!(
                "  [{:>3}] {:<16} pos=({:.2}, {:.2}, {:.2})\n",
                id.0, node.name, p.x, p.y, p.z
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tankyard_common::Transform;

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = SceneGraph::new();
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.contains("1 nodes"));
        assert!(!output.contains("root"));
    }

    #[test]
    fn debug_renderer_lists_derived_positions() {
        let mut scene = SceneGraph::new();
        let body = scene
            .create_child(
                SceneGraph::ROOT,
                "tank",
                Transform::from_position(Vec3::new(1.0, 2.0, 3.0)),
            )
            .unwrap();
        scene
            .create_child(body, "cannon", Transform::from_position(Vec3::new(0.0, 1.0, 0.0)))
            .unwrap();

        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.contains("tank"));
        assert!(output.contains("pos=(1.00, 3.00, 3.00)"));
    }

    #[test]
    fn render_view_from_camera() {
        let mut camera = ChaseCamera::default();
        camera.update(Vec3::new(0.0, 3.0, 6.0), Vec3::ZERO);
        let view = RenderView::from(&camera);
        assert_eq!(view.eye, Vec3::new(0.0, 3.0, 6.0));
        assert!((view.fov_degrees - 60.0).abs() < 1e-3);
    }
}
