use glam::{Mat4, Vec3};

/// Chase camera that trails a tracked entity.
///
/// Holds no offset of its own: each update places it at the camera-mount point
/// and aims it at the sight point, both supplied in world space.
#[derive(Debug, Clone)]
pub struct ChaseCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ChaseCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 15.0),
            target: Vec3::ZERO,
            fov: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl ChaseCamera {
    /// Re-derive the camera pose from the two tracked world-space points.
    pub fn update(&mut self, camera_point: Vec3, sight_point: Vec3) {
        self.position = camera_point;
        self.target = sight_point;
    }

    /// Keep the projection in step with the viewport.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = ChaseCamera::default();
        assert!(cam.position.y > 0.0);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn update_replaces_pose_without_memory() {
        let mut cam = ChaseCamera::default();
        cam.update(Vec3::new(0.0, 3.0, 6.0), Vec3::new(0.0, 1.0, -10.0));
        cam.update(Vec3::new(5.0, 3.0, 6.0), Vec3::new(5.0, 1.0, -10.0));
        assert_eq!(cam.position, Vec3::new(5.0, 3.0, 6.0));
        assert_eq!(cam.target, Vec3::new(5.0, 1.0, -10.0));
    }

    #[test]
    fn viewport_sets_aspect() {
        let mut cam = ChaseCamera::default();
        cam.set_viewport(800, 400);
        assert_eq!(cam.aspect, 2.0);
        cam.set_viewport(800, 0);
        assert_eq!(cam.aspect, 800.0);
    }

    #[test]
    fn forward_points_at_target() {
        let mut cam = ChaseCamera::default();
        cam.update(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(cam.forward(), Vec3::NEG_Z);
    }
}
