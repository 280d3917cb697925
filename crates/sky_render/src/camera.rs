use glam::{Mat4, Vec3};

/// Perspective camera parked at a fixed eye, looking at a fixed target.
pub struct PerspectiveCamera {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(
        fov_y_deg: f32,
        viewport_width: u32,
        viewport_height: u32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            eye: Vec3::ZERO,
            target: Vec3::NEG_Z,
            fov_y: fov_y_deg.to_radians(),
            aspect: aspect_ratio(viewport_width, viewport_height),
            near,
            far,
        }
    }

    pub fn look_at(&mut self, eye: Vec3, target: Vec3) {
        self.eye = eye;
        self.target = target;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_projects_to_screen_center() {
        let mut cam = PerspectiveCamera::new(75.0, 1280, 720, 0.1, 1000.0);
        cam.look_at(Vec3::new(0.0, 10.0, 15.0), Vec3::ZERO);
        let clip = cam.view_projection() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4);
        assert!(ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn zero_sized_viewport_keeps_finite_aspect() {
        let mut cam = PerspectiveCamera::new(75.0, 800, 600, 0.1, 1000.0);
        cam.set_viewport(0, 0);
        assert!(cam.aspect.is_finite());
        assert!(!cam.view_projection().col(0).x.is_nan());
    }
}
