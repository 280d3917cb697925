use glam::{Mat4, Vec3};

use crate::color::Color;

#[derive(Debug, Clone, Copy)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Directional light placed at `position`, shining toward `target`.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub cast_shadow: bool,
}

/// Half-size of the square the shadow map covers, in world units.
const SHADOW_EXTENT: f32 = 30.0;
const SHADOW_DISTANCE: f32 = 40.0;

impl DirectionalLight {
    /// Unit vector pointing from the surface toward the light.
    pub fn to_light(&self) -> Vec3 {
        (self.position - self.target)
            .try_normalize()
            .unwrap_or(Vec3::Y)
    }

    /// Orthographic view-projection used to render the shadow map.
    pub fn shadow_view_projection(&self) -> Mat4 {
        let eye = self.target + self.to_light() * SHADOW_DISTANCE;
        let view = Mat4::look_at_rh(eye, self.target, Vec3::Y);
        let proj = Mat4::orthographic_rh(
            -SHADOW_EXTENT,
            SHADOW_EXTENT,
            -SHADOW_EXTENT,
            SHADOW_EXTENT,
            0.1,
            SHADOW_DISTANCE * 2.5,
        );
        proj * view
    }
}
