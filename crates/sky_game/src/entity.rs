//! Scene entities and the factory functions that build them.

use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Mat4, Quat, Vec3};
use sky_render::{Color, MeshInstance, ShapeKind};

use crate::scene::Platform;

pub const PLAYER_COLOR: u32 = 0x00ff00;
pub const HOOK_COLOR: u32 = 0xcccccc;
pub const PLATFORM_COLOR: u32 = 0x8b4513;
pub const GROUND_COLOR: u32 = 0x90ee90;

pub const GROUND_SIZE: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

#[derive(Debug, Clone)]
pub struct MeshEntity {
    pub shape: ShapeKind,
    /// Geometry size before the transform's scale.
    pub dimensions: Vec3,
    pub transform: Transform,
    pub color: Color,
    pub visible: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MeshEntity {
    fn new(shape: ShapeKind, dimensions: Vec3, color: u32) -> Self {
        Self {
            shape,
            dimensions,
            transform: Transform::at(Vec3::ZERO),
            color: Color::from_hex(color),
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn instance(&self) -> MeshInstance {
        MeshInstance {
            shape: self.shape,
            model: self.transform.matrix() * Mat4::from_scale(self.dimensions),
            color: self.color,
            cast_shadow: self.cast_shadow,
            receive_shadow: self.receive_shadow,
        }
    }
}

/// Green 1 x 2 x 1 box, yawed by `rotation`.
pub fn create_player_mesh(position: Vec3, rotation: f32) -> MeshEntity {
    let mut player = MeshEntity::new(
        ShapeKind::Box,
        Vec3::new(1.0, 2.0, 1.0),
        PLAYER_COLOR,
    );
    player.transform.position = position;
    player.transform.rotation.y = rotation;
    player.cast_shadow = true;
    player
}

/// Thin cylinder, hidden until a grapple fires.
pub fn create_grapple_hook() -> MeshEntity {
    let mut hook = MeshEntity::new(
        ShapeKind::Cylinder,
        Vec3::new(0.1, 1.0, 0.1),
        HOOK_COLOR,
    );
    hook.visible = false;
    hook
}

pub fn create_platform_mesh(platform: &Platform) -> MeshEntity {
    let mut mesh = MeshEntity::new(
        ShapeKind::Box,
        Vec3::new(3.0, 0.5, 3.0),
        PLATFORM_COLOR,
    );
    mesh.transform.position = platform.position;
    mesh.cast_shadow = true;
    mesh.receive_shadow = true;
    mesh
}

/// Flat ground: the XY plane laid down onto XZ.
pub fn create_ground() -> MeshEntity {
    let mut ground = MeshEntity::new(
        ShapeKind::Plane,
        Vec3::new(GROUND_SIZE, GROUND_SIZE, 1.0),
        GROUND_COLOR,
    );
    ground.transform.rotation.x = -FRAC_PI_2;
    ground.receive_shadow = true;
    ground
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_mesh_takes_placement() {
        let player = create_player_mesh(Vec3::new(0.0, 1.0, 0.0), FRAC_PI_2);
        assert_eq!(player.shape, ShapeKind::Box);
        assert_eq!(player.transform.position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(player.transform.rotation.y, FRAC_PI_2);
        assert!(player.visible && player.cast_shadow);
        assert_eq!(player.color, Color::from_hex(PLAYER_COLOR));
    }

    #[test]
    fn player_box_spans_ground_to_two_units() {
        let player = create_player_mesh(Vec3::new(0.0, 1.0, 0.0), 0.0);
        let model = player.instance().model;
        let bottom = model.transform_point3(Vec3::new(0.0, -0.5, 0.0));
        let top = model.transform_point3(Vec3::new(0.0, 0.5, 0.0));
        assert!(bottom.y.abs() < 1e-6);
        assert!((top.y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn hook_starts_hidden_at_unit_scale() {
        let hook = create_grapple_hook();
        assert!(!hook.visible);
        assert_eq!(hook.transform.scale, Vec3::ONE);
        assert_eq!(hook.shape, ShapeKind::Cylinder);
        // Radius 0.05 on a unit cylinder of radius 0.5.
        assert!((hook.dimensions.x * 0.5 - 0.05).abs() < 1e-6);
    }

    #[test]
    fn ground_lies_flat_facing_up() {
        let ground = create_ground();
        let model = ground.instance().model;
        let normal = model.transform_vector3(Vec3::Z).normalize();
        assert!((normal - Vec3::Y).length() < 1e-5);
        let corner = model.transform_point3(Vec3::new(0.5, 0.5, 0.0));
        assert!((corner.x.abs() - 25.0).abs() < 1e-4);
        assert!((corner.z.abs() - 25.0).abs() < 1e-4);
        assert!(corner.y.abs() < 1e-4);
    }

    #[test]
    fn platform_mesh_sits_at_platform() {
        let platform = Platform {
            position: Vec3::new(3.0, 4.0, -5.0),
        };
        let mesh = create_platform_mesh(&platform);
        assert_eq!(mesh.transform.position, platform.position);
        assert!(mesh.cast_shadow && mesh.receive_shadow);
    }
}
