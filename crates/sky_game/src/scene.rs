use glam::Vec3;
use rand::Rng;
use sky_render::{AmbientLight, Color, DirectionalLight, MeshInstance, PerspectiveCamera};

use crate::entity::{
    create_grapple_hook, create_ground, create_platform_mesh, create_player_mesh, MeshEntity,
};
use crate::world::GameWorld;

pub const SKY_COLOR: u32 = 0x87ceeb;

/// Where floating platforms may spawn.
#[derive(Debug, Clone, Copy)]
pub struct PlatformField {
    pub count: usize,
    /// Platforms spawn with x and z in `[-half_extent, half_extent)`.
    pub half_extent: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Default for PlatformField {
    fn default() -> Self {
        Self {
            count: 10,
            half_extent: 15.0,
            min_y: 2.0,
            max_y: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    pub position: Vec3,
}

pub fn generate_platforms<R: Rng + ?Sized>(rng: &mut R, field: &PlatformField) -> Vec<Platform> {
    (0..field.count)
        .map(|_| {
            let x = rng.gen_range(-field.half_extent..field.half_extent);
            let y = rng.gen_range(field.min_y..field.max_y);
            let z = rng.gen_range(-field.half_extent..field.half_extent);
            Platform {
                position: Vec3::new(x, y, z),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct CameraRig {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub target: Vec3,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            fov_y_deg: 75.0,
            near: 0.1,
            far: 1000.0,
            eye: Vec3::new(0.0, 10.0, 15.0),
            target: Vec3::ZERO,
        }
    }
}

impl CameraRig {
    pub fn camera(&self, width: u32, height: u32) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(self.fov_y_deg, width, height, self.near, self.far);
        camera.look_at(self.eye, self.target);
        camera
    }
}

/// Everything drawn each frame. Static pieces are built once in `bootstrap`;
/// the player and hook meshes are refreshed from the world by `sync`.
pub struct Scene {
    pub background: Color,
    pub camera_rig: CameraRig,
    pub ambient: AmbientLight,
    pub sun: DirectionalLight,
    pub ground: MeshEntity,
    pub platforms: Vec<Platform>,
    platform_meshes: Vec<MeshEntity>,
    pub player: MeshEntity,
    pub hook: MeshEntity,
}

impl Scene {
    pub fn bootstrap<R: Rng + ?Sized>(
        rng: &mut R,
        field: &PlatformField,
        world: &GameWorld,
    ) -> Self {
        let platforms = generate_platforms(rng, field);
        let platform_meshes = platforms.iter().map(create_platform_mesh).collect();

        let mut scene = Self {
            background: Color::from_hex(SKY_COLOR),
            camera_rig: CameraRig::default(),
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: 0.5,
            },
            sun: DirectionalLight {
                color: Color::WHITE,
                intensity: 0.8,
                position: Vec3::new(5.0, 5.0, 5.0),
                target: Vec3::ZERO,
                cast_shadow: true,
            },
            ground: create_ground(),
            platforms,
            platform_meshes,
            player: create_player_mesh(world.player.position, world.player.rotation),
            hook: create_grapple_hook(),
        };
        scene.sync(world);

        log::info!(
            "Scene ready: {} platforms, player at {:?}",
            scene.platforms.len(),
            world.player.position
        );
        for (i, platform) in scene.platforms.iter().enumerate() {
            log::debug!("  platform[{i}] at {:?}", platform.position);
        }
        scene
    }

    /// Copy the simulated player and hook onto their meshes.
    pub fn sync(&mut self, world: &GameWorld) {
        self.player.transform.position = world.player.position;
        self.player.transform.rotation.y = world.player.rotation;

        self.hook.visible = world.hook.visible;
        self.hook.transform.position = world.hook.position;
        self.hook.transform.scale.y = world.hook.vertical_scale;
    }

    pub fn instances(&self) -> Vec<MeshInstance> {
        std::iter::once(&self.ground)
            .chain(self.platform_meshes.iter())
            .chain([&self.player, &self.hook])
            .filter(|entity| entity.visible)
            .map(MeshEntity::instance)
            .collect()
    }

    pub fn camera(&self, width: u32, height: u32) -> PerspectiveCamera {
        self.camera_rig.camera(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{ControlIntent, GameplayConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sky_core::time::FIXED_DT_US;

    fn bootstrap(seed: u64) -> (Scene, GameWorld) {
        let world = GameWorld::new(GameplayConfig::default());
        let mut rng = StdRng::seed_from_u64(seed);
        let scene = Scene::bootstrap(&mut rng, &PlatformField::default(), &world);
        (scene, world)
    }

    #[test]
    fn generates_ten_platforms_within_bounds() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let platforms = generate_platforms(&mut rng, &PlatformField::default());
            assert_eq!(platforms.len(), 10);
            for p in &platforms {
                assert!(p.position.x >= -15.0 && p.position.x < 15.0);
                assert!(p.position.z >= -15.0 && p.position.z < 15.0);
                assert!(p.position.y >= 2.0 && p.position.y < 10.0);
            }
        }
    }

    #[test]
    fn same_seed_gives_same_layout() {
        let (a, _) = bootstrap(42);
        let (b, _) = bootstrap(42);
        assert_eq!(a.platforms, b.platforms);
    }

    #[test]
    fn bootstrap_places_player_and_hides_hook() {
        let (scene, _) = bootstrap(1);
        assert_eq!(scene.player.transform.position, Vec3::new(0.0, 1.0, 0.0));
        assert!(!scene.hook.visible);
        // Ground, ten platforms and the player; the hook is hidden.
        assert_eq!(scene.instances().len(), 12);
    }

    #[test]
    fn lighting_and_background_match_the_sky() {
        let (scene, _) = bootstrap(1);
        assert_eq!(scene.background, Color::from_hex(0x87ceeb));
        assert_eq!(scene.ambient.intensity, 0.5);
        assert_eq!(scene.sun.intensity, 0.8);
        assert!(scene.sun.cast_shadow);
        assert_eq!(scene.sun.position, Vec3::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn camera_looks_at_origin_from_above_and_behind() {
        let (scene, _) = bootstrap(1);
        let camera = scene.camera(1280, 720);
        assert_eq!(camera.eye, Vec3::new(0.0, 10.0, 15.0));
        assert_eq!(camera.target, Vec3::ZERO);
        let clip = camera.view_projection() * Vec3::ZERO.extend(1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }

    #[test]
    fn sync_tracks_player_and_hook() {
        let (mut scene, mut world) = bootstrap(3);
        let fire = ControlIntent {
            left: true,
            grapple: true,
            ..ControlIntent::default()
        };
        world.step(fire, FIXED_DT_US);
        scene.sync(&world);

        assert_eq!(scene.player.transform.position, world.player.position);
        assert_eq!(scene.player.transform.rotation.y, world.player.rotation);
        assert!(scene.hook.visible);
        assert_eq!(scene.hook.transform.position, world.hook.position);
        assert_eq!(scene.hook.transform.scale.y, world.hook.vertical_scale);
        assert_eq!(scene.instances().len(), 13);
    }
}
