//! Skyhook: a third-person platformer sandbox with a cosmetic grapple hook.
//!
//! winit drives the event loop via `ApplicationHandler`. Simulation runs
//! inside `RedrawRequested` on a fixed timestep (see `TimeState`):
//!
//!   1. `begin_frame()` measures the wall-clock delta and feeds the accumulator
//!   2. `while should_step()` reads held keys into a `ControlIntent` and
//!      advances `GameWorld` by one tick
//!   3. the scene meshes are synced from the world and drawn with shadows
//!   4. the HUD is composited on top with egui

mod entity;
mod grapple;
mod player;
#[cfg(test)]
mod replay;
mod scene;
mod world;

use std::sync::Arc;

use rand::SeedableRng;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use scene::{PlatformField, Scene};
use sky_core::input::{InputState, Key};
use sky_core::time::TimeState;
use sky_hud::{DebugStats, HudOverlay, HudSnapshot};
use sky_platform::window::PlatformConfig;
use sky_render::{FrameScene, GpuContext, MeshRenderer, PerspectiveCamera, RenderStats};
use world::{ControlIntent, GameWorld, GameplayConfig};

struct GameState {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: MeshRenderer,
    hud: HudOverlay,
    time: TimeState,
    input: InputState,
    world: GameWorld,
    scene: Scene,
    camera: PerspectiveCamera,
    last_stats: RenderStats,
}

impl GameState {
    fn new(window: Arc<Window>) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone())?;
        let (width, height) = gpu.size;
        let renderer = MeshRenderer::new(&gpu.device, gpu.surface_format, width, height);
        let hud = HudOverlay::new(&gpu.device, gpu.surface_format, &window);

        let world = GameWorld::new(GameplayConfig::default());
        let mut rng = rand::rngs::StdRng::from_entropy();
        let scene = Scene::bootstrap(&mut rng, &PlatformField::default(), &world);
        let camera = scene.camera(width, height);

        Ok(Self {
            window,
            gpu,
            renderer,
            hud,
            time: TimeState::new(),
            input: InputState::new(),
            world,
            scene,
            camera,
            last_stats: RenderStats::default(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.renderer.resize(&self.gpu.device, width, height);
        self.camera.set_viewport(width, height);
        log::info!("Resized to {}x{}", width, height);
    }

    fn debug_stats(&self) -> DebugStats {
        DebugStats {
            sim_clock_us: self.world.clock_us(),
            player_position: self.world.player.position.to_array(),
            jump_phase: self.world.jump_phase().label(),
            hook_phase: self.world.hook_phase().label(),
            grapple_cooldown_us: self.world.grapple_cooldown_remaining_us(),
            draw_calls: self.last_stats.draw_calls,
            instance_count: self.last_stats.instance_count,
            shadow_casters: self.last_stats.shadow_casters,
        }
    }

    fn hud_snapshot(&self) -> HudSnapshot {
        HudSnapshot {
            health: self.world.player.health(),
            can_grapple: self.world.player.can_grapple,
        }
    }

    /// Returns false when the game should exit.
    fn redraw(&mut self) -> bool {
        if self.gpu.size.0 == 0 || self.gpu.size.1 == 0 {
            return true;
        }

        self.time.begin_frame();
        while self.time.should_step() {
            // Edges stay set for every step of this frame; act on them once.
            if self.time.steps_this_frame == 1 {
                if self.input.is_just_pressed(Key::Escape) {
                    log::info!("Escape pressed, exiting.");
                    return false;
                }
                if self.input.is_just_pressed(Key::F3) {
                    self.hud.toggle_debug();
                }
            }

            let intent = ControlIntent::from_input(&self.input);
            self.world.step(intent, self.time.fixed_dt_us);
        }

        self.scene.sync(&self.world);

        let Some((output, view)) = self.gpu.begin_frame() else {
            return true;
        };

        let hud = self.hud_snapshot();
        let stats = self.debug_stats();
        let (egui_primitives, egui_textures_delta) =
            self.hud.prepare(&self.window, hud, &self.time, &stats);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let instances = self.scene.instances();
        self.last_stats = self.renderer.render(
            &self.gpu.queue,
            &mut encoder,
            &view,
            &FrameScene {
                background: self.scene.background,
                camera: &self.camera,
                ambient: &self.scene.ambient,
                sun: &self.scene.sun,
                instances: &instances,
            },
        );

        self.hud.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("HUD Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.hud
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.hud.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        // Edges are only cleared once a fixed step has seen them, so a press
        // landing on a zero-step frame is not lost.
        if self.time.steps_this_frame > 0 {
            self.input.end_frame();
        }
        true
    }
}

struct App {
    config: PlatformConfig,
    state: Option<GameState>,
}

impl App {
    fn new() -> Self {
        Self {
            config: PlatformConfig::default(),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let started = sky_platform::window::create_window(event_loop, &self.config)
            .and_then(GameState::new);
        match started {
            Ok(state) => {
                log::info!(
                    "Window created: {}x{}",
                    self.config.width,
                    self.config.height
                );
                self.state = Some(state);
            }
            Err(err) => {
                log::error!("Startup failed: {err}");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state.hud.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.resize(w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(game_key) = map_key(key_code) {
                        apply_key_event(&mut state.input, game_key, event.state, egui_consumed);
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if !state.redraw() {
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

/// Presses egui consumed are ignored, releases always land so no key sticks.
fn apply_key_event(input: &mut InputState, key: Key, state: ElementState, egui_consumed: bool) {
    match state {
        ElementState::Pressed if !egui_consumed => input.key_down(key),
        ElementState::Pressed => {}
        ElementState::Released => input.key_up(key),
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Space => Some(Key::Space),
        KeyCode::KeyG => Some(Key::G),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F3 => Some(Key::F3),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Skyhook starting...");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {err}");
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {err}");
    }
}
