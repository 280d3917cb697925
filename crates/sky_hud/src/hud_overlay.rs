//! Status HUD and debug window drawn with egui over the 3D scene.
//!
//! egui needs a `RenderPass<'static>` while `begin_render_pass` borrows the
//! encoder, so a frame is split into phases:
//!
//!   1. `prepare()` runs the UI and tessellates it
//!   2. `upload()` pushes textures and buffers (borrows the encoder mutably)
//!   3. `paint()` draws into a pass created with `forget_lifetime()`
//!   4. `cleanup()` frees textures egui no longer references
//!
//! The status panel is always shown. The debug window is toggled with F3.

use sky_core::time::TimeState;
use winit::window::Window;

pub const PANEL_OFFSET: f32 = 20.0;

pub const CONTROL_LEGEND: [&str; 4] = ["Controls:", "Arrows: Move", "Space: Jump", "G: Grapple"];

/// Player values the status panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudSnapshot {
    pub health: u8,
    pub can_grapple: bool,
}

impl HudSnapshot {
    pub fn grapple_ready_label(&self) -> &'static str {
        if self.can_grapple {
            "Yes"
        } else {
            "No"
        }
    }

    pub fn status_lines(&self) -> [String; 2] {
        [
            format!("Health: {}", self.health),
            format!("Grapple Ready: {}", self.grapple_ready_label()),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct DebugStats {
    pub sim_clock_us: u64,
    pub player_position: [f32; 3],
    pub jump_phase: &'static str,
    pub hook_phase: &'static str,
    pub grapple_cooldown_us: u64,
    pub draw_calls: u32,
    pub instance_count: u32,
    pub shadow_casters: u32,
}

pub struct HudOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub debug_visible: bool,
}

impl HudOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            debug_visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.egui_winit_state.on_window_event(window, event).consumed
    }

    pub fn toggle_debug(&mut self) {
        self.debug_visible = !self.debug_visible;
        log::info!(
            "Debug window: {}",
            if self.debug_visible { "ON" } else { "OFF" }
        );
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        hud: HudSnapshot,
        time: &TimeState,
        stats: &DebugStats,
    ) -> (Vec<egui::ClippedPrimitive>, egui::TexturesDelta) {
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let debug_visible = self.debug_visible;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            status_panel(ctx, hud);
            if debug_visible {
                debug_window(ctx, time, stats);
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn status_panel(ctx: &egui::Context, hud: HudSnapshot) {
    egui::Area::new(egui::Id::new("status_panel"))
        .fixed_pos(egui::pos2(PANEL_OFFSET, PANEL_OFFSET))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(egui::Color32::from_black_alpha(128))
                .corner_radius(egui::CornerRadius::same(5))
                .inner_margin(egui::Margin::same(10))
                .show(ui, |ui| {
                    for line in hud.status_lines() {
                        ui.label(egui::RichText::new(line).color(egui::Color32::WHITE));
                    }
                    ui.add_space(6.0);
                    for line in CONTROL_LEGEND {
                        ui.label(
                            egui::RichText::new(line)
                                .color(egui::Color32::WHITE)
                                .size(12.0),
                        );
                    }
                });
        });
}

fn debug_window(ctx: &egui::Context, time: &TimeState, stats: &DebugStats) {
    egui::Window::new("Debug")
        .default_pos([ctx.screen_rect().width() - 240.0, 20.0])
        .show(ctx, |ui| {
            ui.label(format!("FPS: {:.1}", time.smoothed_fps));
            ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
            ui.label(format!("Steps this frame: {}", time.steps_this_frame));
            ui.label(format!("Total steps: {}", time.fixed_step_count));
            ui.label(format!(
                "Sim clock: {:.3} s",
                stats.sim_clock_us as f64 / 1_000_000.0
            ));
            ui.separator();
            let [x, y, z] = stats.player_position;
            ui.label(format!("Player: ({x:.2}, {y:.2}, {z:.2})"));
            ui.label(format!("Jump: {}", stats.jump_phase));
            ui.label(format!("Hook: {}", stats.hook_phase));
            ui.label(format!(
                "Grapple cooldown: {} ms",
                stats.grapple_cooldown_us / 1_000
            ));
            ui.separator();
            ui.label(format!("Draw calls: {}", stats.draw_calls));
            ui.label(format!("Instances: {}", stats.instance_count));
            ui.label(format!("Shadow casters: {}", stats.shadow_casters));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grapple_label_reflects_readiness() {
        let ready = HudSnapshot {
            health: 100,
            can_grapple: true,
        };
        assert_eq!(ready.grapple_ready_label(), "Yes");
        let cooling = HudSnapshot {
            can_grapple: false,
            ..ready
        };
        assert_eq!(cooling.grapple_ready_label(), "No");
    }

    #[test]
    fn status_lines_read_health_then_grapple() {
        let hud = HudSnapshot {
            health: 100,
            can_grapple: false,
        };
        assert_eq!(
            hud.status_lines(),
            ["Health: 100".to_string(), "Grapple Ready: No".to_string()]
        );
    }

    #[test]
    fn legend_lists_every_control() {
        assert_eq!(CONTROL_LEGEND[0], "Controls:");
        assert!(CONTROL_LEGEND.contains(&"Arrows: Move"));
        assert!(CONTROL_LEGEND.contains(&"Space: Jump"));
        assert!(CONTROL_LEGEND.contains(&"G: Grapple"));
    }
}
