//! Gameplay simulation: one `step` per fixed tick.
//!
//! Every timed behaviour (jump hang, hook hold, grapple cooldown) is state on
//! `GameWorld` measured against the simulated clock, and the whole world
//! advances in a single call. A step runs in this order:
//!
//!   1. expire timers whose deadline has been reached
//!   2. apply movement for each held direction (later keys win the facing)
//!   3. start a jump if not already jumping; its first rise applies at once
//!   4. fire the grapple if ready; its first extension applies at once
//!   5. advance animations already in flight (jump rise, hook extension)
//!
//! Timers fire before input is read, so a key held across a cooldown expiry
//! retriggers on the same tick the cooldown clears. Because a new jump rises
//! before the grapple check, a hook fired on the jump's first tick anchors
//! above the already-raised player.

use glam::Vec3;
use sky_core::input::{InputState, Key};

use crate::grapple::{GrappleCooldown, GrappleHook, HookPhase};
use crate::player::{facing, JumpPhase, PlayerState};

#[derive(Debug, Clone, Copy)]
pub struct GameplayConfig {
    /// Distance moved per tick while a direction is held.
    pub move_step: f32,
    pub jump_rise_step: f32,
    pub jump_apex_y: f32,
    /// Height the player stands at, and returns to after a jump.
    pub ground_y: f32,
    pub jump_hang_us: u64,
    pub hook_offset_y: f32,
    pub hook_extend_step: f32,
    pub hook_max_scale: f32,
    pub hook_hold_us: u64,
    pub grapple_cooldown_us: u64,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            move_step: 0.1,
            jump_rise_step: 0.2,
            jump_apex_y: 3.0,
            ground_y: 1.0,
            jump_hang_us: 500_000,
            hook_offset_y: 2.0,
            hook_extend_step: 0.5,
            hook_max_scale: 10.0,
            hook_hold_us: 500_000,
            grapple_cooldown_us: 2_000_000,
        }
    }
}

/// What the player asked for this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlIntent {
    pub left: bool,
    pub right: bool,
    pub forward: bool,
    pub backward: bool,
    pub jump: bool,
    pub grapple: bool,
}

impl ControlIntent {
    pub fn from_input(input: &InputState) -> Self {
        Self {
            left: input.is_held(Key::Left),
            right: input.is_held(Key::Right),
            forward: input.is_held(Key::Up),
            backward: input.is_held(Key::Down),
            jump: input.is_held(Key::Space),
            grapple: input.is_held(Key::G),
        }
    }
}

pub struct GameWorld {
    pub config: GameplayConfig,
    pub player: PlayerState,
    pub hook: GrappleHook,
    jump: JumpPhase,
    hook_phase: HookPhase,
    cooldown: GrappleCooldown,
    clock_us: u64,
}

impl GameWorld {
    pub fn new(config: GameplayConfig) -> Self {
        Self {
            player: PlayerState::new(Vec3::new(0.0, config.ground_y, 0.0)),
            hook: GrappleHook::new(),
            jump: JumpPhase::Idle,
            hook_phase: HookPhase::Hidden,
            cooldown: GrappleCooldown::default(),
            clock_us: 0,
            config,
        }
    }

    pub fn clock_us(&self) -> u64 {
        self.clock_us
    }

    pub fn jump_phase(&self) -> JumpPhase {
        self.jump
    }

    pub fn hook_phase(&self) -> HookPhase {
        self.hook_phase
    }

    pub fn grapple_cooldown_remaining_us(&self) -> u64 {
        self.cooldown
            .remaining_us(self.clock_us, self.config.grapple_cooldown_us)
    }

    pub fn step(&mut self, intent: ControlIntent, dt_us: u64) {
        self.clock_us += dt_us;
        let now = self.clock_us;

        self.expire_timers(now);
        debug_assert_eq!(self.player.can_grapple, self.cooldown.is_ready());
        self.apply_movement(intent);

        let jump_started = intent.jump && !self.player.is_jumping;
        if jump_started {
            self.player.is_jumping = true;
            self.jump = JumpPhase::Rising;
            log::debug!("Jump started at y={:.2}", self.player.position.y);
            self.advance_jump(now);
        }

        let grapple_fired = intent.grapple && self.player.can_grapple;
        if grapple_fired {
            self.fire_grapple(now);
            self.advance_hook(now);
        }

        if !jump_started {
            self.advance_jump(now);
        }
        if !grapple_fired {
            self.advance_hook(now);
        }
    }

    fn expire_timers(&mut self, now: u64) {
        if let JumpPhase::Hanging { since_us } = self.jump {
            if now - since_us >= self.config.jump_hang_us {
                self.player.position.y = self.config.ground_y;
                self.player.is_jumping = false;
                self.jump = JumpPhase::Idle;
                log::debug!("Jump landed");
            }
        }

        if let HookPhase::Retracting { since_us } = self.hook_phase {
            if now - since_us >= self.config.hook_hold_us {
                self.hook.hide();
                self.hook_phase = HookPhase::Hidden;
            }
        }

        if self.cooldown.expire(now, self.config.grapple_cooldown_us) {
            self.player.can_grapple = true;
            log::debug!("Grapple ready");
        }
    }

    fn apply_movement(&mut self, intent: ControlIntent) {
        let step = self.config.move_step;
        let player = &mut self.player;
        if intent.left {
            player.position.x -= step;
            player.rotation = facing::LEFT;
        }
        if intent.right {
            player.position.x += step;
            player.rotation = facing::RIGHT;
        }
        if intent.forward {
            player.position.z -= step;
            player.rotation = facing::FORWARD;
        }
        if intent.backward {
            player.position.z += step;
            player.rotation = facing::BACKWARD;
        }
    }

    fn fire_grapple(&mut self, now: u64) {
        // Anchor is captured once; the hook does not follow the player.
        self.hook.position = self.player.position + Vec3::Y * self.config.hook_offset_y;
        self.hook.visible = true;
        self.hook.vertical_scale = 1.0;
        self.hook_phase = HookPhase::Extending;

        self.player.can_grapple = false;
        self.cooldown.start(now);
        log::debug!("Grapple fired at {:?}", self.hook.position);
    }

    fn advance_jump(&mut self, now: u64) {
        if self.jump == JumpPhase::Rising {
            self.player.position.y += self.config.jump_rise_step;
            if self.player.position.y >= self.config.jump_apex_y {
                self.jump = JumpPhase::Hanging { since_us: now };
            }
        }
    }

    fn advance_hook(&mut self, now: u64) {
        if self.hook_phase == HookPhase::Extending {
            self.hook.vertical_scale += self.config.hook_extend_step;
            if self.hook.vertical_scale >= self.config.hook_max_scale {
                self.hook_phase = HookPhase::Retracting { since_us: now };
            }
        }
    }
}

impl Default for GameWorld {
    fn default() -> Self {
        Self::new(GameplayConfig::default())
    }
}
