//! Grapple hook visual and the grapple cooldown.
//!
//! The hook is purely cosmetic: on trigger it appears above the player,
//! stretches vertically once per tick up to a maximum, holds for a fixed
//! time, then hides. The cooldown gating the next trigger is independent of
//! the hook's own visual phase.

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrappleHook {
    pub position: Vec3,
    pub visible: bool,
    pub vertical_scale: f32,
}

impl GrappleHook {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            visible: false,
            vertical_scale: 1.0,
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.vertical_scale = 1.0;
    }
}

impl Default for GrappleHook {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookPhase {
    #[default]
    Hidden,
    Extending,
    Retracting {
        since_us: u64,
    },
}

impl HookPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Extending => "extending",
            Self::Retracting { .. } => "retracting",
        }
    }
}

/// Tracks when the last grapple fired. Ready when nothing is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GrappleCooldown {
    triggered_at_us: Option<u64>,
}

impl GrappleCooldown {
    pub fn start(&mut self, now_us: u64) {
        self.triggered_at_us = Some(now_us);
    }

    pub fn is_ready(&self) -> bool {
        self.triggered_at_us.is_none()
    }

    /// Clears the cooldown once `duration_us` has elapsed since the trigger.
    /// Returns true on the call that clears it.
    pub fn expire(&mut self, now_us: u64, duration_us: u64) -> bool {
        match self.triggered_at_us {
            Some(at) if now_us.saturating_sub(at) >= duration_us => {
                self.triggered_at_us = None;
                true
            }
            _ => false,
        }
    }

    pub fn remaining_us(&self, now_us: u64, duration_us: u64) -> u64 {
        self.triggered_at_us
            .map(|at| duration_us.saturating_sub(now_us.saturating_sub(at)))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_hook_is_hidden_at_unit_scale() {
        let hook = GrappleHook::new();
        assert!(!hook.visible);
        assert_eq!(hook.vertical_scale, 1.0);
    }

    #[test]
    fn hide_resets_scale() {
        let mut hook = GrappleHook::new();
        hook.visible = true;
        hook.vertical_scale = 10.5;
        hook.hide();
        assert!(!hook.visible);
        assert_eq!(hook.vertical_scale, 1.0);
    }

    #[test]
    fn cooldown_expires_exactly_at_duration() {
        let mut cooldown = GrappleCooldown::default();
        assert!(cooldown.is_ready());

        cooldown.start(1_000);
        assert!(!cooldown.is_ready());
        assert!(!cooldown.expire(2_999, 2_000));
        assert_eq!(cooldown.remaining_us(2_999, 2_000), 1);
        assert!(cooldown.expire(3_000, 2_000));
        assert!(cooldown.is_ready());
        // Already cleared.
        assert!(!cooldown.expire(9_000, 2_000));
        assert_eq!(cooldown.remaining_us(9_000, 2_000), 0);
    }
}
