use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;

pub const MAX_HEALTH: u8 = 100;

/// Yaw the avatar turns to when walking along each axis.
pub mod facing {
    use super::*;

    pub const LEFT: f32 = FRAC_PI_2;
    pub const RIGHT: f32 = -FRAC_PI_2;
    pub const FORWARD: f32 = 0.0;
    pub const BACKWARD: f32 = PI;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub position: Vec3,
    /// Yaw in radians.
    pub rotation: f32,
    pub is_jumping: bool,
    pub can_grapple: bool,
    // Read-only after construction: nothing in the game deals damage.
    health: u8,
}

impl PlayerState {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: facing::FORWARD,
            is_jumping: false,
            can_grapple: true,
            health: MAX_HEALTH,
        }
    }

    pub fn health(&self) -> u8 {
        self.health
    }
}

/// Vertical jump animation. A jump rises at a fixed rate per tick until the
/// apex height, hangs there for a fixed time, then snaps back to the ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpPhase {
    #[default]
    Idle,
    Rising,
    Hanging {
        since_us: u64,
    },
}

impl JumpPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Rising => "rising",
            Self::Hanging { .. } => "hanging",
        }
    }
}
