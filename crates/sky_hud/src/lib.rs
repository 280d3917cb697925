pub mod hud_overlay;

pub use hud_overlay::{DebugStats, HudOverlay, HudSnapshot, CONTROL_LEGEND};
