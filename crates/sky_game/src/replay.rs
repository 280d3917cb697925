use serde::Deserialize;
use sky_core::input::{InputState, Key};
use sky_core::time::FIXED_DT_US;
use std::fs;
use std::path::Path;

use crate::world::ControlIntent;

/// Scripted key presses played back one fixed tick per expanded frame.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt_us")]
    pub fixed_dt_us: u64,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    /// Keys held during this frame, by their browser key names.
    #[serde(default)]
    pub held: Vec<Key>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// Feeds every frame through an `InputState` so intents are read the
    /// same way the live loop reads them.
    pub fn expanded_intents(&self) -> Vec<ControlIntent> {
        let mut input = InputState::new();
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                input.set_held(&frame.held);
                out.push(ControlIntent::from_input(&input));
                input.end_frame();
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt_us == 0 {
        return Err("Replay validation failed: fixed_dt_us must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt_us() -> u64 {
    FIXED_DT_US
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{GameWorld, GameplayConfig};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "skyhook_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn load(name_hint: &str, body: &str) -> Result<ReplaySequence, String> {
        let path = temp_file_path(name_hint);
        fs::write(&path, body).expect("write replay file");
        let result = load_replay_from_path(&path);
        let _ = fs::remove_file(path);
        result
    }

    fn run(replay: &ReplaySequence) -> GameWorld {
        let mut world = GameWorld::new(GameplayConfig::default());
        for intent in replay.expanded_intents() {
            world.step(intent, replay.fixed_dt_us);
        }
        world
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let replay = load(
            "parse",
            r#"{
              "frames": [
                { "held": ["ArrowLeft"], "repeat": 3 },
                { "held": ["ArrowLeft", " "] },
                { "held": [] }
              ]
            }"#,
        )
        .expect("replay should load");

        assert_eq!(replay.fixed_dt_us, FIXED_DT_US);
        let intents = replay.expanded_intents();
        assert_eq!(intents.len(), 5);
        assert!(intents[0].left && !intents[0].jump);
        assert!(intents[3].left && intents[3].jump);
        assert_eq!(intents[4], ControlIntent::default());
    }

    #[test]
    fn replay_rejects_empty_frames() {
        let err = load("empty", r#"{ "frames": [] }"#).unwrap_err();
        assert!(err.contains("frames list is empty"), "{err}");
    }

    #[test]
    fn replay_rejects_zero_dt() {
        let err = load("zero_dt", r#"{ "fixed_dt_us": 0, "frames": [{}] }"#).unwrap_err();
        assert!(err.contains("fixed_dt_us"), "{err}");
    }

    #[test]
    fn replay_rejects_unknown_key() {
        let err = load("bad_key", r#"{ "frames": [{ "held": ["q"] }] }"#).unwrap_err();
        assert!(err.contains("Failed to parse replay JSON"), "{err}");
    }

    #[test]
    fn replay_walks_left_then_forward() {
        let replay = load(
            "walk",
            r#"{
              "frames": [
                { "held": ["ArrowLeft"], "repeat": 10 },
                { "held": ["ArrowUp"], "repeat": 5 }
              ]
            }"#,
        )
        .expect("replay should load");

        let world = run(&replay);
        assert!((world.player.position.x + 1.0).abs() < 1e-4);
        assert!((world.player.position.z + 0.5).abs() < 1e-4);
        assert_eq!(world.player.rotation, crate::player::facing::FORWARD);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let replay = load(
            "deterministic",
            r#"{
              "frames": [
                { "held": ["ArrowRight"], "repeat": 30 },
                { "held": ["ArrowRight", " ", "g"], "repeat": 1 },
                { "held": ["ArrowDown"], "repeat": 90 },
                { "held": ["g"], "repeat": 150 }
              ]
            }"#,
        )
        .expect("replay should load");

        let a = run(&replay);
        let b = run(&replay);
        assert_eq!(a.player, b.player);
        assert_eq!(a.hook, b.hook);
        assert_eq!(a.clock_us(), b.clock_us());
        assert_eq!(a.jump_phase(), b.jump_phase());
        assert_eq!(a.hook_phase(), b.hook_phase());
        assert_eq!(a.player.health(), 100);
    }
}
