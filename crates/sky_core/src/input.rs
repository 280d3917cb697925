//! Keyboard state tracking with both level-triggered and edge-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` returns true every frame the key
//!   is physically down. All gameplay keys (movement, jump, grapple) read this,
//!   so a held key keeps acting until it is released. No repeat suppression.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only during the
//!   frame the transition happened. Cleared by `end_frame()`, which the main
//!   loop calls only after at least one fixed simulation step has consumed
//!   them. Used for the utility keys (quit, debug panel).
//!
//! The state is owned by the application and handed to the simulation by
//! reference each step; there is no global key table.

use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Key {
    #[serde(rename = "ArrowLeft")]
    Left,
    #[serde(rename = "ArrowRight")]
    Right,
    #[serde(rename = "ArrowUp")]
    Up,
    #[serde(rename = "ArrowDown")]
    Down,
    #[serde(rename = " ")]
    Space,
    #[serde(rename = "g")]
    G,
    Escape,
    F3,
}

impl Key {
    pub const ALL: &'static [Key] = &[
        Key::Left,
        Key::Right,
        Key::Up,
        Key::Down,
        Key::Space,
        Key::G,
        Key::Escape,
        Key::F3,
    ];

    /// Browser-style key identifier (`KeyboardEvent.key`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "ArrowLeft",
            Self::Right => "ArrowRight",
            Self::Up => "ArrowUp",
            Self::Down => "ArrowDown",
            Self::Space => " ",
            Self::G => "g",
            Self::Escape => "Escape",
            Self::F3 => "F3",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.name() == name)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Space => f.write_str("Space"),
            other => f.write_str(other.name()),
        }
    }
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    /// Replace the held set wholesale. Scripted input (replays) uses this to
    /// reproduce one recorded frame, with edges derived from the difference.
    pub fn set_held(&mut self, keys: &[Key]) {
        let next: HashSet<Key> = keys.iter().copied().collect();
        for key in self.held.difference(&next) {
            self.just_released.insert(*key);
        }
        for key in next.difference(&self.held) {
            self.just_pressed.insert(*key);
        }
        self.held = next;
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
