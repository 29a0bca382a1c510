//! Input latch
//!
//! Raw key events (keyboard or touch buttons) are folded into a set of
//! currently held keys plus a queue of press edges. Games read held keys for
//! continuous actions (thrust, paddle movement) and press edges for discrete
//! ones (fire, rotate, turn), so holding a key never repeats a discrete action
//! every tick.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Logical key identifiers shared by keyboard and touch controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    W,
    A,
    S,
    D,
    I,
    K,
    Space,
    Enter,
    P,
    Escape,
}

impl Key {
    /// Normalize a DOM `KeyboardEvent.key` value. Unknown keys yield `None`.
    pub fn from_dom_key(key: &str) -> Option<Key> {
        let key = match key {
            " " | "Spacebar" => return Some(Key::Space),
            other => other.to_ascii_lowercase(),
        };
        match key.as_str() {
            "arrowup" | "up" => Some(Key::ArrowUp),
            "arrowdown" | "down" => Some(Key::ArrowDown),
            "arrowleft" | "left" => Some(Key::ArrowLeft),
            "arrowright" | "right" => Some(Key::ArrowRight),
            "w" => Some(Key::W),
            "a" => Some(Key::A),
            "s" => Some(Key::S),
            "d" => Some(Key::D),
            "i" => Some(Key::I),
            "k" => Some(Key::K),
            "space" => Some(Key::Space),
            "enter" => Some(Key::Enter),
            "p" => Some(Key::P),
            "escape" | "esc" => Some(Key::Escape),
            _ => None,
        }
    }

    /// Keys that toggle pause in every game
    pub fn is_pause(&self) -> bool {
        matches!(self, Key::P | Key::Escape)
    }
}

/// Held keys plus unconsumed press edges
#[derive(Debug, Clone, Default)]
pub struct InputLatch {
    active: HashSet<Key>,
    presses: Vec<Key>,
}

impl InputLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key-down. Repeats while held are idempotent.
    pub fn key_down(&mut self, key: Key) {
        if self.active.insert(key) {
            self.presses.push(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.active.remove(&key);
    }

    pub fn is_active(&self, key: Key) -> bool {
        self.active.contains(&key)
    }

    /// True if any of the keys is held
    pub fn any_active(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.active.contains(k))
    }

    /// Press edges since the last `clear_presses`, oldest first
    pub fn presses(&self) -> &[Key] {
        &self.presses
    }

    pub fn was_pressed(&self, key: Key) -> bool {
        self.presses.contains(&key)
    }

    /// Drop consumed press edges (called after each tick)
    pub fn clear_presses(&mut self) {
        self.presses.clear();
    }

    /// Forget everything (session start, teardown)
    pub fn clear(&mut self) {
        self.active.clear();
        self.presses.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_key_normalization() {
        assert_eq!(Key::from_dom_key("ArrowUp"), Some(Key::ArrowUp));
        assert_eq!(Key::from_dom_key("W"), Some(Key::W));
        assert_eq!(Key::from_dom_key("w"), Some(Key::W));
        assert_eq!(Key::from_dom_key(" "), Some(Key::Space));
        assert_eq!(Key::from_dom_key("Spacebar"), Some(Key::Space));
        assert_eq!(Key::from_dom_key("Enter"), Some(Key::Enter));
        assert_eq!(Key::from_dom_key("F5"), None);
    }

    #[test]
    fn test_key_down_is_idempotent() {
        let mut latch = InputLatch::new();
        latch.key_down(Key::Space);
        latch.key_down(Key::Space);
        latch.key_down(Key::Space);
        assert!(latch.is_active(Key::Space));
        assert_eq!(latch.presses(), &[Key::Space]);
    }

    #[test]
    fn test_key_up_removes_and_allows_new_edge() {
        let mut latch = InputLatch::new();
        latch.key_down(Key::A);
        latch.clear_presses();
        latch.key_up(Key::A);
        assert!(!latch.is_active(Key::A));

        latch.key_down(Key::A);
        assert!(latch.was_pressed(Key::A));
    }

    #[test]
    fn test_unknown_key_is_absent() {
        let latch = InputLatch::new();
        assert!(!latch.is_active(Key::K));
        assert!(!latch.any_active(&[Key::I, Key::K]));
    }

    #[test]
    fn test_held_key_survives_clear_presses() {
        let mut latch = InputLatch::new();
        latch.key_down(Key::ArrowLeft);
        latch.clear_presses();
        assert!(latch.is_active(Key::ArrowLeft));
        assert!(!latch.was_pressed(Key::ArrowLeft));
    }
}
