//! Per-game high score record
//!
//! Stored as plain integer text under a per-game key. Read once at mount,
//! rewritten whenever the running score beats it.

use serde::{Deserialize, Serialize};

use crate::GameId;
use crate::error::ArcadeResult;
use crate::platform::KeyValueStore;

/// The best score recorded for one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    pub game: GameId,
    pub score: u64,
}

impl HighScore {
    /// Empty record
    pub fn new(game: GameId) -> Self {
        Self { game, score: 0 }
    }

    /// Load from the store. Missing or malformed values count as zero.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, game: GameId) -> Self {
        let Some(key) = game.high_score_key() else {
            return Self::new(game);
        };

        let score = match store.get(key) {
            Some(text) => match text.trim().parse::<u64>() {
                Ok(score) => {
                    log::info!("Loaded {} high score: {}", game, score);
                    score
                }
                Err(_) => {
                    log::warn!("Ignoring malformed high score for {}: {:?}", game, text);
                    0
                }
            },
            None => 0,
        };

        Self { game, score }
    }

    /// Check if a score beats the record
    pub fn beaten_by(&self, score: u64) -> bool {
        score > self.score
    }

    /// Record a score if it beats the stored one. Returns true when the record
    /// changed.
    pub fn submit<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        score: u64,
    ) -> ArcadeResult<bool> {
        if !self.beaten_by(score) {
            return Ok(false);
        }
        self.score = score;
        if let Some(key) = self.game.high_score_key() {
            store.set(key, &score.to_string())?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_load_missing_is_zero() {
        let store = MemoryStore::new();
        assert_eq!(HighScore::load(&store, GameId::Snake).score, 0);
    }

    #[test]
    fn test_load_malformed_is_zero() {
        let store = MemoryStore::new().with_value("snake-high-score", "lots");
        assert_eq!(HighScore::load(&store, GameId::Snake).score, 0);
    }

    #[test]
    fn test_load_existing() {
        let store = MemoryStore::new().with_value("asteroids-high-score", " 1540 ");
        assert_eq!(HighScore::load(&store, GameId::Asteroids).score, 1540);
    }

    #[test]
    fn test_submit_only_on_improvement() {
        let mut store = MemoryStore::new().with_value("pacman-high-score", "300");
        let mut record = HighScore::load(&store, GameId::PacMan);

        assert!(!record.submit(&mut store, 300).unwrap());
        assert!(!record.submit(&mut store, 120).unwrap());
        assert_eq!(store.get("pacman-high-score").as_deref(), Some("300"));

        assert!(record.submit(&mut store, 310).unwrap());
        assert_eq!(record.score, 310);
        assert_eq!(store.get("pacman-high-score").as_deref(), Some("310"));
    }

    #[test]
    fn test_pong_keeps_no_record() {
        let mut store = MemoryStore::new();
        let mut record = HighScore::load(&store, GameId::Pong);
        assert!(record.submit(&mut store, 5).unwrap());
        assert_eq!(store.get("pong-high-score"), None);
    }
}
