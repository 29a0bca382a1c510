//! Leaderboard lists
//!
//! A global list and a personal list of score entries, stored as JSON arrays.
//! Missing or unreadable lists are replaced by fixed sample data and written
//! back. Entries are kept in stored order; display code decides how to sort.

use serde::{Deserialize, Serialize};

use crate::GameId;
use crate::error::ArcadeResult;
use crate::platform::KeyValueStore;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub id: String,
    pub player_name: String,
    /// Game display name, e.g. "Pac-Man"
    pub game: String,
    pub score: u64,
    /// ISO date, e.g. "2024-01-15"
    pub date: String,
}

impl ScoreEntry {
    fn sample(id: &str, player: &str, game: GameId, score: u64, date: &str) -> Self {
        Self {
            id: id.to_string(),
            player_name: player.to_string(),
            game: game.display_name().to_string(),
            score,
            date: date.to_string(),
        }
    }
}

/// Global and personal leaderboards plus the player's display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub global: Vec<ScoreEntry>,
    pub personal: Vec<ScoreEntry>,
    pub player_name: String,
}

impl Leaderboard {
    pub const GLOBAL_KEY: &'static str = "globalLeaderboard";
    pub const PERSONAL_KEY: &'static str = "personalBest";
    pub const PLAYER_NAME_KEY: &'static str = "playerName";
    pub const DEFAULT_PLAYER_NAME: &'static str = "Player";

    /// Sample global list used when nothing is stored
    pub fn sample_global() -> Vec<ScoreEntry> {
        vec![
            ScoreEntry::sample("1", "ARCADE_KING", GameId::Tetris, 125_000, "2024-01-15"),
            ScoreEntry::sample("2", "PIXEL_MASTER", GameId::Snake, 98_500, "2024-01-14"),
            ScoreEntry::sample("3", "RETRO_GAMER", GameId::PacMan, 87_200, "2024-01-13"),
            ScoreEntry::sample("4", "SPACE_ACE", GameId::SpaceInvaders, 76_800, "2024-01-12"),
            ScoreEntry::sample("5", "ASTEROID_PRO", GameId::Asteroids, 65_400, "2024-01-11"),
            ScoreEntry::sample("6", "PONG_LEGEND", GameId::Pong, 21, "2024-01-10"),
        ]
    }

    /// Sample personal list used when nothing is stored
    pub fn sample_personal() -> Vec<ScoreEntry> {
        vec![
            ScoreEntry::sample("p1", "You", GameId::Tetris, 45_000, "2024-01-15"),
            ScoreEntry::sample("p2", "You", GameId::Snake, 32_100, "2024-01-14"),
            ScoreEntry::sample("p3", "You", GameId::PacMan, 28_500, "2024-01-13"),
        ]
    }

    /// Load both lists, seeding (and persisting) sample data where absent
    pub fn load<S: KeyValueStore + ?Sized>(store: &mut S) -> Self {
        let global = Self::load_list(store, Self::GLOBAL_KEY, Self::sample_global);
        let personal = Self::load_list(store, Self::PERSONAL_KEY, Self::sample_personal);
        let player_name = store
            .get(Self::PLAYER_NAME_KEY)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_PLAYER_NAME.to_string());

        log::info!(
            "Leaderboard loaded ({} global, {} personal entries)",
            global.len(),
            personal.len()
        );

        Self {
            global,
            personal,
            player_name,
        }
    }

    fn load_list<S: KeyValueStore + ?Sized>(
        store: &mut S,
        key: &str,
        seed: fn() -> Vec<ScoreEntry>,
    ) -> Vec<ScoreEntry> {
        if let Some(json) = store.get(key) {
            match serde_json::from_str::<Vec<ScoreEntry>>(&json) {
                Ok(entries) => return entries,
                Err(e) => log::warn!("Discarding unreadable {}: {}", key, e),
            }
        }

        let entries = seed();
        if let Err(e) = Self::write_list(store, key, &entries) {
            log::warn!("Could not seed {}: {}", key, e);
        }
        entries
    }

    fn write_list<S: KeyValueStore + ?Sized>(
        store: &mut S,
        key: &str,
        entries: &[ScoreEntry],
    ) -> ArcadeResult<()> {
        let json = serde_json::to_string(entries)?;
        store.set(key, &json)
    }

    /// Change and persist the player's display name
    pub fn set_player_name<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        name: &str,
    ) -> ArcadeResult<()> {
        let name = name.trim();
        self.player_name = if name.is_empty() {
            Self::DEFAULT_PLAYER_NAME.to_string()
        } else {
            name.to_string()
        };
        store.set(Self::PLAYER_NAME_KEY, &self.player_name)
    }

    /// Global entries for one game, in stored order
    pub fn global_for(&self, game: GameId) -> impl Iterator<Item = &ScoreEntry> {
        self.global
            .iter()
            .filter(move |e| e.game == game.display_name())
    }

    /// Best personal score for one game
    pub fn personal_best(&self, game: GameId) -> Option<u64> {
        self.personal
            .iter()
            .filter(|e| e.game == game.display_name())
            .map(|e| e.score)
            .max()
    }

    /// Serialize for a display layer
    pub fn to_json(&self) -> ArcadeResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_seeds_when_absent() {
        let mut store = MemoryStore::new();
        let board = Leaderboard::load(&mut store);

        assert_eq!(board.global, Leaderboard::sample_global());
        assert_eq!(board.personal, Leaderboard::sample_personal());
        assert_eq!(board.player_name, "Player");

        // Seed data was written back
        let stored = store.get(Leaderboard::GLOBAL_KEY).unwrap();
        let parsed: Vec<ScoreEntry> = serde_json::from_str(&stored).unwrap();
        assert_eq!(parsed.len(), 6);
    }

    #[test]
    fn test_reads_stored_lists_in_order() {
        let json = r#"[
            {"id":"a","playerName":"ZED","game":"Snake","score":10,"date":"2024-02-01"},
            {"id":"b","playerName":"AMY","game":"Snake","score":900,"date":"2024-02-02"}
        ]"#;
        let mut store = MemoryStore::new()
            .with_value(Leaderboard::GLOBAL_KEY, json)
            .with_value(Leaderboard::PLAYER_NAME_KEY, "AMY");
        let board = Leaderboard::load(&mut store);

        let ids: Vec<_> = board.global.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(board.global[1].player_name, "AMY");
        assert_eq!(board.player_name, "AMY");
    }

    #[test]
    fn test_malformed_list_falls_back_to_sample() {
        let mut store = MemoryStore::new().with_value(Leaderboard::PERSONAL_KEY, "{not json");
        let board = Leaderboard::load(&mut store);
        assert_eq!(board.personal, Leaderboard::sample_personal());
    }

    #[test]
    fn test_queries() {
        let mut store = MemoryStore::new();
        let board = Leaderboard::load(&mut store);
        assert_eq!(board.personal_best(GameId::Snake), Some(32_100));
        assert_eq!(board.personal_best(GameId::Pong), None);
        assert_eq!(board.global_for(GameId::PacMan).count(), 1);
    }

    #[test]
    fn test_set_player_name() {
        let mut store = MemoryStore::new();
        let mut board = Leaderboard::load(&mut store);
        board.set_player_name(&mut store, "  NEO ").unwrap();
        assert_eq!(board.player_name, "NEO");
        assert_eq!(store.get("playerName").as_deref(), Some("NEO"));

        board.set_player_name(&mut store, "   ").unwrap();
        assert_eq!(board.player_name, "Player");
    }
}
