//! Retro Arcade - simulation cores for six classic arcade games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, rules, per-game tick functions)
//! - `runner`: Tick driver tying a game to input, scheduler and high scores
//! - `platform`: Input latch, tick scheduler, key-value storage
//! - `highscores` / `leaderboard`: Persisted scores
//! - `tuning` / `settings`: Data-driven balance and user preferences

pub mod error;
pub mod highscores;
pub mod leaderboard;
pub mod platform;
pub mod runner;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{ArcadeError, ArcadeResult};
pub use highscores::HighScore;
pub use leaderboard::{Leaderboard, ScoreEntry};
pub use runner::GameRunner;
pub use settings::{PongMode, Settings};
pub use tuning::Tuning;

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Driver configuration constants
pub mod consts {
    /// Maximum ticks run per `advance` call to prevent spiral of death
    pub const MAX_CATCHUP_TICKS: u32 = 8;
}

/// The six games of the arcade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameId {
    Tetris,
    Snake,
    PacMan,
    Asteroids,
    SpaceInvaders,
    Pong,
}

impl GameId {
    pub const ALL: [GameId; 6] = [
        GameId::Tetris,
        GameId::Snake,
        GameId::PacMan,
        GameId::Asteroids,
        GameId::SpaceInvaders,
        GameId::Pong,
    ];

    /// URL-style identifier
    pub fn slug(&self) -> &'static str {
        match self {
            GameId::Tetris => "tetris",
            GameId::Snake => "snake",
            GameId::PacMan => "pacman",
            GameId::Asteroids => "asteroids",
            GameId::SpaceInvaders => "space-invaders",
            GameId::Pong => "pong",
        }
    }

    /// Name shown on the leaderboard
    pub fn display_name(&self) -> &'static str {
        match self {
            GameId::Tetris => "Tetris",
            GameId::Snake => "Snake",
            GameId::PacMan => "Pac-Man",
            GameId::Asteroids => "Asteroids",
            GameId::SpaceInvaders => "Space Invaders",
            GameId::Pong => "Pong",
        }
    }

    /// Storage key of the persisted high score (Pong keeps none)
    pub fn high_score_key(&self) -> Option<&'static str> {
        match self {
            GameId::Tetris => Some("tetris-high-score"),
            GameId::Snake => Some("snake-high-score"),
            GameId::PacMan => Some("pacman-high-score"),
            GameId::Asteroids => Some("asteroids-high-score"),
            GameId::SpaceInvaders => Some("space-invaders-high-score"),
            GameId::Pong => None,
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for GameId {
    type Err = ArcadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        GameId::ALL
            .into_iter()
            .find(|g| g.slug() == wanted || g.display_name().to_lowercase() == wanted)
            .ok_or_else(|| ArcadeError::UnknownGame(s.to_string()))
    }
}

/// Wrap a coordinate into [0, extent)
#[inline]
pub fn wrap_scalar(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent { 0.0 } else { wrapped }
}

/// Unit heading for an angle in degrees (0 = +x, screen y grows downward)
#[inline]
pub fn heading_from_degrees(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_id_parse() {
        assert_eq!("snake".parse::<GameId>().unwrap(), GameId::Snake);
        assert_eq!("Pac-Man".parse::<GameId>().unwrap(), GameId::PacMan);
        assert_eq!(
            "space-invaders".parse::<GameId>().unwrap(),
            GameId::SpaceInvaders
        );
        assert!(matches!(
            "frogger".parse::<GameId>(),
            Err(ArcadeError::UnknownGame(_))
        ));
    }

    #[test]
    fn test_wrap_scalar() {
        assert!((wrap_scalar(-1.0, 800.0) - 799.0).abs() < 1e-4);
        assert!((wrap_scalar(801.0, 800.0) - 1.0).abs() < 1e-4);
        assert!((wrap_scalar(400.0, 800.0) - 400.0).abs() < 1e-4);
    }

    #[test]
    fn test_heading_from_degrees() {
        let right = heading_from_degrees(0.0);
        assert!((right.x - 1.0).abs() < 1e-5 && right.y.abs() < 1e-5);
        let down = heading_from_degrees(90.0);
        assert!(down.x.abs() < 1e-5 && (down.y - 1.0).abs() < 1e-5);
    }
}
