//! Data-driven game balance
//!
//! Every knob has a default matching the classic behaviour of each game, and
//! every section is `#[serde(default)]` so a JSON document only needs the
//! fields it overrides.

use serde::{Deserialize, Serialize};

use crate::error::ArcadeResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Tuning {
    pub tetris: TetrisTuning,
    pub snake: SnakeTuning,
    pub pacman: PacmanTuning,
    pub asteroids: AsteroidsTuning,
    pub invaders: InvadersTuning,
    pub pong: PongTuning,
}

impl Tuning {
    /// Parse a (possibly partial) tuning document
    pub fn from_json(json: &str) -> ArcadeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> ArcadeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TetrisTuning {
    /// Drop interval at level 1
    pub base_drop_ms: u32,
    /// Interval reduction per level
    pub drop_step_ms: u32,
    /// Fastest drop interval
    pub min_drop_ms: u32,
    pub lines_per_level: u32,
    pub points_per_line: u64,
    pub lock_points: u64,
    pub hard_drop_points_per_row: u64,
}

impl Default for TetrisTuning {
    fn default() -> Self {
        Self {
            base_drop_ms: 1000,
            drop_step_ms: 100,
            min_drop_ms: 100,
            lines_per_level: 10,
            points_per_line: 100,
            lock_points: 10,
            hard_drop_points_per_row: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeTuning {
    pub initial_period_ms: u32,
    pub min_period_ms: u32,
    /// Period reduction on each speed-up
    pub speedup_step_ms: u32,
    /// Score interval between speed-ups
    pub points_per_speedup: u64,
    pub food_points: u64,
}

impl Default for SnakeTuning {
    fn default() -> Self {
        Self {
            initial_period_ms: 200,
            min_period_ms: 100,
            speedup_step_ms: 20,
            points_per_speedup: 50,
            food_points: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacmanTuning {
    pub period_ms: u32,
    pub lives: u32,
    /// Power mode length in ticks (10 s at 200 ms)
    pub power_mode_ticks: u32,
    pub dot_points: u64,
    pub power_points: u64,
    pub ghost_points: u64,
    /// Probability a ghost steps toward Pac-Man instead of a random way
    pub chase_bias: f32,
}

impl Default for PacmanTuning {
    fn default() -> Self {
        Self {
            period_ms: 200,
            lives: 3,
            power_mode_ticks: 50,
            dot_points: 10,
            power_points: 50,
            ghost_points: 200,
            chase_bias: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidsTuning {
    pub period_ms: u32,
    pub lives: u32,
    /// Asteroids in wave 1 minus one; wave `n` spawns `base + n`
    pub base_asteroids: u32,
    pub wave_delay_ms: u32,
    pub invulnerable_ms: u32,
}

impl Default for AsteroidsTuning {
    fn default() -> Self {
        Self {
            period_ms: 16,
            lives: 3,
            base_asteroids: 4,
            wave_delay_ms: 1000,
            invulnerable_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvadersTuning {
    pub period_ms: u32,
    pub lives: u32,
    /// Per-tick chance that some invader fires
    pub fire_chance: f64,
    pub initial_speed: f32,
    /// Step speed gained per cleared wave
    pub speed_step: f32,
    pub wave_delay_ms: u32,
}

impl Default for InvadersTuning {
    fn default() -> Self {
        Self {
            period_ms: 16,
            lives: 3,
            fire_chance: 0.02,
            initial_speed: 1.0,
            speed_step: 0.5,
            wave_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongTuning {
    pub period_ms: u32,
    pub winning_score: u32,
    /// AI paddle speed relative to the player's
    pub ai_speed_factor: f32,
    /// Speed multiplier per paddle bounce
    pub bounce_speedup: f32,
}

impl Default for PongTuning {
    fn default() -> Self {
        Self {
            period_ms: 16,
            winning_score: 11,
            ai_speed_factor: 0.8,
            bounce_speedup: 1.05,
        }
    }
}

/// Convert a millisecond delay to whole ticks (at least one)
pub fn ms_to_ticks(ms: u32, period_ms: u32) -> u32 {
    (ms / period_ms.max(1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document() {
        let tuning = Tuning::from_json(r#"{"pong": {"winning_score": 5}}"#).unwrap();
        assert_eq!(tuning.pong.winning_score, 5);
        assert_eq!(tuning.pong.period_ms, 16);
        assert_eq!(tuning.snake, SnakeTuning::default());
    }

    #[test]
    fn test_malformed_document_is_error() {
        assert!(Tuning::from_json("{\"snake\": 3").is_err());
    }

    #[test]
    fn test_roundtrip_defaults() {
        let json = Tuning::default().to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), Tuning::default());
    }

    #[test]
    fn test_ms_to_ticks() {
        assert_eq!(ms_to_ticks(1000, 16), 62);
        assert_eq!(ms_to_ticks(2000, 16), 125);
        assert_eq!(ms_to_ticks(5, 16), 1);
    }
}
