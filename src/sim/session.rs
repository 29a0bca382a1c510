//! Session state shared by every game
//!
//! Score, lives, level and the session phase. Entity state lives in each
//! game's own struct; this is the part the driver and the overlay care about.

use serde::{Deserialize, Serialize};

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Nothing started yet (or reset)
    #[default]
    Idle,
    /// Ticks advance the simulation
    Running,
    /// Frozen, resumable
    Paused,
    /// Game over (or match won); restart required
    Ended,
}

/// Score, lives, level and phase of one play-through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    phase: SessionPhase,
    score: u64,
    lives: u32,
    level: u32,
    starting_lives: u32,
    /// Ticks simulated this session
    time_ticks: u64,
}

impl Session {
    pub fn new(starting_lives: u32) -> Self {
        Self {
            phase: SessionPhase::Idle,
            score: 0,
            lives: starting_lives,
            level: 1,
            starting_lives,
            time_ticks: 0,
        }
    }

    /// Begin a fresh play-through
    pub fn start(&mut self) {
        *self = Self::new(self.starting_lives);
        self.phase = SessionPhase::Running;
    }

    /// Back to idle with fresh counters
    pub fn reset(&mut self) {
        *self = Self::new(self.starting_lives);
    }

    /// Running <-> Paused. Other phases are left alone.
    pub fn toggle_pause(&mut self) -> SessionPhase {
        self.phase = match self.phase {
            SessionPhase::Running => SessionPhase::Paused,
            SessionPhase::Paused => SessionPhase::Running,
            other => other,
        };
        self.phase
    }

    pub fn end(&mut self) {
        self.phase = SessionPhase::Ended;
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Lose a life; ends the session when none remain. Returns true if the
    /// session ended.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.end();
            true
        } else {
            false
        }
    }

    /// Raise the level (never lowers it)
    pub fn raise_level_to(&mut self, level: u32) {
        self.level = self.level.max(level);
    }

    pub fn next_level(&mut self) -> u32 {
        self.level += 1;
        self.level
    }

    pub fn count_tick(&mut self) {
        self.time_ticks += 1;
    }
}

/// Monotonic entity ID allocator; IDs are never reused within a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityIds {
    next_id: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next_id: 1 }
    }
}

impl EntityIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new entity ID
    pub fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut session = Session::new(3);
        assert_eq!(session.phase(), SessionPhase::Idle);

        session.start();
        assert!(session.is_running());
        assert_eq!(session.toggle_pause(), SessionPhase::Paused);
        assert_eq!(session.toggle_pause(), SessionPhase::Running);

        session.end();
        // Pause does nothing once ended
        assert_eq!(session.toggle_pause(), SessionPhase::Ended);

        session.reset();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.toggle_pause(), SessionPhase::Idle);
    }

    #[test]
    fn test_lives_end_session() {
        let mut session = Session::new(2);
        session.start();
        assert!(!session.lose_life());
        assert!(session.is_running());
        assert!(session.lose_life());
        assert_eq!(session.phase(), SessionPhase::Ended);
        assert_eq!(session.lives(), 0);

        // Saturates
        session.lose_life();
        assert_eq!(session.lives(), 0);
    }

    #[test]
    fn test_start_clears_counters() {
        let mut session = Session::new(3);
        session.start();
        session.add_score(500);
        session.next_level();
        session.lose_life();
        session.count_tick();

        session.start();
        assert_eq!(session.score(), 0);
        assert_eq!(session.level(), 1);
        assert_eq!(session.lives(), 3);
        assert_eq!(session.time_ticks(), 0);
    }

    #[test]
    fn test_level_never_lowers() {
        let mut session = Session::new(1);
        session.raise_level_to(4);
        session.raise_level_to(2);
        assert_eq!(session.level(), 4);
    }

    #[test]
    fn test_entity_ids_monotonic() {
        let mut ids = EntityIds::new();
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.next_id();
        assert!(a < b && b < c);
    }
}
