//! Tick driver
//!
//! Ties one game core to the host: routes key events through the input
//! latch, runs due ticks from the scheduler, and persists new high scores.
//! Hosts call `advance` from their animation frame (or a timer) with the
//! current time; the runner works out how many ticks are due.

use crate::consts::MAX_CATCHUP_TICKS;
use crate::highscores::HighScore;
use crate::platform::{InputLatch, Key, KeyValueStore, TickScheduler};
use crate::sim::{ArcadeGame, Frame, Session, SessionPhase};

pub struct GameRunner<S: KeyValueStore> {
    game: Box<dyn ArcadeGame>,
    store: S,
    latch: InputLatch,
    scheduler: TickScheduler,
    high_score: HighScore,
}

impl<S: KeyValueStore> GameRunner<S> {
    /// Mount a game, reading its persisted high score
    pub fn new(game: Box<dyn ArcadeGame>, store: S) -> Self {
        let high_score = HighScore::load(&store, game.id());
        Self {
            game,
            store,
            latch: InputLatch::new(),
            scheduler: TickScheduler::new(),
            high_score,
        }
    }

    pub fn game(&self) -> &dyn ArcadeGame {
        &*self.game
    }

    pub fn session(&self) -> &Session {
        self.game.session()
    }

    pub fn phase(&self) -> SessionPhase {
        self.game.session().phase()
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.score
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    /// Key pressed (repeats while held are harmless)
    pub fn key_down(&mut self, key: Key, now_ms: f64) {
        if key.is_pause() {
            self.toggle_pause(now_ms);
            return;
        }

        match self.phase() {
            SessionPhase::Idle | SessionPhase::Ended
                if matches!(key, Key::Enter | Key::Space) =>
            {
                self.start(now_ms);
            }
            SessionPhase::Running => {
                let fresh = !self.latch.is_active(key);
                self.latch.key_down(key);
                if fresh {
                    self.game.handle_press(key);
                    self.record_score();
                    self.stop_if_ended();
                }
            }
            // Track held keys only; presses outside a run are not replayed
            _ => {
                self.latch.key_down(key);
                self.latch.clear_presses();
            }
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.latch.key_up(key);
    }

    /// Begin (or restart) a session and schedule its first tick
    pub fn start(&mut self, now_ms: f64) {
        self.game.start();
        self.latch.clear();
        self.scheduler
            .schedule(now_ms, self.game.tick_period_ms());
        log::info!("{} started", self.game.id());
    }

    /// Running <-> Paused. Pausing cancels the pending tick; resuming
    /// schedules a fresh one. Ignored in other phases.
    pub fn toggle_pause(&mut self, now_ms: f64) -> SessionPhase {
        match self.phase() {
            SessionPhase::Running => {
                self.game.session_mut().toggle_pause();
                self.scheduler.cancel();
                log::debug!("{} paused", self.game.id());
            }
            SessionPhase::Paused => {
                self.game.session_mut().toggle_pause();
                self.latch.clear_presses();
                self.scheduler
                    .schedule(now_ms, self.game.tick_period_ms());
                log::debug!("{} resumed", self.game.id());
            }
            SessionPhase::Idle | SessionPhase::Ended => {}
        }
        self.phase()
    }

    /// Pause only if running (window blur, hidden tab)
    pub fn suspend(&mut self) {
        if self.phase() == SessionPhase::Running {
            self.toggle_pause(0.0);
            log::info!("{} auto-paused", self.game.id());
        }
    }

    /// Abandon the session and return to idle
    pub fn reset(&mut self) {
        self.scheduler.cancel();
        self.latch.clear();
        self.game.reset();
    }

    /// Run every tick due at `now_ms` (bounded). Returns ticks run.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let mut ran = 0;
        while ran < MAX_CATCHUP_TICKS {
            let Some(tick) = self.scheduler.take_due(now_ms) else {
                break;
            };
            self.game.step(&self.latch);
            self.latch.clear_presses();
            self.record_score();
            ran += 1;

            if self.stop_if_ended() {
                break;
            }
            // Period is re-read after every tick so speed changes apply next
            self.scheduler
                .schedule_at(tick.due_ms + f64::from(self.game.tick_period_ms()));
        }

        // Too far behind: drop the backlog instead of spiralling
        if let Some(pending) = self.scheduler.pending() {
            if pending.due_ms <= now_ms {
                log::debug!("{} dropped tick backlog", self.game.id());
                self.scheduler
                    .schedule(now_ms, self.game.tick_period_ms());
            }
        }
        ran
    }

    /// Stop scheduling for good (host unmount). The game state is kept.
    pub fn teardown(&mut self) {
        self.scheduler.cancel();
        self.latch.clear();
        log::debug!("{} torn down", self.game.id());
    }

    /// Current render projection with the high score filled in
    pub fn frame(&self) -> Frame {
        let mut frame = self.game.frame();
        frame.overlay.high_score = self.high_score.score.max(self.game.session().score());
        frame
    }

    /// Cancel the pending tick once the session has ended. Returns true if
    /// it has.
    fn stop_if_ended(&mut self) -> bool {
        if self.game.session().is_running() {
            return false;
        }
        self.scheduler.cancel();
        log::info!(
            "{} ended with score {}",
            self.game.id(),
            self.game.session().score()
        );
        true
    }

    fn record_score(&mut self) {
        let score = self.game.session().score();
        if !self.high_score.beaten_by(score) {
            return;
        }
        if let Err(e) = self.high_score.submit(&mut self.store, score) {
            log::warn!("Failed to save {} high score: {}", self.game.id(), e);
        }
    }
}
