//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one call to `step` is one tick)
//! - Seeded RNG only
//! - Stable iteration order (entities keep insertion order and IDs)
//! - No rendering or platform dependencies beyond the input latch

pub mod asteroids;
pub mod collision;
pub mod frame;
pub mod grid;
pub mod invaders;
pub mod pacman;
pub mod pong;
pub mod session;
pub mod snake;
pub mod tetris;

pub use asteroids::AsteroidsGame;
pub use frame::{Frame, Overlay, Sprite, SpriteKind};
pub use grid::{Direction, Grid};
pub use invaders::InvadersGame;
pub use pacman::PacmanGame;
pub use pong::PongGame;
pub use session::{EntityIds, Session, SessionPhase};
pub use snake::SnakeGame;
pub use tetris::TetrisGame;

use crate::platform::{InputLatch, Key};
use crate::settings::Settings;
use crate::tuning::Tuning;
use crate::GameId;

/// One game's simulation core, driven by the runner
pub trait ArcadeGame {
    fn id(&self) -> GameId;

    fn session(&self) -> &Session;

    fn session_mut(&mut self) -> &mut Session;

    /// Begin a fresh session from the game's initial layout
    fn start(&mut self);

    /// Discard the session and return to the idle layout
    fn reset(&mut self);

    /// React to a key press immediately, between ticks. Most games only read
    /// input on the tick and leave this empty.
    fn handle_press(&mut self, _key: Key) {}

    /// Advance one tick using the latched input. Does nothing unless running.
    fn step(&mut self, input: &InputLatch);

    /// Delay until the next tick, in milliseconds
    fn tick_period_ms(&self) -> u32;

    /// Render projection of the current state
    fn frame(&self) -> Frame;
}

/// Build a game core with the given seed and balance
pub fn create_game(
    id: GameId,
    seed: u64,
    tuning: &Tuning,
    settings: &Settings,
) -> Box<dyn ArcadeGame> {
    log::info!("Creating {} (seed {})", id, seed);
    match id {
        GameId::Tetris => Box::new(TetrisGame::with_tuning(seed, tuning.tetris.clone())),
        GameId::Snake => Box::new(SnakeGame::with_tuning(seed, tuning.snake.clone())),
        GameId::PacMan => Box::new(PacmanGame::with_tuning(seed, tuning.pacman.clone())),
        GameId::Asteroids => Box::new(AsteroidsGame::with_tuning(
            seed,
            tuning.asteroids.clone(),
        )),
        GameId::SpaceInvaders => Box::new(InvadersGame::with_tuning(
            seed,
            tuning.invaders.clone(),
        )),
        GameId::Pong => Box::new(PongGame::with_tuning(
            seed,
            settings.pong_mode,
            tuning.pong.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_every_game() {
        for id in GameId::ALL {
            let mut game = create_game(id, 7, &Tuning::default(), &Settings::default());
            assert_eq!(game.id(), id);
            assert_eq!(game.session().phase(), SessionPhase::Idle);

            game.start();
            assert!(game.session().is_running());
            assert!(game.tick_period_ms() > 0);
            assert_eq!(game.frame().game, id);

            game.reset();
            assert_eq!(game.session().phase(), SessionPhase::Idle);
        }
    }

    #[test]
    fn test_paused_step_changes_nothing() {
        for id in GameId::ALL {
            let mut game = create_game(id, 11, &Tuning::default(), &Settings::default());
            game.start();
            game.session_mut().toggle_pause();

            let mut latch = InputLatch::new();
            latch.key_down(Key::ArrowLeft);
            latch.key_down(Key::Space);
            let before = game.frame();
            for _ in 0..10 {
                game.step(&latch);
            }
            assert_eq!(game.frame(), before, "{} moved while paused", id);
        }
    }

    #[test]
    fn test_ended_step_changes_nothing() {
        for id in GameId::ALL {
            let mut game = create_game(id, 13, &Tuning::default(), &Settings::default());
            game.start();
            let mut latch = InputLatch::new();
            for _ in 0..5 {
                game.step(&latch);
            }
            game.session_mut().end();
            assert_eq!(game.session().phase(), SessionPhase::Ended);

            latch.key_down(Key::ArrowRight);
            latch.key_down(Key::Space);
            let before = game.frame();
            for _ in 0..10 {
                game.step(&latch);
            }
            assert_eq!(game.frame(), before, "{} moved after ending", id);
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        for id in GameId::ALL {
            let run = || {
                let mut game = create_game(id, 99, &Tuning::default(), &Settings::default());
                game.start();
                let mut latch = InputLatch::new();
                for i in 0..200u32 {
                    if i % 7 == 0 {
                        latch.key_down(Key::Space);
                    } else {
                        latch.key_up(Key::Space);
                    }
                    game.step(&latch);
                    latch.clear_presses();
                }
                game.frame()
            };
            assert_eq!(run(), run(), "{} is not deterministic", id);
        }
    }
}
