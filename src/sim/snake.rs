//! Snake
//!
//! 20x20 grid with solid walls. The head advances one cell per tick; eating
//! food grows the body and every few foods the tick period shortens.

use std::collections::VecDeque;

use glam::IVec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::frame::{Frame, Sprite, SpriteKind};
use super::grid::Direction;
use super::session::Session;
use super::ArcadeGame;
use crate::platform::{InputLatch, Key};
use crate::tuning::SnakeTuning;
use crate::GameId;

pub const GRID_SIZE: i32 = 20;
pub const START_HEAD: IVec2 = IVec2::new(10, 10);
pub const START_FOOD: IVec2 = IVec2::new(15, 15);

pub struct SnakeGame {
    session: Session,
    tuning: SnakeTuning,
    rng: Pcg32,
    /// Head first
    body: VecDeque<IVec2>,
    heading: Direction,
    /// Latest valid turn since the last tick
    requested: Option<Direction>,
    food: IVec2,
    period_ms: u32,
}

impl SnakeGame {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, SnakeTuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: SnakeTuning) -> Self {
        let period_ms = tuning.initial_period_ms;
        Self {
            session: Session::new(1),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            body: VecDeque::from([START_HEAD]),
            heading: Direction::Right,
            requested: None,
            food: START_FOOD,
            period_ms,
        }
    }

    pub fn body(&self) -> &VecDeque<IVec2> {
        &self.body
    }

    pub fn head(&self) -> IVec2 {
        self.body.front().copied().unwrap_or(START_HEAD)
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn food(&self) -> IVec2 {
        self.food
    }

    /// Buffer a turn for the next tick. A reversal is ignored while the
    /// snake is longer than one cell; the last accepted request wins.
    pub fn request_direction(&mut self, dir: Direction) {
        if !self.is_reversal(dir) {
            self.requested = Some(dir);
        }
    }

    fn is_reversal(&self, dir: Direction) -> bool {
        self.body.len() > 1 && dir == self.heading.opposite()
    }

    pub fn tick(&mut self) {
        if !self.session.is_running() {
            return;
        }
        self.session.count_tick();

        if let Some(dir) = self.requested.take() {
            if !self.is_reversal(dir) {
                self.heading = dir;
            }
        }

        let next = self.head() + self.heading.delta();
        let out_of_bounds = next.x < 0 || next.x >= GRID_SIZE || next.y < 0 || next.y >= GRID_SIZE;
        if out_of_bounds || self.body.contains(&next) {
            log::info!("Snake crashed at length {}", self.body.len());
            self.session.end();
            return;
        }

        self.body.push_front(next);
        if next == self.food {
            self.eat();
        } else {
            self.body.pop_back();
        }
    }

    fn eat(&mut self) {
        self.session.add_score(self.tuning.food_points);

        let every = self.tuning.points_per_speedup.max(1);
        if self.session.score() % every == 0 {
            let faster = self
                .period_ms
                .saturating_sub(self.tuning.speedup_step_ms)
                .max(self.tuning.min_period_ms);
            if faster < self.period_ms {
                self.period_ms = faster;
                self.session.next_level();
                log::debug!("Snake speeds up to {} ms", self.period_ms);
            }
        }

        match self.free_cell() {
            Some(cell) => self.food = cell,
            None => {
                log::info!("Snake filled the grid");
                self.session.end();
            }
        }
    }

    /// Uniformly random cell not covered by the snake
    fn free_cell(&mut self) -> Option<IVec2> {
        if self.body.len() >= (GRID_SIZE * GRID_SIZE) as usize {
            return None;
        }
        loop {
            let cell = IVec2::new(
                self.rng.random_range(0..GRID_SIZE),
                self.rng.random_range(0..GRID_SIZE),
            );
            if !self.body.contains(&cell) {
                return Some(cell);
            }
        }
    }

    fn restore_start(&mut self) {
        self.body = VecDeque::from([START_HEAD]);
        self.heading = Direction::Right;
        self.requested = None;
        self.food = START_FOOD;
        self.period_ms = self.tuning.initial_period_ms;
    }
}

fn key_direction(key: Key) -> Option<Direction> {
    match key {
        Key::ArrowUp | Key::W => Some(Direction::Up),
        Key::ArrowDown | Key::S => Some(Direction::Down),
        Key::ArrowLeft | Key::A => Some(Direction::Left),
        Key::ArrowRight | Key::D => Some(Direction::Right),
        _ => None,
    }
}

impl ArcadeGame for SnakeGame {
    fn id(&self) -> GameId {
        GameId::Snake
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn start(&mut self) {
        self.session.start();
        self.restore_start();
        if let Some(cell) = self.free_cell() {
            self.food = cell;
        }
    }

    fn reset(&mut self) {
        self.session.reset();
        self.restore_start();
    }

    fn step(&mut self, input: &InputLatch) {
        for dir in input.presses().iter().filter_map(|k| key_direction(*k)) {
            self.request_direction(dir);
        }
        self.tick();
    }

    fn tick_period_ms(&self) -> u32 {
        self.period_ms
    }

    fn frame(&self) -> Frame {
        let mut frame = Frame::new(
            GameId::Snake,
            GRID_SIZE as f32,
            GRID_SIZE as f32,
            &self.session,
        );
        frame.push(Sprite::cell(SpriteKind::Food, self.food.x, self.food.y));
        for (i, segment) in self.body.iter().enumerate() {
            let kind = if i == 0 {
                SpriteKind::SnakeHead {
                    heading: self.heading,
                }
            } else {
                SpriteKind::SnakeBody
            };
            frame.push(Sprite::cell(kind, segment.x, segment.y));
        }
        frame
    }
}
