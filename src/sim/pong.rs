//! Pong
//!
//! 800x400 court, first to the winning score. The left paddle is always a
//! player; the right paddle is a second player or a simple tracking AI.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::reflect_velocity;
use super::frame::{Frame, Sprite, SpriteKind};
use super::session::Session;
use super::ArcadeGame;
use crate::platform::{InputLatch, Key};
use crate::settings::PongMode;
use crate::tuning::PongTuning;
use crate::GameId;

pub const COURT_WIDTH: f32 = 800.0;
pub const COURT_HEIGHT: f32 = 400.0;
pub const PADDLE_WIDTH: f32 = 10.0;
pub const PADDLE_HEIGHT: f32 = 80.0;
pub const PADDLE_SPEED: f32 = 6.0;
pub const BALL_SIZE: f32 = 10.0;
pub const INITIAL_BALL_SPEED: f32 = 4.0;
pub const MAX_BALL_SPEED: f32 = 8.0;
/// The AI ignores offsets smaller than this
pub const AI_DEADZONE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paddle {
    /// Top edge
    pub y: f32,
    pub score: u32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            y: COURT_HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0,
            score: 0,
        }
    }
}

impl Paddle {
    fn nudge(&mut self, dy: f32) {
        self.y = (self.y + dy).clamp(0.0, COURT_HEIGHT - PADDLE_HEIGHT);
    }

    fn center(&self) -> f32 {
        self.y + PADDLE_HEIGHT / 2.0
    }

    /// Vertical overlap with a ball whose top is at `ball_y` (edges count)
    fn spans(&self, ball_y: f32) -> bool {
        ball_y + BALL_SIZE >= self.y && ball_y <= self.y + PADDLE_HEIGHT
    }
}

/// Paddle controls for one tick
#[derive(Debug, Clone, Default)]
pub struct PongInput {
    pub left_up: bool,
    pub left_down: bool,
    pub right_up: bool,
    pub right_down: bool,
}

impl PongInput {
    pub fn from_latch(latch: &InputLatch) -> Self {
        Self {
            left_up: latch.any_active(&[Key::W, Key::ArrowUp]),
            left_down: latch.any_active(&[Key::S, Key::ArrowDown]),
            right_up: latch.is_active(Key::I),
            right_down: latch.is_active(Key::K),
        }
    }
}

pub struct PongGame {
    session: Session,
    tuning: PongTuning,
    rng: Pcg32,
    mode: PongMode,
    ball: Ball,
    left: Paddle,
    right: Paddle,
    winner: Option<Side>,
}

impl PongGame {
    pub fn new(seed: u64, mode: PongMode) -> Self {
        Self::with_tuning(seed, mode, PongTuning::default())
    }

    pub fn with_tuning(seed: u64, mode: PongMode, tuning: PongTuning) -> Self {
        Self {
            session: Session::new(1),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            mode,
            ball: Ball {
                pos: Vec2::new(COURT_WIDTH / 2.0, COURT_HEIGHT / 2.0),
                vel: Vec2::splat(INITIAL_BALL_SPEED),
            },
            left: Paddle::default(),
            right: Paddle::default(),
            winner: None,
        }
    }

    pub fn mode(&self) -> PongMode {
        self.mode
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn left(&self) -> &Paddle {
        &self.left
    }

    pub fn right(&self) -> &Paddle {
        &self.right
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// Centre the ball, serving toward `toward` (or a random side)
    fn serve(&mut self, toward: Option<Side>) {
        let toward = toward.unwrap_or_else(|| {
            if self.rng.random_bool(0.5) {
                Side::Right
            } else {
                Side::Left
            }
        });
        let vx = match toward {
            Side::Left => -INITIAL_BALL_SPEED,
            Side::Right => INITIAL_BALL_SPEED,
        };
        let vy = (self.rng.random::<f32>() - 0.5) * INITIAL_BALL_SPEED;
        self.ball = Ball {
            pos: Vec2::new(COURT_WIDTH / 2.0, COURT_HEIGHT / 2.0),
            vel: Vec2::new(vx, vy),
        };
    }

    pub fn tick(&mut self, input: &PongInput) {
        if !self.session.is_running() {
            return;
        }
        self.session.count_tick();

        self.move_paddles(input);
        self.move_ball();
    }

    fn move_paddles(&mut self, input: &PongInput) {
        if input.left_up {
            self.left.nudge(-PADDLE_SPEED);
        }
        if input.left_down {
            self.left.nudge(PADDLE_SPEED);
        }

        match self.mode {
            PongMode::Multi => {
                if input.right_up {
                    self.right.nudge(-PADDLE_SPEED);
                }
                if input.right_down {
                    self.right.nudge(PADDLE_SPEED);
                }
            }
            PongMode::Single => {
                let diff = self.ball.pos.y + BALL_SIZE / 2.0 - self.right.center();
                if diff.abs() > AI_DEADZONE {
                    let step = PADDLE_SPEED * self.tuning.ai_speed_factor;
                    self.right.nudge(step.copysign(diff));
                }
            }
        }
    }

    fn move_ball(&mut self) {
        let mut pos = self.ball.pos + self.ball.vel;
        let mut vel = self.ball.vel;

        if pos.y <= 0.0 || pos.y >= COURT_HEIGHT - BALL_SIZE {
            vel = reflect_velocity(vel, Vec2::Y);
            pos.y = pos.y.clamp(0.0, COURT_HEIGHT - BALL_SIZE);
        }

        if pos.x <= PADDLE_WIDTH && vel.x < 0.0 && self.left.spans(pos.y) {
            pos.x = PADDLE_WIDTH;
            vel = self.return_ball(vel, pos.y, self.left.center());
        }
        if pos.x + BALL_SIZE >= COURT_WIDTH - PADDLE_WIDTH
            && vel.x > 0.0
            && self.right.spans(pos.y)
        {
            pos.x = COURT_WIDTH - PADDLE_WIDTH - BALL_SIZE;
            vel = self.return_ball(vel, pos.y, self.right.center());
        }

        self.ball = Ball { pos, vel };

        if pos.x < 0.0 {
            self.point(Side::Right);
        } else if pos.x > COURT_WIDTH {
            self.point(Side::Left);
        }
    }

    /// Reverse horizontally, angle by strike position, speed up to the cap
    fn return_ball(&self, vel: Vec2, ball_y: f32, paddle_center: f32) -> Vec2 {
        let mut vel = Vec2::new(-vel.x, vel.y);
        let hit_pos = (ball_y + BALL_SIZE / 2.0 - paddle_center) / (PADDLE_HEIGHT / 2.0);
        vel.y += hit_pos * 2.0;

        let speed = vel.length();
        let target = (speed * self.tuning.bounce_speedup).min(MAX_BALL_SPEED);
        vel * (target / speed)
    }

    fn point(&mut self, side: Side) {
        let paddle = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        paddle.score += 1;
        let score = paddle.score;
        if side == Side::Left {
            self.session.add_score(1);
        }

        if score >= self.tuning.winning_score {
            log::info!("{:?} side wins {}-{}", side, self.left.score, self.right.score);
            self.winner = Some(side);
            self.session.end();
        }
        // Serve toward the side that conceded
        let toward = match side {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        };
        self.serve(Some(toward));
    }
}

impl ArcadeGame for PongGame {
    fn id(&self) -> GameId {
        GameId::Pong
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn start(&mut self) {
        self.session.start();
        self.left = Paddle::default();
        self.right = Paddle::default();
        self.winner = None;
        self.serve(None);
    }

    fn reset(&mut self) {
        self.session.reset();
        self.left = Paddle::default();
        self.right = Paddle::default();
        self.winner = None;
        self.ball = Ball {
            pos: Vec2::new(COURT_WIDTH / 2.0, COURT_HEIGHT / 2.0),
            vel: Vec2::splat(INITIAL_BALL_SPEED),
        };
    }

    fn step(&mut self, input: &InputLatch) {
        self.tick(&PongInput::from_latch(input));
    }

    fn tick_period_ms(&self) -> u32 {
        self.tuning.period_ms
    }

    fn frame(&self) -> Frame {
        let mut frame = Frame::new(GameId::Pong, COURT_WIDTH, COURT_HEIGHT, &self.session);
        frame.overlay.versus = Some([self.left.score, self.right.score]);
        if let Some(winner) = self.winner {
            let name = match (winner, self.mode) {
                (Side::Left, _) => "Player 1",
                (Side::Right, PongMode::Single) => "AI",
                (Side::Right, PongMode::Multi) => "Player 2",
            };
            frame.overlay.message = Some(format!("{} wins!", name));
        }

        frame.push(Sprite::new(
            SpriteKind::Paddle,
            0.0,
            self.left.y,
            PADDLE_WIDTH,
            PADDLE_HEIGHT,
        ));
        frame.push(Sprite::new(
            SpriteKind::Paddle,
            COURT_WIDTH - PADDLE_WIDTH,
            self.right.y,
            PADDLE_WIDTH,
            PADDLE_HEIGHT,
        ));
        frame.push(Sprite::new(
            SpriteKind::Ball,
            self.ball.pos.x,
            self.ball.pos.y,
            BALL_SIZE,
            BALL_SIZE,
        ));
        frame
    }
}
