//! Render projection
//!
//! A `Frame` is a flat, serializable description of what to draw: a list of
//! sprites in playfield coordinates plus the HUD overlay. Grid games use one
//! unit per cell; the continuous games use pixels. Producing a frame never
//! mutates game state.

use serde::Serialize;

use super::asteroids::AsteroidSize;
use super::grid::Direction;
use super::session::{Session, SessionPhase};
use super::tetris::PieceKind;
use crate::GameId;

/// What a sprite depicts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SpriteKind {
    // Tetris
    TetrisCell { piece: PieceKind },
    ActivePiece { piece: PieceKind },
    NextPiece { piece: PieceKind },
    // Snake
    SnakeHead { heading: Direction },
    SnakeBody,
    Food,
    // Pac-Man
    Wall,
    Dot,
    PowerPellet,
    PacMan { heading: Direction },
    Ghost { index: u8, frightened: bool },
    // Asteroids
    Ship { thrusting: bool, invulnerable: bool },
    Bullet,
    Asteroid { size: AsteroidSize },
    // Space Invaders
    Cannon,
    Invader { tier: u8 },
    PlayerShot,
    InvaderShot,
    // Pong
    Paddle,
    Ball,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sprite {
    #[serde(flatten)]
    pub kind: SpriteKind,
    /// Stable entity ID, when the sprite tracks an entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Degrees, clockwise
    pub rotation: f32,
}

impl Sprite {
    pub fn new(kind: SpriteKind, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            kind,
            id: None,
            x,
            y,
            w,
            h,
            rotation: 0.0,
        }
    }

    /// One grid cell
    pub fn cell(kind: SpriteKind, x: i32, y: i32) -> Self {
        Self::new(kind, x as f32, y as f32, 1.0, 1.0)
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }
}

/// HUD state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub phase: SessionPhase,
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    /// Filled in by the runner from the persisted best
    pub high_score: u64,
    /// Left and right scores for head-to-head games
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versus: Option<[u32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Overlay {
    pub fn from_session(session: &Session) -> Self {
        let message = match session.phase() {
            SessionPhase::Idle => Some("Press Enter to start".to_string()),
            SessionPhase::Paused => Some("Paused".to_string()),
            SessionPhase::Ended => Some("Game Over".to_string()),
            SessionPhase::Running => None,
        };
        Self {
            phase: session.phase(),
            score: session.score(),
            lives: session.lives(),
            level: session.level(),
            high_score: 0,
            versus: None,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub game: GameId,
    pub width: f32,
    pub height: f32,
    pub sprites: Vec<Sprite>,
    pub overlay: Overlay,
}

impl Frame {
    pub fn new(game: GameId, width: f32, height: f32, session: &Session) -> Self {
        Self {
            game,
            width,
            height,
            sprites: Vec::new(),
            overlay: Overlay::from_session(session),
        }
    }

    pub fn push(&mut self, sprite: Sprite) {
        self.sprites.push(sprite);
    }

    /// Sprites of one kind category, for assertions and hosts that draw in layers
    pub fn count_where(&self, pred: impl Fn(&SpriteKind) -> bool) -> usize {
        self.sprites.iter().filter(|s| pred(&s.kind)).count()
    }

    pub fn to_json(&self) -> crate::ArcadeResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_messages() {
        let mut session = Session::new(3);
        assert_eq!(
            Overlay::from_session(&session).message.as_deref(),
            Some("Press Enter to start")
        );
        session.start();
        assert_eq!(Overlay::from_session(&session).message, None);
        session.toggle_pause();
        assert_eq!(
            Overlay::from_session(&session).message.as_deref(),
            Some("Paused")
        );
    }

    #[test]
    fn test_frame_json_shape() {
        let session = Session::new(3);
        let mut frame = Frame::new(GameId::Snake, 20.0, 20.0, &session);
        frame.push(Sprite::cell(SpriteKind::Food, 15, 15).with_id(4));
        frame.push(Sprite::cell(
            SpriteKind::SnakeHead {
                heading: Direction::Right,
            },
            10,
            10,
        ));

        let json: serde_json::Value =
            serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(json["game"], "snake");
        assert_eq!(json["sprites"][0]["type"], "food");
        assert_eq!(json["sprites"][0]["id"], 4);
        assert_eq!(json["sprites"][1]["type"], "snake-head");
        assert_eq!(json["sprites"][1]["heading"], "right");
        assert!(json["sprites"][1].get("id").is_none());
        assert_eq!(json["overlay"]["phase"], "idle");
    }
}
