//! Space Invaders
//!
//! An 11x5 formation marches sideways across an 800x600 field, dropping a
//! row at each edge. The cannon slides along the bottom and fires upward;
//! the formation fires back at random.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::Rect;
use super::frame::{Frame, Sprite, SpriteKind};
use super::session::{EntityIds, Session};
use super::ArcadeGame;
use crate::platform::{InputLatch, Key};
use crate::tuning::{ms_to_ticks, InvadersTuning};
use crate::GameId;

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;
pub const PLAYER_WIDTH: f32 = 40.0;
pub const PLAYER_HEIGHT: f32 = 20.0;
pub const PLAYER_Y: f32 = FIELD_HEIGHT - 60.0;
pub const PLAYER_SPEED: f32 = 5.0;
pub const INVADER_WIDTH: f32 = 30.0;
pub const INVADER_HEIGHT: f32 = 20.0;
pub const INVADER_ROWS: usize = 5;
pub const INVADER_COLS: usize = 11;
pub const INVADER_SPACING_X: f32 = 50.0;
pub const INVADER_SPACING_Y: f32 = 40.0;
pub const FORMATION_ORIGIN: Vec2 = Vec2::new(100.0, 50.0);
/// Vertical drop when the formation hits an edge
pub const INVADER_DROP: f32 = 20.0;
pub const SHOT_WIDTH: f32 = 4.0;
pub const SHOT_HEIGHT: f32 = 10.0;
pub const PLAYER_SHOT_SPEED: f32 = 8.0;
pub const INVADER_SHOT_SPEED: f32 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Invader {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    /// 3 for the top row, 2 for the next two, 1 for the bottom two
    pub tier: u8,
}

impl Invader {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, INVADER_WIDTH, INVADER_HEIGHT)
    }

    pub fn points(&self) -> u64 {
        u64::from(self.tier) * 10
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shot {
    pub id: u32,
    pub pos: Vec2,
}

impl Shot {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, SHOT_WIDTH, SHOT_HEIGHT)
    }
}

/// Cannon controls for one tick
#[derive(Debug, Clone, Default)]
pub struct InvadersInput {
    pub left: bool,
    pub right: bool,
    /// Press edge only
    pub fire: bool,
}

impl InvadersInput {
    pub fn from_latch(latch: &InputLatch) -> Self {
        Self {
            left: latch.any_active(&[Key::ArrowLeft, Key::A]),
            right: latch.any_active(&[Key::ArrowRight, Key::D]),
            fire: latch.was_pressed(Key::Space),
        }
    }
}

fn tier_for_row(row: usize) -> u8 {
    match row {
        0 => 3,
        1 | 2 => 2,
        _ => 1,
    }
}

fn formation(ids: &mut EntityIds) -> Vec<Invader> {
    let mut invaders = Vec::with_capacity(INVADER_ROWS * INVADER_COLS);
    for row in 0..INVADER_ROWS {
        for col in 0..INVADER_COLS {
            invaders.push(Invader {
                id: ids.next_id(),
                pos: FORMATION_ORIGIN
                    + Vec2::new(
                        col as f32 * INVADER_SPACING_X,
                        row as f32 * INVADER_SPACING_Y,
                    ),
                tier: tier_for_row(row),
            });
        }
    }
    invaders
}

pub struct InvadersGame {
    session: Session,
    tuning: InvadersTuning,
    rng: Pcg32,
    ids: EntityIds,
    /// Cannon x (left edge)
    player_x: f32,
    invaders: Vec<Invader>,
    player_shots: Vec<Shot>,
    invader_shots: Vec<Shot>,
    /// +1 marching right, -1 left
    direction: f32,
    speed: f32,
    wave_timer: Option<u32>,
}

impl InvadersGame {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, InvadersTuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: InvadersTuning) -> Self {
        let mut ids = EntityIds::new();
        let invaders = formation(&mut ids);
        let speed = tuning.initial_speed;
        Self {
            session: Session::new(tuning.lives),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            ids,
            player_x: FIELD_WIDTH / 2.0 - PLAYER_WIDTH / 2.0,
            invaders,
            player_shots: Vec::new(),
            invader_shots: Vec::new(),
            direction: 1.0,
            speed,
            wave_timer: None,
        }
    }

    pub fn player_rect(&self) -> Rect {
        Rect::new(self.player_x, PLAYER_Y, PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    pub fn invaders(&self) -> &[Invader] {
        &self.invaders
    }

    pub fn player_shots(&self) -> &[Shot] {
        &self.player_shots
    }

    pub fn invader_shots(&self) -> &[Shot] {
        &self.invader_shots
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn wave_pending(&self) -> bool {
        self.wave_timer.is_some()
    }

    pub fn tick(&mut self, input: &InvadersInput) {
        if !self.session.is_running() {
            return;
        }
        self.session.count_tick();

        if input.left {
            self.player_x = (self.player_x - PLAYER_SPEED).max(0.0);
        }
        if input.right {
            self.player_x = (self.player_x + PLAYER_SPEED).min(FIELD_WIDTH - PLAYER_WIDTH);
        }
        if input.fire {
            let id = self.ids.next_id();
            self.player_shots.push(Shot {
                id,
                pos: Vec2::new(
                    self.player_x + PLAYER_WIDTH / 2.0 - SHOT_WIDTH / 2.0,
                    PLAYER_Y,
                ),
            });
        }

        self.update_shots();
        self.invaders_fire();
        self.march();
        self.resolve_player_hits();

        if self.resolve_cannon_hit() {
            return;
        }
        if self
            .invaders
            .iter()
            .any(|inv| inv.pos.y + INVADER_HEIGHT >= PLAYER_Y)
        {
            log::info!("Invaders landed");
            self.session.end();
            return;
        }

        if let Some(remaining) = self.wave_timer {
            if remaining <= 1 {
                self.wave_timer = None;
                self.invaders = formation(&mut self.ids);
                log::debug!("Wave {} at speed {}", self.session.level(), self.speed);
            } else {
                self.wave_timer = Some(remaining - 1);
            }
        }
    }

    fn update_shots(&mut self) {
        for shot in &mut self.player_shots {
            shot.pos.y -= PLAYER_SHOT_SPEED;
        }
        self.player_shots.retain(|s| s.pos.y > -SHOT_HEIGHT);

        for shot in &mut self.invader_shots {
            shot.pos.y += INVADER_SHOT_SPEED;
        }
        self.invader_shots
            .retain(|s| s.pos.y < FIELD_HEIGHT + SHOT_HEIGHT);
    }

    fn invaders_fire(&mut self) {
        if self.invaders.is_empty() {
            return;
        }
        let chance = self.tuning.fire_chance.clamp(0.0, 1.0);
        if !self.rng.random_bool(chance) {
            return;
        }
        let index = self.rng.random_range(0..self.invaders.len());
        let shooter = &self.invaders[index];
        let pos = Vec2::new(
            shooter.pos.x + INVADER_WIDTH / 2.0 - SHOT_WIDTH / 2.0,
            shooter.pos.y + INVADER_HEIGHT,
        );
        let id = self.ids.next_id();
        self.invader_shots.push(Shot { id, pos });
    }

    /// Whole formation steps together; any member reaching an edge reverses
    /// the march and drops every row
    fn march(&mut self) {
        if self.invaders.is_empty() {
            return;
        }
        let dx = self.direction * self.speed;
        let mut edge = false;
        for invader in &mut self.invaders {
            invader.pos.x += dx;
            if invader.pos.x <= 0.0 || invader.pos.x >= FIELD_WIDTH - INVADER_WIDTH {
                edge = true;
            }
        }
        if edge {
            self.direction = -self.direction;
            for invader in &mut self.invaders {
                invader.pos.y += INVADER_DROP;
            }
        }
    }

    fn resolve_player_hits(&mut self) {
        let mut hits = 0;
        let mut i = 0;
        while i < self.player_shots.len() {
            let shot = self.player_shots[i].rect();
            match self.invaders.iter().position(|inv| shot.overlaps(&inv.rect())) {
                Some(index) => {
                    let invader = self.invaders.remove(index);
                    self.player_shots.remove(i);
                    self.session.add_score(invader.points());
                    hits += 1;
                }
                None => i += 1,
            }
        }

        if hits > 0 && self.invaders.is_empty() && self.wave_timer.is_none() {
            let level = self.session.next_level();
            self.speed += self.tuning.speed_step;
            log::info!("Formation destroyed, level {}", level);
            self.wave_timer = Some(ms_to_ticks(
                self.tuning.wave_delay_ms,
                self.tuning.period_ms,
            ));
        }
    }

    /// Returns true if the session ended
    fn resolve_cannon_hit(&mut self) -> bool {
        let player = self.player_rect();
        if !self.invader_shots.iter().any(|s| s.rect().overlaps(&player)) {
            return false;
        }
        self.invader_shots.clear();
        let ended = self.session.lose_life();
        log::debug!("Cannon hit, {} lives left", self.session.lives());
        ended
    }

    fn restore_start(&mut self) {
        self.ids = EntityIds::new();
        self.invaders = formation(&mut self.ids);
        self.player_x = FIELD_WIDTH / 2.0 - PLAYER_WIDTH / 2.0;
        self.player_shots.clear();
        self.invader_shots.clear();
        self.direction = 1.0;
        self.speed = self.tuning.initial_speed;
        self.wave_timer = None;
    }
}

impl ArcadeGame for InvadersGame {
    fn id(&self) -> GameId {
        GameId::SpaceInvaders
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
    }

    fn reset(&mut self) {
        self.session.reset();
        self.restore_start();
    }

    fn step(&mut self, input: &InputLatch) {
        self.tick(&InvadersInput::from_latch(input));
    }

    fn tick_period_ms(&self) -> u32 {
        self.tuning.period_ms
    }

    fn frame(&self) -> Frame {
        let mut frame = Frame::new(
            GameId::SpaceInvaders,
            FIELD_WIDTH,
            FIELD_HEIGHT,
            &self.session,
        );
        for invader in &self.invaders {
            frame.push(
                Sprite::new(
                    SpriteKind::Invader { tier: invader.tier },
                    invader.pos.x,
                    invader.pos.y,
                    INVADER_WIDTH,
                    INVADER_HEIGHT,
                )
                .with_id(invader.id),
            );
        }
        for (kind, shots) in [
            (SpriteKind::PlayerShot, &self.player_shots),
            (SpriteKind::InvaderShot, &self.invader_shots),
        ] {
            for shot in shots {
                frame.push(
                    Sprite::new(kind, shot.pos.x, shot.pos.y, SHOT_WIDTH, SHOT_HEIGHT)
                        .with_id(shot.id),
                );
            }
        }
        frame.push(Sprite::new(
            SpriteKind::Cannon,
            self.player_x,
            PLAYER_Y,
            PLAYER_WIDTH,
            PLAYER_HEIGHT,
        ));
        frame
    }
}
