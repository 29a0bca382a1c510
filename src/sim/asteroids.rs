//! Asteroids
//!
//! Continuous 800x600 field that wraps on both axes. Ship physics, bullets
//! with a fixed lifetime, and asteroids that split large -> medium -> small.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{circles_overlap, clamp_speed, wrap_position};
use super::frame::{Frame, Sprite, SpriteKind};
use super::session::{EntityIds, Session};
use super::ArcadeGame;
use crate::heading_from_degrees;
use crate::platform::{InputLatch, Key};
use crate::tuning::{ms_to_ticks, AsteroidsTuning};
use crate::GameId;

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;
pub const SHIP_SIZE: f32 = 15.0;
pub const THRUST_POWER: f32 = 0.3;
/// Degrees per tick
pub const ROTATION_SPEED: f32 = 5.0;
pub const FRICTION: f32 = 0.98;
pub const MAX_SPEED: f32 = 8.0;
pub const BULLET_SPEED: f32 = 8.0;
pub const BULLET_LIFE: u32 = 60;
pub const BULLET_SIZE: f32 = 4.0;
/// New waves keep this distance from the field centre
pub const SAFE_SPAWN_RADIUS: f32 = 100.0;

fn field() -> Vec2 {
    Vec2::new(FIELD_WIDTH, FIELD_HEIGHT)
}

fn center() -> Vec2 {
    field() * 0.5
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AsteroidSize {
    Large,
    Medium,
    Small,
}

impl AsteroidSize {
    /// Collision radius in pixels
    pub fn radius(&self) -> f32 {
        match self {
            AsteroidSize::Large => 40.0,
            AsteroidSize::Medium => 25.0,
            AsteroidSize::Small => 12.0,
        }
    }

    pub fn points(&self) -> u64 {
        match self {
            AsteroidSize::Large => 20,
            AsteroidSize::Medium => 50,
            AsteroidSize::Small => 100,
        }
    }

    /// Fragment size and velocity spread when destroyed
    pub fn split(&self) -> Option<(AsteroidSize, f32)> {
        match self {
            AsteroidSize::Large => Some((AsteroidSize::Medium, 3.0)),
            AsteroidSize::Medium => Some((AsteroidSize::Small, 4.0)),
            AsteroidSize::Small => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Degrees; 0 points along +x
    pub rotation: f32,
    pub thrusting: bool,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            pos: center(),
            vel: Vec2::ZERO,
            rotation: 0.0,
            thrusting: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Ticks left
    pub life: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Asteroid {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub size: AsteroidSize,
}

/// Ship controls for one tick
#[derive(Debug, Clone, Default)]
pub struct AsteroidsInput {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub thrust: bool,
    /// Press edge only
    pub fire: bool,
}

impl AsteroidsInput {
    pub fn from_latch(latch: &InputLatch) -> Self {
        Self {
            rotate_left: latch.any_active(&[Key::ArrowLeft, Key::A]),
            rotate_right: latch.any_active(&[Key::ArrowRight, Key::D]),
            thrust: latch.any_active(&[Key::ArrowUp, Key::W]),
            fire: latch.was_pressed(Key::Space),
        }
    }
}

pub struct AsteroidsGame {
    session: Session,
    tuning: AsteroidsTuning,
    rng: Pcg32,
    ids: EntityIds,
    ship: Ship,
    bullets: Vec<Bullet>,
    asteroids: Vec<Asteroid>,
    invulnerable_ticks: u32,
    /// Ticks until the next wave spawns
    wave_timer: Option<u32>,
}

impl AsteroidsGame {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, AsteroidsTuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: AsteroidsTuning) -> Self {
        Self {
            session: Session::new(tuning.lives),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            ids: EntityIds::new(),
            ship: Ship::default(),
            bullets: Vec::new(),
            asteroids: Vec::new(),
            invulnerable_ticks: 0,
            wave_timer: None,
        }
    }

    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ticks > 0
    }

    pub fn wave_pending(&self) -> bool {
        self.wave_timer.is_some()
    }

    fn spread(&mut self, spread: f32) -> Vec2 {
        Vec2::new(
            (self.rng.random::<f32>() - 0.5) * spread,
            (self.rng.random::<f32>() - 0.5) * spread,
        )
    }

    /// Spawn `base + level` large asteroids away from the centre
    fn spawn_wave(&mut self) {
        let count = self.tuning.base_asteroids + self.session.level();
        for _ in 0..count {
            let pos = loop {
                let candidate = Vec2::new(
                    self.rng.random::<f32>() * FIELD_WIDTH,
                    self.rng.random::<f32>() * FIELD_HEIGHT,
                );
                if candidate.distance(center()) >= SAFE_SPAWN_RADIUS {
                    break candidate;
                }
            };
            let vel = self.spread(2.0);
            let rotation = self.rng.random::<f32>() * 360.0;
            let id = self.ids.next_id();
            self.asteroids.push(Asteroid {
                id,
                pos,
                vel,
                rotation,
                size: AsteroidSize::Large,
            });
        }
        log::debug!("Wave {} with {} asteroids", self.session.level(), count);
    }

    pub fn tick(&mut self, input: &AsteroidsInput) {
        if !self.session.is_running() {
            return;
        }
        self.session.count_tick();

        self.update_ship(input);
        if input.fire {
            self.fire();
        }
        self.update_bullets();
        self.update_asteroids();
        self.resolve_bullet_hits();

        if self.asteroids.is_empty() && self.wave_timer.is_none() {
            let level = self.session.next_level();
            log::info!("Field cleared, level {}", level);
            self.wave_timer = Some(ms_to_ticks(
                self.tuning.wave_delay_ms,
                self.tuning.period_ms,
            ));
        }

        self.resolve_ship_hit();
        if !self.session.is_running() {
            return;
        }

        self.invulnerable_ticks = self.invulnerable_ticks.saturating_sub(1);
        if let Some(remaining) = self.wave_timer {
            if remaining <= 1 {
                self.wave_timer = None;
                self.spawn_wave();
            } else {
                self.wave_timer = Some(remaining - 1);
            }
        }
    }

    fn update_ship(&mut self, input: &AsteroidsInput) {
        let ship = &mut self.ship;
        if input.rotate_left {
            ship.rotation -= ROTATION_SPEED;
        }
        if input.rotate_right {
            ship.rotation += ROTATION_SPEED;
        }
        ship.thrusting = input.thrust;
        if input.thrust {
            ship.vel = clamp_speed(
                ship.vel + heading_from_degrees(ship.rotation) * THRUST_POWER,
                MAX_SPEED,
            );
        }
        ship.vel *= FRICTION;
        ship.pos = wrap_position(ship.pos + ship.vel, field());
    }

    fn fire(&mut self) {
        let id = self.ids.next_id();
        self.bullets.push(Bullet {
            id,
            pos: self.ship.pos,
            vel: heading_from_degrees(self.ship.rotation) * BULLET_SPEED + self.ship.vel,
            life: BULLET_LIFE,
        });
    }

    fn update_bullets(&mut self) {
        for bullet in &mut self.bullets {
            bullet.pos = wrap_position(bullet.pos + bullet.vel, field());
            bullet.life = bullet.life.saturating_sub(1);
        }
        self.bullets.retain(|b| b.life > 0);
    }

    fn update_asteroids(&mut self) {
        for asteroid in &mut self.asteroids {
            asteroid.pos = wrap_position(asteroid.pos + asteroid.vel, field());
            asteroid.rotation += 1.0;
        }
    }

    /// Each bullet destroys at most one asteroid; fragments join the field
    /// immediately
    fn resolve_bullet_hits(&mut self) {
        let mut i = 0;
        while i < self.bullets.len() {
            let bullet_pos = self.bullets[i].pos;
            let hit = self
                .asteroids
                .iter()
                .position(|a| bullet_pos.distance(a.pos) < a.size.radius());
            match hit {
                Some(index) => {
                    self.bullets.remove(i);
                    let asteroid = self.asteroids.remove(index);
                    self.destroy(asteroid);
                }
                None => i += 1,
            }
        }
    }

    fn destroy(&mut self, asteroid: Asteroid) {
        self.session.add_score(asteroid.size.points());
        if let Some((size, spread)) = asteroid.size.split() {
            for _ in 0..2 {
                let vel = self.spread(spread);
                let rotation = self.rng.random::<f32>() * 360.0;
                let id = self.ids.next_id();
                self.asteroids.push(Asteroid {
                    id,
                    pos: asteroid.pos,
                    vel,
                    rotation,
                    size,
                });
            }
        }
    }

    fn resolve_ship_hit(&mut self) {
        if self.is_invulnerable() {
            return;
        }
        let ship_pos = self.ship.pos;
        let hit = self
            .asteroids
            .iter()
            .any(|a| circles_overlap(ship_pos, SHIP_SIZE, a.pos, a.size.radius()));
        if !hit {
            return;
        }
        let ended = self.session.lose_life();
        log::debug!("Ship hit, {} lives left", self.session.lives());
        if !ended {
            self.ship = Ship::default();
            // +1 so the decrement at the end of this tick leaves the full window
            self.invulnerable_ticks =
                ms_to_ticks(self.tuning.invulnerable_ms, self.tuning.period_ms) + 1;
        }
    }

    fn restore_start(&mut self) {
        self.ids = EntityIds::new();
        self.ship = Ship::default();
        self.bullets.clear();
        self.asteroids.clear();
        self.invulnerable_ticks = 0;
        self.wave_timer = None;
    }
}

impl ArcadeGame for AsteroidsGame {
    fn id(&self) -> GameId {
        GameId::Asteroids
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
        self.spawn_wave();
    }

    fn reset(&mut self) {
        self.session.reset();
        self.restore_start();
    }

    fn step(&mut self, input: &InputLatch) {
        self.tick(&AsteroidsInput::from_latch(input));
    }

    fn tick_period_ms(&self) -> u32 {
        self.tuning.period_ms
    }

    fn frame(&self) -> Frame {
        let mut frame = Frame::new(GameId::Asteroids, FIELD_WIDTH, FIELD_HEIGHT, &self.session);
        for asteroid in &self.asteroids {
            let d = asteroid.size.radius() * 2.0;
            frame.push(
                Sprite::new(
                    SpriteKind::Asteroid {
                        size: asteroid.size,
                    },
                    asteroid.pos.x,
                    asteroid.pos.y,
                    d,
                    d,
                )
                .with_id(asteroid.id)
                .rotated(asteroid.rotation),
            );
        }
        for bullet in &self.bullets {
            frame.push(
                Sprite::new(
                    SpriteKind::Bullet,
                    bullet.pos.x,
                    bullet.pos.y,
                    BULLET_SIZE,
                    BULLET_SIZE,
                )
                .with_id(bullet.id),
            );
        }
        frame.push(
            Sprite::new(
                SpriteKind::Ship {
                    thrusting: self.ship.thrusting,
                    invulnerable: self.is_invulnerable(),
                },
                self.ship.pos.x,
                self.ship.pos.y,
                SHIP_SIZE * 2.0,
                SHIP_SIZE * 2.0,
            )
            .rotated(self.ship.rotation),
        );
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn started(seed: u64) -> AsteroidsGame {
        let mut game = AsteroidsGame::new(seed);
        game.start();
        game
    }

    /// Empty field with one stationary asteroid and a stationary bullet on it
    fn lone_target(size: AsteroidSize) -> AsteroidsGame {
        let mut game = started(1);
        game.asteroids.clear();
        game.asteroids.push(Asteroid {
            id: 100,
            pos: Vec2::new(100.0, 100.0),
            vel: Vec2::ZERO,
            rotation: 0.0,
            size,
        });
        game.bullets.push(Bullet {
            id: 101,
            pos: Vec2::new(100.0, 100.0),
            vel: Vec2::ZERO,
            life: BULLET_LIFE,
        });
        game
    }

    #[test]
    fn test_first_wave() {
        let game = started(1);
        assert_eq!(game.asteroids().len(), 5);
        for asteroid in game.asteroids() {
            assert_eq!(asteroid.size, AsteroidSize::Large);
            assert!(asteroid.pos.distance(center()) >= SAFE_SPAWN_RADIUS);
            assert!(asteroid.vel.x.abs() <= 1.0 && asteroid.vel.y.abs() <= 1.0);
        }
    }

    #[test]
    fn test_large_splits_into_two_medium() {
        let mut game = lone_target(AsteroidSize::Large);
        game.tick(&AsteroidsInput::default());

        assert_eq!(game.session().score(), 20);
        assert!(game.bullets().is_empty());
        assert_eq!(game.asteroids().len(), 2);
        assert!(game
            .asteroids()
            .iter()
            .all(|a| a.size == AsteroidSize::Medium && a.vel.x.abs() <= 1.5));
        assert_eq!(game.session().level(), 1);
    }

    #[test]
    fn test_medium_splits_into_two_small() {
        let mut game = lone_target(AsteroidSize::Medium);
        game.tick(&AsteroidsInput::default());
        assert_eq!(game.session().score(), 50);
        assert_eq!(game.asteroids().len(), 2);
        assert!(game.asteroids().iter().all(|a| a.size == AsteroidSize::Small));
    }

    #[test]
    fn test_small_vanishes_and_next_wave_follows() {
        let mut game = lone_target(AsteroidSize::Small);
        game.tick(&AsteroidsInput::default());

        assert_eq!(game.session().score(), 100);
        assert!(game.asteroids().is_empty());
        assert_eq!(game.session().level(), 2);
        assert!(game.wave_pending());

        for _ in 0..ms_to_ticks(1000, 16) {
            game.tick(&AsteroidsInput::default());
        }
        assert!(!game.wave_pending());
        assert_eq!(game.asteroids().len(), 6);
        assert_eq!(game.session().level(), 2);
    }

    #[test]
    fn test_fire_spawns_bullet_with_ship_velocity() {
        let mut game = started(2);
        game.asteroids.clear();
        game.wave_timer = Some(1000);
        game.ship.vel = Vec2::new(1.0, 0.0);
        game.tick(&AsteroidsInput {
            fire: true,
            ..Default::default()
        });
        assert_eq!(game.bullets().len(), 1);
        let bullet = &game.bullets()[0];
        // 8 along +x plus the ship's velocity after friction
        assert!((bullet.vel.x - (8.0 + 0.98)).abs() < 1e-4);
        assert_eq!(bullet.life, BULLET_LIFE - 1);
    }

    #[test]
    fn test_bullets_expire() {
        let mut game = started(3);
        game.asteroids.clear();
        game.wave_timer = Some(1000);
        game.tick(&AsteroidsInput {
            fire: true,
            ..Default::default()
        });
        for _ in 0..BULLET_LIFE {
            game.tick(&AsteroidsInput::default());
        }
        assert!(game.bullets().is_empty());
    }

    #[test]
    fn test_thrust_respects_max_speed() {
        let mut game = started(4);
        game.asteroids.clear();
        game.wave_timer = Some(10_000);
        for _ in 0..500 {
            game.tick(&AsteroidsInput {
                thrust: true,
                ..Default::default()
            });
            assert!(game.ship().vel.length() <= MAX_SPEED + 1e-3);
            assert!(game.ship().pos.x >= 0.0 && game.ship().pos.x < FIELD_WIDTH);
        }
    }

    #[test]
    fn test_ship_hit_costs_life_and_grants_grace() {
        let mut game = started(5);
        game.asteroids.clear();
        game.asteroids.push(Asteroid {
            id: 50,
            pos: center() + Vec2::new(30.0, 0.0),
            vel: Vec2::ZERO,
            rotation: 0.0,
            size: AsteroidSize::Large,
        });
        game.tick(&AsteroidsInput::default());
        assert_eq!(game.session().lives(), 2);
        assert!(game.is_invulnerable());
        assert_eq!(game.ship().pos, center());

        // Still overlapping but invulnerable
        game.tick(&AsteroidsInput::default());
        assert_eq!(game.session().lives(), 2);
    }

    #[test]
    fn test_last_life_ends_session() {
        let mut game = started(6);
        game.session.lose_life();
        game.session.lose_life();
        game.asteroids[0].pos = game.ship.pos;
        game.asteroids[0].vel = Vec2::ZERO;
        game.tick(&AsteroidsInput::default());
        assert!(!game.session().is_running());
    }

    #[test]
    fn test_fire_latch_from_input() {
        let mut latch = InputLatch::new();
        latch.key_down(Key::Space);
        assert!(AsteroidsInput::from_latch(&latch).fire);
        latch.clear_presses();
        // Held but no new edge
        assert!(!AsteroidsInput::from_latch(&latch).fire);
    }

    proptest! {
        #[test]
        fn prop_everything_stays_on_field(seed in any::<u64>(), inputs in prop::collection::vec(0u8..16, 0..300)) {
            let mut game = started(seed);
            for bits in inputs {
                game.tick(&AsteroidsInput {
                    rotate_left: bits & 1 != 0,
                    rotate_right: bits & 2 != 0,
                    thrust: bits & 4 != 0,
                    fire: bits & 8 != 0,
                });
                for a in game.asteroids() {
                    prop_assert!(a.pos.x >= 0.0 && a.pos.x < FIELD_WIDTH);
                    prop_assert!(a.pos.y >= 0.0 && a.pos.y < FIELD_HEIGHT);
                }
                for b in game.bullets() {
                    prop_assert!(b.life > 0 && b.life <= BULLET_LIFE);
                }
            }
        }
    }
}
