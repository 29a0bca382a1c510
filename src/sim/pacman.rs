//! Pac-Man
//!
//! 19x21 maze. Pac-Man moves one cell per tick in its heading and wraps
//! through the side tunnel; ghosts take a random open neighbour every tick.
//! Eating a power pellet makes ghosts edible for a fixed number of ticks.

use glam::IVec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::frame::{Frame, Sprite, SpriteKind};
use super::grid::{Direction, Grid};
use super::session::{EntityIds, Session};
use super::ArcadeGame;
use crate::platform::{InputLatch, Key};
use crate::tuning::PacmanTuning;
use crate::GameId;

pub const GRID_WIDTH: i32 = 19;
pub const GRID_HEIGHT: i32 = 21;
pub const START_PACMAN: IVec2 = IVec2::new(9, 15);

/// 1 wall, 0 dot, 2 empty, 3 power pellet, 4 ghost house
const MAZE_LAYOUT: [[u8; GRID_WIDTH as usize]; GRID_HEIGHT as usize] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 3, 1, 1, 0, 1, 1, 1, 0, 1, 0, 1, 1, 1, 0, 1, 1, 3, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 1, 0, 1, 0, 1, 1, 1, 1, 1, 0, 1, 0, 1, 1, 0, 1],
    [1, 0, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 0, 1, 1, 1, 2, 1, 2, 1, 1, 1, 0, 1, 1, 1, 1],
    [2, 2, 2, 1, 0, 1, 2, 2, 2, 4, 2, 2, 2, 1, 0, 1, 2, 2, 2],
    [1, 1, 1, 1, 0, 1, 2, 1, 4, 4, 4, 1, 2, 1, 0, 1, 1, 1, 1],
    [2, 2, 2, 2, 0, 2, 2, 1, 4, 4, 4, 1, 2, 2, 0, 2, 2, 2, 2],
    [1, 1, 1, 1, 0, 1, 2, 1, 1, 1, 1, 1, 2, 1, 0, 1, 1, 1, 1],
    [2, 2, 2, 1, 0, 1, 2, 2, 2, 2, 2, 2, 2, 1, 0, 1, 2, 2, 2],
    [1, 1, 1, 1, 0, 1, 1, 1, 2, 1, 2, 1, 1, 1, 0, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 1, 0, 1, 1, 1, 0, 1, 0, 1, 1, 1, 0, 1, 1, 0, 1],
    [1, 3, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 3, 1],
    [1, 1, 0, 1, 0, 1, 0, 1, 1, 1, 1, 1, 0, 1, 0, 1, 0, 1, 1],
    [1, 0, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 1],
    [1, 0, 1, 1, 1, 1, 1, 1, 0, 1, 0, 1, 1, 1, 1, 1, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

/// Ghost spawn cells and initial headings
const GHOST_STARTS: [(IVec2, Direction); 4] = [
    (IVec2::new(9, 9), Direction::Up),
    (IVec2::new(8, 9), Direction::Left),
    (IVec2::new(10, 9), Direction::Right),
    (IVec2::new(9, 10), Direction::Down),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Wall,
    Dot,
    Empty,
    PowerPellet,
    GhostHouse,
}

impl Cell {
    fn from_layout(code: u8) -> Self {
        match code {
            0 => Cell::Dot,
            1 => Cell::Wall,
            3 => Cell::PowerPellet,
            4 => Cell::GhostHouse,
            _ => Cell::Empty,
        }
    }

    pub fn is_edible(&self) -> bool {
        matches!(self, Cell::Dot | Cell::PowerPellet)
    }
}

pub fn fresh_maze() -> Grid<Cell> {
    Grid::from_rows(
        MAZE_LAYOUT
            .iter()
            .map(|row| row.iter().map(|&code| Cell::from_layout(code))),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ghost {
    pub id: u32,
    /// Index into the four ghost personalities (colour)
    pub index: u8,
    pub pos: IVec2,
    pub heading: Direction,
}

pub struct PacmanGame {
    session: Session,
    tuning: PacmanTuning,
    rng: Pcg32,
    ids: EntityIds,
    maze: Grid<Cell>,
    pacman: IVec2,
    heading: Direction,
    requested: Option<Direction>,
    ghosts: Vec<Ghost>,
    power_ticks: u32,
}

impl PacmanGame {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, PacmanTuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: PacmanTuning) -> Self {
        let mut ids = EntityIds::new();
        let ghosts = spawn_ghosts(&mut ids);
        Self {
            session: Session::new(tuning.lives),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            ids,
            maze: fresh_maze(),
            pacman: START_PACMAN,
            heading: Direction::Right,
            requested: None,
            ghosts,
            power_ticks: 0,
        }
    }

    pub fn maze(&self) -> &Grid<Cell> {
        &self.maze
    }

    pub fn pacman(&self) -> IVec2 {
        self.pacman
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn is_powered(&self) -> bool {
        self.power_ticks > 0
    }

    pub fn power_ticks(&self) -> u32 {
        self.power_ticks
    }

    /// Dots and power pellets left
    pub fn remaining_food(&self) -> usize {
        self.maze.iter().filter(|(_, c)| c.is_edible()).count()
    }

    /// Buffer a heading change for the next tick (last request wins)
    pub fn request_direction(&mut self, dir: Direction) {
        self.requested = Some(dir);
    }

    fn walkable(&self, pos: IVec2) -> bool {
        matches!(self.maze.get(pos), Some(cell) if *cell != Cell::Wall)
    }

    pub fn tick(&mut self) {
        if !self.session.is_running() {
            return;
        }
        self.session.count_tick();

        if let Some(dir) = self.requested.take() {
            self.heading = dir;
        }
        self.move_pacman();
        self.move_ghosts();
        self.resolve_ghost_contact();
        if !self.session.is_running() {
            return;
        }

        if self.remaining_food() == 0 {
            let level = self.session.next_level();
            log::info!("Maze cleared, level {}", level);
            self.maze = fresh_maze();
            self.power_ticks = 0;
            self.reset_positions();
        } else {
            self.power_ticks = self.power_ticks.saturating_sub(1);
        }
    }

    fn move_pacman(&mut self) {
        let mut next = self.pacman + self.heading.delta();
        if next.x < 0 {
            next.x = GRID_WIDTH - 1;
        } else if next.x >= GRID_WIDTH {
            next.x = 0;
        }
        if !self.walkable(next) {
            return;
        }
        self.pacman = next;

        match self.maze.get(next).copied() {
            Some(Cell::Dot) => {
                self.maze.set(next, Cell::Empty);
                self.session.add_score(self.tuning.dot_points);
            }
            Some(Cell::PowerPellet) => {
                self.maze.set(next, Cell::Empty);
                self.session.add_score(self.tuning.power_points);
                self.power_ticks = self.tuning.power_mode_ticks;
            }
            _ => {}
        }
    }

    fn move_ghosts(&mut self) {
        for i in 0..self.ghosts.len() {
            let pos = self.ghosts[i].pos;
            let options: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|d| self.walkable(pos + d.delta()))
                .collect();
            if options.is_empty() {
                continue;
            }

            let chase = self.tuning.chase_bias > 0.0
                && self.rng.random::<f32>() < self.tuning.chase_bias;
            let dir = if chase {
                let target = self.pacman;
                options
                    .iter()
                    .copied()
                    .min_by_key(|d| {
                        let p = pos + d.delta() - target;
                        p.x.abs() + p.y.abs()
                    })
                    .unwrap_or(options[0])
            } else {
                options[self.rng.random_range(0..options.len())]
            };

            let ghost = &mut self.ghosts[i];
            ghost.pos = pos + dir.delta();
            ghost.heading = dir;
        }
    }

    fn resolve_ghost_contact(&mut self) {
        if !self.ghosts.iter().any(|g| g.pos == self.pacman) {
            return;
        }
        if self.is_powered() {
            // Ghost is not sent home; contact scores once per tick
            self.session.add_score(self.tuning.ghost_points);
        } else {
            let ended = self.session.lose_life();
            log::debug!("Pac-Man caught, {} lives left", self.session.lives());
            if !ended {
                self.reset_positions();
            }
        }
    }

    fn reset_positions(&mut self) {
        self.pacman = START_PACMAN;
        self.heading = Direction::Right;
        self.requested = None;
        for (ghost, (pos, heading)) in self.ghosts.iter_mut().zip(GHOST_STARTS) {
            ghost.pos = pos;
            ghost.heading = heading;
        }
    }

    fn restore_start(&mut self) {
        self.ids = EntityIds::new();
        self.ghosts = spawn_ghosts(&mut self.ids);
        self.maze = fresh_maze();
        self.power_ticks = 0;
        self.reset_positions();
    }
}

fn spawn_ghosts(ids: &mut EntityIds) -> Vec<Ghost> {
    GHOST_STARTS
        .iter()
        .enumerate()
        .map(|(index, (pos, heading))| Ghost {
            id: ids.next_id(),
            index: index as u8,
            pos: *pos,
            heading: *heading,
        })
        .collect()
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

impl ArcadeGame for PacmanGame {
    fn id(&self) -> GameId {
        GameId::PacMan
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
        if let Some(dir) = input.presses().iter().rev().find_map(|k| key_direction(*k)) {
            self.request_direction(dir);
        }
        self.tick();
    }

    fn tick_period_ms(&self) -> u32 {
        self.tuning.period_ms
    }

    fn frame(&self) -> Frame {
        let mut frame = Frame::new(
            GameId::PacMan,
            GRID_WIDTH as f32,
            GRID_HEIGHT as f32,
            &self.session,
        );
        for (pos, cell) in self.maze.iter() {
            let kind = match cell {
                Cell::Wall => SpriteKind::Wall,
                Cell::Dot => SpriteKind::Dot,
                Cell::PowerPellet => SpriteKind::PowerPellet,
                Cell::Empty | Cell::GhostHouse => continue,
            };
            frame.push(Sprite::cell(kind, pos.x, pos.y));
        }
        frame.push(
            Sprite::cell(
                SpriteKind::PacMan {
                    heading: self.heading,
                },
                self.pacman.x,
                self.pacman.y,
            )
            .rotated(self.heading.degrees()),
        );
        for ghost in &self.ghosts {
            frame.push(
                Sprite::cell(
                    SpriteKind::Ghost {
                        index: ghost.index,
                        frightened: self.is_powered(),
                    },
                    ghost.pos.x,
                    ghost.pos.y,
                )
                .with_id(ghost.id),
            );
        }
        frame
    }
}
