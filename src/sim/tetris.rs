//! Tetris
//!
//! A 10x20 well. Gravity runs on the tick; move, rotate and drop requests are
//! applied the moment they are pressed. When a piece can no longer fall it
//! goes through Locking -> ClearedCheck -> Spawning before the next piece
//! starts Falling.

use glam::IVec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::frame::{Frame, Sprite, SpriteKind};
use super::session::Session;
use super::ArcadeGame;
use crate::platform::{InputLatch, Key};
use crate::tuning::TetrisTuning;
use crate::GameId;

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// The seven tetrominoes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Spawn orientation
    pub fn shape(&self) -> Shape {
        match self {
            PieceKind::I => Shape::from_rows(&[&[1, 1, 1, 1]]),
            PieceKind::O => Shape::from_rows(&[&[1, 1], &[1, 1]]),
            PieceKind::T => Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1]]),
            PieceKind::S => Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0]]),
            PieceKind::Z => Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1]]),
            PieceKind::J => Shape::from_rows(&[&[1, 0, 0], &[1, 1, 1]]),
            PieceKind::L => Shape::from_rows(&[&[0, 0, 1], &[1, 1, 1]]),
        }
    }
}

/// Occupancy matrix of one piece orientation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: Vec<Vec<bool>>,
}

impl Shape {
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|&c| c != 0).collect())
                .collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Clockwise quarter turn: `rotated[i][j] = shape[h - 1 - j][i]`
    pub fn rotated_cw(&self) -> Shape {
        let h = self.height();
        let w = self.width();
        Shape {
            rows: (0..w)
                .map(|i| (0..h).map(|j| self.rows[h - 1 - j][i]).collect())
                .collect(),
        }
    }

    /// Offsets of filled cells
    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(x, _)| IVec2::new(x as i32, y as i32))
        })
    }
}

/// The falling piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
    /// Board position of the shape's top-left corner
    pub pos: IVec2,
}

impl Piece {
    /// Horizontally centred at the top of the well
    pub fn spawn(kind: PieceKind) -> Self {
        let shape = kind.shape();
        let x = (BOARD_WIDTH / 2 - shape.width() / 2) as i32;
        Self {
            kind,
            shape,
            pos: IVec2::new(x, 0),
        }
    }

    /// Board coordinates of filled cells
    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.shape.cells().map(move |c| c + self.pos)
    }
}

pub type Row = [Option<PieceKind>; BOARD_WIDTH];

/// Settled cells, row 0 at the top
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: Vec<Row>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            rows: vec![[None; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn get(&self, x: i32, y: i32) -> Option<PieceKind> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize).copied().flatten())
    }

    pub fn set(&mut self, x: i32, y: i32, kind: Option<PieceKind>) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(cell) = self
            .rows
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            *cell = kind;
        }
    }

    /// True if the shape at `pos` leaves the well sideways or at the bottom,
    /// or overlaps a settled cell. Cells above the top edge are allowed.
    pub fn collides(&self, shape: &Shape, pos: IVec2) -> bool {
        shape.cells().map(|c| c + pos).any(|p| {
            p.x < 0
                || p.x >= BOARD_WIDTH as i32
                || p.y >= BOARD_HEIGHT as i32
                || (p.y >= 0 && self.get(p.x, p.y).is_some())
        })
    }

    /// Merge a piece into the board; cells above the top are dropped
    pub fn stamp(&mut self, piece: &Piece) {
        for cell in piece.cells() {
            self.set(cell.x, cell.y, Some(piece.kind));
        }
    }

    /// Remove full rows, shifting everything above down. Returns rows cleared.
    pub fn clear_full_rows(&mut self) -> u32 {
        self.rows.retain(|row| row.iter().any(Option::is_none));
        let cleared = BOARD_HEIGHT - self.rows.len();
        for _ in 0..cleared {
            self.rows.insert(0, [None; BOARD_WIDTH]);
        }
        cleared as u32
    }

    pub fn filled_count(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_some()).count()
    }
}

/// Lifecycle of the current piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceState {
    Falling,
    Locking,
    ClearedCheck,
    Spawning,
    GameOver,
}

/// Discrete requests for one tick or keypress
#[derive(Debug, Clone, Default)]
pub struct TetrisInput {
    pub left: bool,
    pub right: bool,
    pub rotate: bool,
    pub soft_drop: bool,
    pub hard_drop: bool,
}

impl TetrisInput {
    pub fn from_key(key: Key) -> Self {
        Self {
            left: key == Key::ArrowLeft,
            right: key == Key::ArrowRight,
            rotate: matches!(key, Key::ArrowUp | Key::Space),
            soft_drop: key == Key::ArrowDown,
            hard_drop: key == Key::Enter,
        }
    }
}

pub struct TetrisGame {
    session: Session,
    tuning: TetrisTuning,
    rng: Pcg32,
    board: Board,
    current: Option<Piece>,
    next: PieceKind,
    state: PieceState,
    lines: u32,
}

impl TetrisGame {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, TetrisTuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: TetrisTuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let next = random_kind(&mut rng);
        Self {
            session: Session::new(1),
            tuning,
            rng,
            board: Board::new(),
            current: None,
            next,
            state: PieceState::Spawning,
            lines: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    pub fn next_kind(&self) -> PieceKind {
        self.next
    }

    pub fn piece_state(&self) -> PieceState {
        self.state
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    /// Gravity interval at the current level
    pub fn drop_interval_ms(&self) -> u32 {
        let level = self.session.level().saturating_sub(1);
        self.tuning
            .base_drop_ms
            .saturating_sub(level.saturating_mul(self.tuning.drop_step_ms))
            .max(self.tuning.min_drop_ms)
    }

    /// Apply one set of requests immediately
    pub fn apply(&mut self, input: &TetrisInput) {
        if input.left {
            self.shift(-1);
        }
        if input.right {
            self.shift(1);
        }
        if input.rotate {
            self.rotate();
        }
        if input.soft_drop {
            self.soft_drop();
        }
        if input.hard_drop {
            self.hard_drop();
        }
    }

    fn can_act(&self) -> bool {
        self.session.is_running() && self.state == PieceState::Falling
    }

    /// Move sideways by `dx`; rejected on collision
    pub fn shift(&mut self, dx: i32) -> bool {
        if !self.can_act() {
            return false;
        }
        let Some(piece) = self.current.as_mut() else {
            return false;
        };
        let target = piece.pos + IVec2::new(dx, 0);
        if self.board.collides(&piece.shape, target) {
            return false;
        }
        piece.pos = target;
        true
    }

    /// Rotate clockwise in place; rejected on collision (no wall kicks)
    pub fn rotate(&mut self) -> bool {
        if !self.can_act() {
            return false;
        }
        let Some(piece) = self.current.as_mut() else {
            return false;
        };
        let rotated = piece.shape.rotated_cw();
        if self.board.collides(&rotated, piece.pos) {
            return false;
        }
        piece.shape = rotated;
        true
    }

    /// One step down, locking if blocked
    pub fn soft_drop(&mut self) {
        if self.can_act() {
            self.fall();
        }
    }

    /// Move to the lowest valid row. The piece locks on the next gravity step.
    /// Returns rows travelled.
    pub fn hard_drop(&mut self) -> u32 {
        if !self.can_act() {
            return 0;
        }
        let Some(piece) = self.current.as_mut() else {
            return 0;
        };
        let mut rows = 0;
        while !self
            .board
            .collides(&piece.shape, piece.pos + IVec2::new(0, 1))
        {
            piece.pos.y += 1;
            rows += 1;
        }
        self.session
            .add_score(u64::from(rows) * self.tuning.hard_drop_points_per_row);
        rows
    }

    /// Gravity step
    pub fn tick(&mut self) {
        if !self.session.is_running() {
            return;
        }
        self.session.count_tick();
        if self.state == PieceState::Spawning {
            self.run_lock_sequence();
        } else {
            self.fall();
        }
    }

    fn fall(&mut self) {
        let Some(piece) = self.current.as_mut() else {
            return;
        };
        let below = piece.pos + IVec2::new(0, 1);
        if self.board.collides(&piece.shape, below) {
            self.state = PieceState::Locking;
            self.run_lock_sequence();
        } else {
            piece.pos = below;
        }
    }

    /// Drive the piece state machine until a piece is falling or the game is over
    fn run_lock_sequence(&mut self) {
        loop {
            match self.state {
                PieceState::Falling | PieceState::GameOver => return,
                PieceState::Locking => {
                    if let Some(piece) = self.current.take() {
                        self.board.stamp(&piece);
                    }
                    self.state = PieceState::ClearedCheck;
                }
                PieceState::ClearedCheck => {
                    let cleared = self.board.clear_full_rows();
                    let level = u64::from(self.session.level());
                    self.session.add_score(
                        u64::from(cleared) * self.tuning.points_per_line * level
                            + self.tuning.lock_points,
                    );
                    if cleared > 0 {
                        self.lines += cleared;
                        let per_level = self.tuning.lines_per_level.max(1);
                        self.session.raise_level_to(self.lines / per_level + 1);
                        log::debug!("Cleared {} rows, {} total", cleared, self.lines);
                    }
                    self.state = PieceState::Spawning;
                }
                PieceState::Spawning => {
                    let piece = Piece::spawn(self.next);
                    self.next = random_kind(&mut self.rng);
                    if self.board.collides(&piece.shape, piece.pos) {
                        log::info!("Tetris over with {} lines", self.lines);
                        self.state = PieceState::GameOver;
                        self.session.end();
                    } else {
                        self.current = Some(piece);
                        self.state = PieceState::Falling;
                    }
                }
            }
        }
    }
}

fn random_kind(rng: &mut Pcg32) -> PieceKind {
    PieceKind::ALL[rng.random_range(0..PieceKind::ALL.len())]
}

impl ArcadeGame for TetrisGame {
    fn id(&self) -> GameId {
        GameId::Tetris
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn start(&mut self) {
        self.session.start();
        self.board = Board::new();
        self.current = None;
        self.lines = 0;
        self.state = PieceState::Spawning;
        self.run_lock_sequence();
    }

    fn reset(&mut self) {
        self.session.reset();
        self.board = Board::new();
        self.current = None;
        self.lines = 0;
        self.state = PieceState::Spawning;
    }

    fn handle_press(&mut self, key: Key) {
        self.apply(&TetrisInput::from_key(key));
    }

    fn step(&mut self, _input: &InputLatch) {
        self.tick();
    }

    fn tick_period_ms(&self) -> u32 {
        self.drop_interval_ms()
    }

    fn frame(&self) -> Frame {
        let mut frame = Frame::new(
            GameId::Tetris,
            BOARD_WIDTH as f32,
            BOARD_HEIGHT as f32,
            &self.session,
        );
        for (y, row) in self.board.rows().iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if let Some(piece) = cell {
                    frame.push(Sprite::cell(
                        SpriteKind::TetrisCell { piece: *piece },
                        x as i32,
                        y as i32,
                    ));
                }
            }
        }
        if let Some(piece) = &self.current {
            for cell in piece.cells().filter(|c| c.y >= 0) {
                frame.push(Sprite::cell(
                    SpriteKind::ActivePiece { piece: piece.kind },
                    cell.x,
                    cell.y,
                ));
            }
        }
        // Preview in its own local coordinates
        for cell in self.next.shape().cells() {
            frame.push(Sprite::cell(
                SpriteKind::NextPiece { piece: self.next },
                cell.x,
                cell.y,
            ));
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn started(seed: u64) -> TetrisGame {
        let mut game = TetrisGame::new(seed);
        game.start();
        game
    }

    fn place(game: &mut TetrisGame, kind: PieceKind, x: i32, y: i32) {
        let mut piece = Piece::spawn(kind);
        piece.pos = IVec2::new(x, y);
        game.current = Some(piece);
        game.state = PieceState::Falling;
    }

    fn fill_row_except(board: &mut Board, y: i32, gaps: &[i32]) {
        for x in 0..BOARD_WIDTH as i32 {
            if !gaps.contains(&x) {
                board.set(x, y, Some(PieceKind::O));
            }
        }
    }

    #[test]
    fn test_spawn_positions() {
        assert_eq!(Piece::spawn(PieceKind::I).pos, IVec2::new(3, 0));
        assert_eq!(Piece::spawn(PieceKind::O).pos, IVec2::new(4, 0));
        assert_eq!(Piece::spawn(PieceKind::T).pos, IVec2::new(4, 0));
    }

    #[test]
    fn test_rotation_of_t() {
        let rotated = PieceKind::T.shape().rotated_cw();
        assert_eq!(rotated, Shape::from_rows(&[&[1, 0], &[1, 1], &[1, 0]]));
        // Four turns come back around
        let full = PieceKind::L
            .shape()
            .rotated_cw()
            .rotated_cw()
            .rotated_cw()
            .rotated_cw();
        assert_eq!(full, PieceKind::L.shape());
    }

    #[test]
    fn test_start_spawns_piece() {
        let game = started(1);
        assert_eq!(game.piece_state(), PieceState::Falling);
        assert!(game.current().is_some());
        assert!(game.session().is_running());
    }

    #[test]
    fn test_collision_rules() {
        let board = Board::new();
        let shape = PieceKind::O.shape();
        assert!(!board.collides(&shape, IVec2::new(0, -1))); // above the top is fine
        assert!(board.collides(&shape, IVec2::new(-1, 0)));
        assert!(board.collides(&shape, IVec2::new(9, 0)));
        assert!(board.collides(&shape, IVec2::new(0, 19)));
    }

    #[test]
    fn test_shift_blocked_at_wall() {
        let mut game = started(2);
        place(&mut game, PieceKind::O, 0, 5);
        assert!(!game.shift(-1));
        assert_eq!(game.current().unwrap().pos, IVec2::new(0, 5));
        assert!(game.shift(1));
        assert_eq!(game.current().unwrap().pos, IVec2::new(1, 5));
    }

    #[test]
    fn test_rotation_rejected_against_wall() {
        let mut game = started(3);
        // Vertical I against the right wall cannot turn horizontal
        let mut piece = Piece::spawn(PieceKind::I);
        piece.shape = piece.shape.rotated_cw();
        piece.pos = IVec2::new(9, 5);
        game.current = Some(piece.clone());
        assert!(!game.rotate());
        assert_eq!(game.current().unwrap(), &piece);
    }

    #[test]
    fn test_lock_and_single_line_clear() {
        let mut game = started(4);
        fill_row_except(&mut game.board, 19, &[0, 1]);
        place(&mut game, PieceKind::O, 0, 18);

        game.tick(); // blocked, locks

        assert_eq!(game.lines(), 1);
        // 1 line * 100 * level 1 + 10 lock
        assert_eq!(game.session().score(), 110);
        // The O's top half drops into the bottom row
        assert_eq!(game.board().get(0, 19), Some(PieceKind::O));
        assert_eq!(game.board().get(2, 19), None);
        assert_eq!(game.piece_state(), PieceState::Falling);
    }

    #[test]
    fn test_single_row_clear_shifts_rows_above() {
        let mut board = Board::new();
        let kinds = [PieceKind::I, PieceKind::O, PieceKind::T, PieceKind::S];
        for (i, kind) in kinds.into_iter().enumerate() {
            let y = 15 + i as i32;
            board.set(i as i32, y, Some(kind));
            board.set(9 - i as i32, y, Some(kind));
        }
        fill_row_except(&mut board, 19, &[]);
        let before = board.rows().to_vec();

        assert_eq!(board.clear_full_rows(), 1);

        assert_eq!(board.rows().len(), BOARD_HEIGHT);
        assert!(board.rows()[0].iter().all(Option::is_none));
        for y in 0..BOARD_HEIGHT - 1 {
            assert_eq!(board.rows()[y + 1], before[y], "row {} moved wrong", y);
        }
        assert_eq!(board.filled_count(), 8);
    }

    #[test]
    fn test_tetris_scores_four_lines() {
        let mut game = started(5);
        for y in 16..20 {
            fill_row_except(&mut game.board, y, &[9]);
        }
        let mut piece = Piece::spawn(PieceKind::I);
        piece.shape = piece.shape.rotated_cw();
        piece.pos = IVec2::new(9, 16);
        game.current = Some(piece);

        game.tick();

        assert_eq!(game.lines(), 4);
        assert_eq!(game.session().score(), 4 * 100 + 10);
        assert_eq!(game.board().filled_count(), 0);
    }

    #[test]
    fn test_level_and_interval_follow_lines() {
        let mut game = started(6);
        assert_eq!(game.drop_interval_ms(), 1000);
        game.lines = 9;
        fill_row_except(&mut game.board, 19, &[0, 1]);
        place(&mut game, PieceKind::O, 0, 18);
        game.tick();

        assert_eq!(game.lines(), 10);
        assert_eq!(game.session().level(), 2);
        assert_eq!(game.drop_interval_ms(), 900);
        assert_eq!(game.tick_period_ms(), 900);
    }

    #[test]
    fn test_interval_floor() {
        let mut game = started(7);
        game.session.raise_level_to(25);
        assert_eq!(game.drop_interval_ms(), 100);
    }

    #[test]
    fn test_hard_drop_scores_and_locks_next_tick() {
        let mut game = started(8);
        place(&mut game, PieceKind::O, 4, 0);

        let rows = game.hard_drop();
        assert_eq!(rows, 18);
        assert_eq!(game.session().score(), 36);
        assert_eq!(game.current().unwrap().pos, IVec2::new(4, 18));
        assert_eq!(game.board().filled_count(), 0);

        game.tick();
        assert_eq!(game.board().filled_count(), 4);
        assert_eq!(game.session().score(), 46);
    }

    #[test]
    fn test_soft_drop_locks_when_blocked() {
        let mut game = started(9);
        place(&mut game, PieceKind::O, 4, 18);
        game.handle_press(Key::ArrowDown);
        assert_eq!(game.board().filled_count(), 4);
    }

    #[test]
    fn test_game_over_when_spawn_blocked() {
        let mut game = started(10);
        for x in 0..BOARD_WIDTH as i32 {
            game.board.set(x, 0, Some(PieceKind::J));
            game.board.set(x, 1, Some(PieceKind::J));
        }
        // Leave a hole so the rows are not cleared
        game.board.set(0, 0, None);
        game.board.set(0, 1, None);
        place(&mut game, PieceKind::O, 0, 10);
        game.hard_drop();
        game.tick();

        assert_eq!(game.piece_state(), PieceState::GameOver);
        assert!(!game.session().is_running());
        assert!(game.current().is_none());
    }

    #[test]
    fn test_input_ignored_while_paused() {
        let mut game = started(11);
        place(&mut game, PieceKind::T, 4, 4);
        game.session_mut().toggle_pause();

        game.handle_press(Key::ArrowLeft);
        game.handle_press(Key::Enter);
        game.tick();
        assert_eq!(game.current().unwrap().pos, IVec2::new(4, 4));
    }

    #[test]
    fn test_frame_shows_board_and_piece() {
        let mut game = started(12);
        game.board.set(0, 19, Some(PieceKind::S));
        let frame = game.frame();
        assert_eq!(
            frame.count_where(|k| matches!(k, SpriteKind::TetrisCell { .. })),
            1
        );
        assert_eq!(
            frame.count_where(|k| matches!(k, SpriteKind::ActivePiece { .. })),
            4
        );
        assert_eq!(
            frame.count_where(|k| matches!(k, SpriteKind::NextPiece { .. })),
            4
        );
    }

    proptest! {
        #[test]
        fn prop_piece_never_overlaps_board(seed in any::<u64>(), moves in prop::collection::vec(0u8..6, 0..200)) {
            let mut game = started(seed);
            for m in moves {
                match m {
                    0 => { game.shift(-1); }
                    1 => { game.shift(1); }
                    2 => { game.rotate(); }
                    3 => game.soft_drop(),
                    4 => { game.hard_drop(); }
                    _ => game.tick(),
                }
                if let Some(piece) = game.current() {
                    prop_assert!(!game.board().collides(&piece.shape, piece.pos));
                }
                let filled = game.board().rows().iter().filter(|r| r.iter().all(Option::is_some)).count();
                prop_assert_eq!(filled, 0);
                prop_assert_eq!(game.board().rows().len(), BOARD_HEIGHT);
            }
        }
    }
}
