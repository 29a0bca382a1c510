//! Bounded grids and grid headings

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Grid heading (screen y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// One-cell displacement
    pub fn delta(&self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Rendering rotation in degrees (Up = 0, clockwise)
    pub fn degrees(&self) -> f32 {
        match self {
            Direction::Up => 0.0,
            Direction::Right => 90.0,
            Direction::Down => 180.0,
            Direction::Left => 270.0,
        }
    }
}

/// Fixed-size 2-D array, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: i32,
    height: i32,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn filled(width: i32, height: i32, value: T) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            cells: vec![value; len],
        }
    }
}

impl<T> Grid<T> {
    /// Build from rows; all rows must have the same length
    pub fn from_rows<R, I>(rows: R) -> Self
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = T>,
    {
        let mut cells = Vec::new();
        let mut width = 0;
        let mut height = 0;
        for row in rows {
            let before = cells.len();
            cells.extend(row);
            width = (cells.len() - before) as i32;
            height += 1;
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    fn index(&self, pos: IVec2) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn get(&self, pos: IVec2) -> Option<&T> {
        self.index(pos).map(|i| &self.cells[i])
    }

    /// Write a cell; out-of-bounds writes are ignored and return false
    pub fn set(&mut self, pos: IVec2, value: T) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    /// All cells with their coordinates, row by row
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &T)> {
        let width = self.width.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (IVec2::new(i as i32 % width, i as i32 / width), cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.delta() + dir.opposite().delta(), IVec2::ZERO);
        }
    }

    #[test]
    fn test_grid_bounds() {
        let mut grid = Grid::filled(3, 2, 0u8);
        assert!(grid.set(IVec2::new(2, 1), 7));
        assert!(!grid.set(IVec2::new(3, 1), 7));
        assert_eq!(grid.get(IVec2::new(2, 1)), Some(&7));
        assert_eq!(grid.get(IVec2::new(-1, 0)), None);
    }

    #[test]
    fn test_grid_from_rows_and_iter() {
        let grid = Grid::from_rows([[1, 2, 3], [4, 5, 6]]);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        let (pos, value) = grid.iter().nth(4).unwrap();
        assert_eq!(pos, IVec2::new(1, 1));
        assert_eq!(*value, 5);
    }
}
