//! The entropy grid: an owned, fixed-size N×N matrix of cells.

use crate::error::CollapseError;
use collapse_env::Snapshot;
use serde::{Deserialize, Serialize};

/// Orthogonal neighbor offsets as (dx, dy): up, down, left, right.
const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Remaining entropy (0 = collapsed)
    pub value: u32,

    /// Row
    pub x: usize,

    /// Column
    pub y: usize,
}

/// N×N grid of cells stored row-major.
///
/// The size is fixed at construction; a grid is never resized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a `size` x `size` grid with every cell at `initial_value`.
    ///
    /// # Errors
    /// * `CollapseError::Configuration` - `size` is zero
    pub fn new(size: usize, initial_value: u32) -> Result<Self, CollapseError> {
        if size == 0 {
            return Err(CollapseError::Configuration(
                "grid size must be at least 1".to_string(),
            ));
        }

        let cells = (0..size)
            .flat_map(|x| (0..size).map(move |y| Cell { value: initial_value, x, y }))
            .collect();

        Ok(Self { size, cells })
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true if `(x, y)` addresses a cell of this grid.
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size
    }

    fn index(&self, x: usize, y: usize) -> Result<usize, CollapseError> {
        if !self.in_bounds(x, y) {
            return Err(CollapseError::OutOfBounds { x, y, size: self.size });
        }
        Ok(x * self.size + y)
    }

    /// Returns the cell at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Result<Cell, CollapseError> {
        let idx = self.index(x, y)?;
        Ok(self.cells[idx])
    }

    /// Overwrites the value of the cell at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, value: u32) -> Result<(), CollapseError> {
        let idx = self.index(x, y)?;
        self.cells[idx].value = value;
        Ok(())
    }

    /// Returns the in-bounds orthogonal neighbors of `(x, y)` in the order
    /// up, down, left, right.
    pub fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dx, dy)| {
            let nx = x.checked_add_signed(dx)?;
            let ny = y.checked_add_signed(dy)?;
            self.in_bounds(nx, ny).then_some((nx, ny))
        })
    }

    /// Iterates over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Returns true once every cell has reached zero.
    pub fn is_collapsed(&self) -> bool {
        self.cells.iter().all(|c| c.value == 0)
    }

    /// Copies the current values into a snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.size, self.cells.iter().map(|c| c.value).collect())
    }
}
