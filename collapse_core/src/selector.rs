//! Lowest/highest entropy selection.

use crate::error::CollapseError;
use crate::grid::{Cell, Grid};
use collapse_env::RandomSource;

/// Per-step selection result.
///
/// Recomputed from scratch after every mutation; holds copies of cell
/// coordinates and values, never references into the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// The lowest positive entropy cell chosen for the next collapse
    /// (None once no cell is positive)
    pub lowest: Option<Cell>,

    /// The highest entropy anywhere in the grid
    pub highest: u32,
}

impl Selection {
    /// Returns true when the run is complete.
    pub fn is_terminal(&self) -> bool {
        self.highest == 0
    }
}

/// Scans a grid for collapse candidates.
pub struct EntropySelector;

impl EntropySelector {
    /// Returns every cell whose value is positive and equal to the minimum
    /// positive value in the grid. Empty if no cell is positive.
    pub fn lowest_entropy_candidates(grid: &Grid) -> Vec<Cell> {
        let mut candidates = Vec::new();
        let mut lowest = u32::MAX;

        for cell in grid.cells().filter(|c| c.value > 0) {
            if cell.value < lowest {
                lowest = cell.value;
                candidates.clear();
            }
            if cell.value == lowest {
                candidates.push(*cell);
            }
        }

        candidates
    }

    /// Resolves a candidate set to one cell.
    ///
    /// Several candidates are shuffled and the first is taken, so each is
    /// equally likely. A single candidate is returned without drawing from
    /// `rng`.
    pub fn pick_one<R: RandomSource>(mut candidates: Vec<Cell>, rng: &mut R) -> Option<Cell> {
        if candidates.len() > 1 {
            rng.shuffle(&mut candidates);
        }
        candidates.into_iter().next()
    }

    /// Returns the maximum value across all cells, zero included.
    pub fn highest_entropy(grid: &Grid) -> u32 {
        grid.cells().map(|c| c.value).max().unwrap_or(0)
    }

    /// Computes a fresh selection for `grid`.
    ///
    /// # Errors
    /// * `CollapseError::InvariantViolation` - some cell is positive but no
    ///   candidate was found
    pub fn select<R: RandomSource>(grid: &Grid, rng: &mut R) -> Result<Selection, CollapseError> {
        let highest = Self::highest_entropy(grid);
        let lowest = Self::pick_one(Self::lowest_entropy_candidates(grid), rng);

        if highest > 0 && lowest.is_none() {
            return Err(CollapseError::InvariantViolation(format!(
                "highest entropy is {} but no positive cell was selected",
                highest
            )));
        }

        Ok(Selection { lowest, highest })
    }
}
