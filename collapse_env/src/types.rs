//! Common types for the collapse environment abstraction.

use serde::{Deserialize, Serialize};

/// A full copy of the grid's per-cell entropy values.
///
/// Values are stored row-major: the value of cell `(x, y)` lives at
/// `x * size + y`, where `x` is the row and `y` the column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snapshot {
    /// Side length of the square grid
    pub size: usize,

    /// Row-major cell values (`size * size` entries)
    pub values: Vec<u32>,
}

impl Snapshot {
    /// Creates a snapshot from row-major values.
    pub fn new(size: usize, values: Vec<u32>) -> Self {
        Self { size, values }
    }

    /// Creates a snapshot with every cell holding `value`.
    pub fn filled(size: usize, value: u32) -> Self {
        Self {
            size,
            values: vec![value; size * size],
        }
    }

    /// Returns true if the snapshot holds exactly `size * size` values.
    pub fn is_complete(&self) -> bool {
        self.values.len() == self.size * self.size
    }

    /// Returns the value at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.values.get(x * self.size + y).copied()
    }

    /// Iterates over the rows of the grid.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        // chunks() panics on zero
        self.values.chunks(self.size.max(1))
    }

    /// Returns the largest value in the snapshot (0 when empty).
    pub fn highest(&self) -> u32 {
        self.values.iter().copied().max().unwrap_or(0)
    }

    /// Returns true if every cell has reached zero.
    pub fn is_collapsed(&self) -> bool {
        self.values.iter().all(|&v| v == 0)
    }
}

impl std::fmt::Display for Snapshot {
    /// Renders each row as concatenated values on one line, followed by a
    /// blank separator line.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            for value in row {
                write!(f, "{}", value)?;
            }
            writeln!(f)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_display_format() {
        let snapshot = Snapshot::new(2, vec![1, 2, 3, 4]);
        assert_eq!(snapshot.to_string(), "12\n34\n\n");
    }

    #[test]
    fn test_snapshot_get_row_major() {
        let snapshot = Snapshot::new(3, (0..9).collect());
        assert_eq!(snapshot.get(0, 2), Some(2));
        assert_eq!(snapshot.get(2, 0), Some(6));
        assert_eq!(snapshot.get(3, 0), None);
        assert_eq!(snapshot.get(0, 3), None);
    }

    #[test]
    fn test_snapshot_completeness() {
        assert!(Snapshot::filled(4, 9).is_complete());
        assert!(!Snapshot::new(2, vec![1, 2, 3]).is_complete());
    }

    #[test]
    fn test_snapshot_collapsed() {
        assert!(Snapshot::filled(3, 0).is_collapsed());
        assert!(!Snapshot::new(2, vec![0, 0, 1, 0]).is_collapsed());
        assert_eq!(Snapshot::new(2, vec![0, 7, 1, 0]).highest(), 7);
    }
}
