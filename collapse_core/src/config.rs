//! Run configuration.

use crate::error::CollapseError;
use serde::{Deserialize, Serialize};

/// Default grid side length.
pub const DEFAULT_SIZE: usize = 9;

/// Default initial entropy for every cell.
pub const DEFAULT_INITIAL_VALUE: u32 = 9;

/// Configuration for a single collapse run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapseConfig {
    /// Grid side length (the grid is `size` x `size`)
    pub size: usize,

    /// Entropy every cell starts with
    pub initial_value: u32,

    /// Optional cap on the number of steps (None = run to completion)
    pub max_steps: Option<u64>,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            initial_value: DEFAULT_INITIAL_VALUE,
            max_steps: None,
        }
    }
}

impl CollapseConfig {
    /// Creates a configuration for a `size` x `size` grid at `initial_value`.
    pub fn new(size: usize, initial_value: u32) -> Self {
        Self {
            size,
            initial_value,
            max_steps: None,
        }
    }

    /// Sets the grid side length.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Sets the initial entropy.
    pub fn with_initial_value(mut self, value: u32) -> Self {
        self.initial_value = value;
        self
    }

    /// Caps the number of steps.
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Checks the configuration before a grid is built.
    pub fn validate(&self) -> Result<(), CollapseError> {
        if self.size == 0 {
            return Err(CollapseError::Configuration(
                "grid size must be at least 1".to_string(),
            ));
        }
        if self.size.checked_mul(self.size).is_none() {
            return Err(CollapseError::Configuration(format!(
                "grid size {} overflows the cell count",
                self.size
            )));
        }
        Ok(())
    }

    /// Upper bound on the steps a run can take: every step lowers the selected
    /// cell by at least one, so `size² × initial_value` steps always suffice.
    pub fn step_bound(&self) -> u64 {
        let cells = (self.size as u64).saturating_mul(self.size as u64);
        cells.saturating_mul(self.initial_value as u64)
    }
}
