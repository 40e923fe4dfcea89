//! Error types for the collapse core.

use collapse_env::EnvError;
use thiserror::Error;

/// Errors raised while building or stepping a collapse run.
///
/// `Configuration` aborts construction before any stepping. Every other
/// variant raised mid-run indicates a logic fault or a sink failure and ends
/// the run; none of them are retried or clamped away.
#[derive(Debug, Error)]
pub enum CollapseError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cell ({x}, {y}) is out of bounds for a {size}x{size} grid")]
    OutOfBounds { x: usize, y: usize, size: usize },

    #[error("Invalid sampling range: [{min}, {max}]")]
    InvalidRange { min: u32, max: u32 },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Engine is {actual}, expected {expected}")]
    Phase {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Step budget of {0} exhausted before the grid collapsed")]
    StepBudgetExceeded(u64),

    #[error("Snapshot sink error: {0}")]
    Sink(EnvError),
}

impl From<EnvError> for CollapseError {
    fn from(err: EnvError) -> Self {
        match err {
            EnvError::InvalidRange { min, max } => Self::InvalidRange { min, max },
            other => Self::Sink(other),
        }
    }
}
