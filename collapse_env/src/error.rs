//! Error types for the collapse environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Sampling range is empty (`min > max`)
    #[error("Invalid range: [{min}, {max}]")]
    InvalidRange { min: u32, max: u32 },

    /// Underlying file or stream failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sink rejected a snapshot
    #[error("Sink error: {0}")]
    SinkError(String),

    /// Snapshot serialization failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl EnvError {
    /// Creates an invalid range error.
    pub fn invalid_range(min: u32, max: u32) -> Self {
        Self::InvalidRange { min, max }
    }

    /// Creates a sink error.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::SinkError(msg.into())
    }
}
