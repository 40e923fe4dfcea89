//! Collapse Core - Deterministic Grid Entropy Collapse
//!
//! Repeatedly reduces per-cell "entropy" on an N×N grid until every cell
//! reaches zero:
//! 1. **Select**: the lowest positive entropy cell, ties broken uniformly at random
//! 2. **Collapse**: the selected cell drops to a random smaller value
//! 3. **Propagate**: each positive orthogonal neighbor is narrowed to a value
//!    strictly between the collapsed value and its own previous value
//! 4. **Record**: a snapshot of the whole grid goes to the sink after every step
//!
//! All randomness and output flow through the `collapse_env` traits, so any
//! run is reproducible from its seed.

pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod selector;

// Re-export key types for convenience
pub use config::CollapseConfig;
pub use engine::{CollapseEngine, EnginePhase, Propagation, RunSummary, StepReport};
pub use error::CollapseError;
pub use grid::{Cell, Grid};
pub use selector::{EntropySelector, Selection};
