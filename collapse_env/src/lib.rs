//! Collapse Environment Abstraction Layer
//!
//! This crate provides the seams that keep the collapse core free of I/O and
//! global state, so the same engine runs in both **Production** (OS-seeded
//! randomness, append-only text log) and **Simulation** (seeded ChaCha8,
//! in-memory or checked sinks).
//!
//! # Core Concept: Injected Collaborators
//!
//! Everything non-deterministic or external is passed in explicitly:
//! - Randomness (`uniform_int()`, `shuffle()`)
//! - Output (`append()` of grid snapshots)
//!
//! By deriving all randomness from a single 64-bit seed, any run becomes
//! reproducible via its seed number.
//!
//! # Example
//!
//! ```ignore
//! use collapse_env::{EnvError, RandomSource, SnapshotSink, Snapshot};
//!
//! fn record<R: RandomSource, S: SnapshotSink>(rng: &mut R, sink: &mut S) -> Result<(), EnvError> {
//!     let value = rng.uniform_int(0, 8)?;
//!     sink.append(&Snapshot::filled(3, value))
//! }
//! ```

mod error;
mod file_sink;
mod random;
mod sink;
mod std_impl;
mod types;

pub use error::EnvError;
pub use file_sink::TextFileSink;
pub use random::RandomSource;
pub use sink::{MemorySink, SnapshotSink};
pub use std_impl::StdRandom;
pub use types::Snapshot;
