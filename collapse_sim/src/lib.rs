//! Collapse Deterministic Simulation Harness
//!
//! This crate wraps the collapse engine in a controlled, reproducible
//! environment and checks every run against its invariants.
//!
//! # Core Principle: One Seed, One Run
//!
//! All randomness is derived from a single 64-bit seed through `SimContext`,
//! so any failing run can be replayed exactly from the seed it reports.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     ScenarioRunner                       │
//! │  ┌──────────────┐     ┌──────────────────────────────┐   │
//! │  │  SimContext  │────►│        CollapseEngine        │   │
//! │  │ (ChaCha8Rng) │     │  Grid + EntropySelector      │   │
//! │  └──────────────┘     └──────────────┬───────────────┘   │
//! │                                      │ snapshots         │
//! │                       ┌──────────────▼───────────────┐   │
//! │                       │       InvariantOracle        │   │
//! │                       └───────┬──────────────┬───────┘   │
//! │                               │              │           │
//! │                     ┌─────────▼────┐  ┌──────▼──────┐    │
//! │                     │ TextFileSink │  │  SimExport  │    │
//! │                     └──────────────┘  └─────────────┘    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use collapse_sim::{ScenarioRunner, ScenarioId};
//!
//! let result = ScenarioRunner::new(42)
//!     .with_output("output.txt")
//!     .run(ScenarioId::Classic);
//! assert!(result.passed);
//! ```

mod context;
mod exporter;
mod oracle;
mod runner;
pub mod scenarios;

pub use context::SimContext;
pub use exporter::{SimExport, SimFrame};
pub use oracle::{InvariantOracle, Violation};
pub use runner::{ScenarioResult, ScenarioRunner};
pub use scenarios::ScenarioId;
