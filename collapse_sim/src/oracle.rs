//! Invariant oracle for simulation.
//!
//! The oracle sits between the engine and the real sink and checks every
//! snapshot against the run's invariants:
//! - Every snapshot is a fully populated `size` x `size` matrix
//! - No value exceeds the initial entropy
//! - No cell's value ever rises between consecutive snapshots

use collapse_core::CollapseConfig;
use collapse_env::{EnvError, Snapshot, SnapshotSink};
use tracing::warn;

/// A broken invariant observed on a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// 0-based index of the offending snapshot
    pub snapshot_index: u64,

    pub message: String,
}

/// Checking `SnapshotSink` decorator.
pub struct InvariantOracle<S> {
    inner: S,
    size: usize,
    initial_value: u32,
    previous: Option<Snapshot>,
    observed: u64,
    violations: Vec<Violation>,

    /// Reject offending snapshots instead of only recording them
    strict: bool,
}

impl<S: SnapshotSink> InvariantOracle<S> {
    /// Creates an oracle for runs built from `config`, forwarding to `inner`.
    pub fn new(inner: S, config: &CollapseConfig) -> Self {
        Self {
            inner,
            size: config.size,
            initial_value: config.initial_value,
            previous: None,
            observed: 0,
            violations: Vec::new(),
            strict: false,
        }
    }

    /// Makes the first violation fail the append (and so the run).
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    fn check(&self, snapshot: &Snapshot) -> Vec<String> {
        let mut problems = Vec::new();

        if snapshot.size != self.size || !snapshot.is_complete() {
            problems.push(format!(
                "expected a full {}x{} snapshot, got size {} with {} values",
                self.size,
                self.size,
                snapshot.size,
                snapshot.values.len()
            ));
            return problems;
        }

        let highest = snapshot.highest();
        if highest > self.initial_value {
            problems.push(format!(
                "value {} exceeds initial entropy {}",
                highest, self.initial_value
            ));
        }

        if let Some(previous) = self.previous.as_ref().filter(|p| p.is_complete()) {
            for (idx, (before, after)) in previous.values.iter().zip(&snapshot.values).enumerate() {
                if after > before {
                    problems.push(format!(
                        "cell ({}, {}) rose from {} to {}",
                        idx / self.size,
                        idx % self.size,
                        before,
                        after
                    ));
                }
            }
        }

        problems
    }

    /// Number of snapshots seen.
    pub fn observed(&self) -> u64 {
        self.observed
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns true if no invariant was broken.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// The most recent snapshot.
    pub fn last(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Consumes the oracle, returning the wrapped sink.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: SnapshotSink> SnapshotSink for InvariantOracle<S> {
    fn append(&mut self, snapshot: &Snapshot) -> Result<(), EnvError> {
        let index = self.observed;
        let problems = self.check(snapshot);

        for message in problems {
            warn!("Invariant violated at snapshot {}: {}", index, message);
            if self.strict {
                return Err(EnvError::sink(message));
            }
            self.violations.push(Violation { snapshot_index: index, message });
        }

        self.inner.append(snapshot)?;
        self.observed += 1;
        self.previous = Some(snapshot.clone());
        Ok(())
    }
}
