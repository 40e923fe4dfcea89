//! Snapshot sink abstraction for the collapse engine.

use crate::error::EnvError;
use crate::types::Snapshot;

/// Abstraction for the append-only snapshot log.
///
/// # Implementations
///
/// - **Production**: `TextFileSink` - appends the textual grid dump to a file
/// - **Simulation**: `MemorySink`, `InvariantOracle`, `SimExport`
///
/// # Snapshot Flow
///
/// ```text
/// Engine                     Sink                       Consumer
///   |                          |                            |
///   |-- append(initial) ------>|                            |
///   |-- append(step 1) ------->|                            |
///   |         ...              |-- [file / memory] -------->|
///   |-- append(step n) ------->|                            |
/// ```
pub trait SnapshotSink {
    /// Appends one snapshot to the log.
    ///
    /// # Returns
    /// * `Ok(())` - Snapshot recorded
    /// * `Err(EnvError)` - The snapshot could not be recorded; the run must abort
    ///   so the recorded sequence stays contiguous.
    fn append(&mut self, snapshot: &Snapshot) -> Result<(), EnvError>;
}

impl<S: SnapshotSink + ?Sized> SnapshotSink for &mut S {
    fn append(&mut self, snapshot: &Snapshot) -> Result<(), EnvError> {
        (**self).append(snapshot)
    }
}

/// A disabled sink (`None`) drops snapshots.
impl<S: SnapshotSink> SnapshotSink for Option<S> {
    fn append(&mut self, snapshot: &Snapshot) -> Result<(), EnvError> {
        match self {
            Some(sink) => sink.append(snapshot),
            None => Ok(()),
        }
    }
}

/// Tee: forwards every snapshot to both sinks, first to `A`.
impl<A: SnapshotSink, B: SnapshotSink> SnapshotSink for (A, B) {
    fn append(&mut self, snapshot: &Snapshot) -> Result<(), EnvError> {
        self.0.append(snapshot)?;
        self.1.append(snapshot)
    }
}

/// In-memory sink that keeps every snapshot in order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    snapshots: Vec<Snapshot>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded snapshots.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Returns the number of recorded snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Returns the first recorded snapshot.
    pub fn first(&self) -> Option<&Snapshot> {
        self.snapshots.first()
    }

    /// Returns the most recent snapshot.
    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Consumes the sink, returning the snapshots.
    pub fn into_snapshots(self) -> Vec<Snapshot> {
        self.snapshots
    }
}

impl SnapshotSink for MemorySink {
    fn append(&mut self, snapshot: &Snapshot) -> Result<(), EnvError> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }
}
