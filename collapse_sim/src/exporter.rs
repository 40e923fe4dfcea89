//! JSON exporter for external renderers.
//!
//! Exports every snapshot of a run as a JSON frame so tools outside this
//! repository can replay or visualize the collapse.

use collapse_core::RunSummary;
use collapse_env::{EnvError, Snapshot, SnapshotSink};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A single frame of simulation data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimFrame {
    /// 0 = initial grid, n = after step n
    pub index: u64,

    /// Highest entropy in this frame
    pub highest: u32,

    /// Full grid values
    pub snapshot: Snapshot,
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    pub size: usize,
    pub initial_value: u32,

    /// All frames
    pub frames: Vec<SimFrame>,

    /// Final results
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64, size: usize, initial_value: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            size,
            initial_value,
            frames: Vec::new(),
            passed: false,
            summary: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, snapshot: Snapshot) {
        self.frames.push(SimFrame {
            index: self.frames.len() as u64,
            highest: snapshot.highest(),
            snapshot,
        });
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, summary: RunSummary) {
        self.passed = passed;
        self.summary = Some(summary);
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), EnvError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| EnvError::SerializationError(e.to_string()))?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

impl SnapshotSink for SimExport {
    fn append(&mut self, snapshot: &Snapshot) -> Result<(), EnvError> {
        self.add_frame(snapshot.clone());
        Ok(())
    }
}
