//! Scenario runner - executes collapse runs and checks their outcome.

use crate::context::SimContext;
use crate::exporter::SimExport;
use crate::oracle::InvariantOracle;
use crate::scenarios::ScenarioId;

use collapse_core::{CollapseConfig, CollapseEngine, CollapseError, RunSummary};
use collapse_env::{RandomSource, TextFileSink};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Whether the run passed all assertions
    pub passed: bool,

    /// Run totals
    pub summary: RunSummary,

    /// Random operations consumed
    pub draws: u64,

    /// Invariant violations reported by the oracle
    pub violations: usize,

    /// Failure message if any
    pub failure_reason: Option<String>,
}

impl ScenarioResult {
    fn failed(scenario: &str, seed: u64, reason: String) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            passed: false,
            summary: RunSummary { seed, ..Default::default() },
            draws: 0,
            violations: 0,
            failure_reason: Some(reason),
        }
    }
}

/// Runs collapse scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Text snapshot log (appended to)
    output: Option<PathBuf>,

    /// JSON export destination
    export: Option<PathBuf>,

    /// Step cap applied on top of the scenario configuration
    max_steps: Option<u64>,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            output: None,
            export: None,
            max_steps: None,
        }
    }

    /// Appends snapshots to a text log.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Writes a JSON export after the run.
    pub fn with_export(mut self, path: impl Into<PathBuf>) -> Self {
        self.export = Some(path.into());
        self
    }

    /// Caps the number of steps.
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Runs a preset scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        debug!("{}: {}", scenario.name(), scenario.description());
        self.run_config(scenario.name(), scenario.config())
    }

    /// Runs an arbitrary configuration under `name`.
    pub fn run_config(&self, name: &str, config: CollapseConfig) -> ScenarioResult {
        info!(
            "Starting scenario: {} ({}x{} @ {}, seed={})",
            name, config.size, config.size, config.initial_value, self.seed
        );

        match self.execute(name, config) {
            Ok(result) => result,
            Err(e) => {
                warn!("Scenario {} aborted: {}", name, e);
                ScenarioResult::failed(name, self.seed, e.to_string())
            }
        }
    }

    fn execute(&self, name: &str, config: CollapseConfig) -> Result<ScenarioResult, CollapseError> {
        let config = match self.max_steps {
            Some(max) => config.with_max_steps(max),
            None => config,
        };

        let log = match &self.output {
            Some(path) => Some(TextFileSink::open(path)?),
            None => None,
        };
        if let Some(log) = &log {
            debug!("Appending snapshots to {}", log.path().display());
        }
        let export = self
            .export
            .as_ref()
            .map(|_| SimExport::new(name, self.seed, config.size, config.initial_value));
        let oracle = InvariantOracle::new((log, export), &config);

        let mut engine = CollapseEngine::new(config, SimContext::new(self.seed), oracle)?;
        let outcome = engine.run();
        let summary = engine.summary();
        let draws = engine.rng().draws();
        let seed = engine.rng().seed();

        let oracle = engine.into_sink();
        let violations = oracle.violations().len();
        let final_collapsed = oracle.last().map(|s| s.is_collapsed()).unwrap_or(false);

        let failure_reason = if let Err(e) = outcome {
            Some(e.to_string())
        } else if !summary.collapsed || !final_collapsed {
            Some("grid did not collapse to zero".to_string())
        } else if summary.steps > config.step_bound() {
            Some(format!(
                "{} steps exceeds the bound of {}",
                summary.steps,
                config.step_bound()
            ))
        } else if summary.snapshots != summary.steps + 1 {
            Some(format!(
                "{} snapshots for {} steps",
                summary.snapshots, summary.steps
            ))
        } else if violations > 0 {
            Some(format!(
                "{} invariant violations, first: {}",
                violations,
                oracle.violations()[0].message
            ))
        } else {
            None
        };
        let passed = failure_reason.is_none();

        let (_, export) = oracle.into_inner();
        if let (Some(mut export), Some(path)) = (export, &self.export) {
            export.finalize(passed, summary);
            export.write_to_file(path)?;
            info!("Exported {} frames to {}", export.frames.len(), path.display());
        }

        Ok(ScenarioResult {
            scenario: name.to_string(),
            seed,
            passed,
            summary,
            draws,
            violations,
            failure_reason,
        })
    }
}
