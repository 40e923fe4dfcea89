//! The collapse engine: drives a grid from uniform entropy down to zero.
//!
//! # State Machine
//!
//! ```text
//! Initializing --start()--> Stepping --step()*--> Terminated
//!       |                        |                    ^
//!       |                        +--(any error)--> Failed
//!       +------- (initial highest entropy is 0) ------+
//! ```
//!
//! Both `Terminated` and `Failed` are final.
//!
//! Each step runs strictly in order: collapse the selected cell, propagate to
//! its orthogonal neighbors, emit a snapshot, reselect, check termination.

use crate::config::CollapseConfig;
use crate::error::CollapseError;
use crate::grid::{Cell, Grid};
use crate::selector::{EntropySelector, Selection};
use collapse_env::{RandomSource, SnapshotSink};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Lifecycle phase of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// Grid built, initial snapshot not yet emitted
    Initializing,

    /// At least one cell still has positive entropy
    Stepping,

    /// Every cell is zero; final
    Terminated,

    /// A start or step returned an error; final
    Failed,
}

impl EnginePhase {
    /// Returns the phase name.
    pub fn name(&self) -> &'static str {
        match self {
            EnginePhase::Initializing => "initializing",
            EnginePhase::Stepping => "stepping",
            EnginePhase::Terminated => "terminated",
            EnginePhase::Failed => "failed",
        }
    }
}

impl std::fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A neighbor narrowed by propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Propagation {
    pub x: usize,
    pub y: usize,
    pub from: u32,
    pub to: u32,
}

/// What happened during one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// 1-based step index
    pub step: u64,

    /// The selected cell as it was before collapsing
    pub selected: Cell,

    /// Value the selected cell collapsed to
    pub collapsed_to: u32,

    /// Neighbors whose entropy was narrowed
    pub propagations: Vec<Propagation>,

    /// Positive neighbors left untouched because `[collapsed_to + 1, value - 1]` was empty
    pub skipped: Vec<(usize, usize)>,

    /// Highest entropy after the step
    pub highest: u32,
}

/// Totals for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub size: usize,
    pub initial_value: u32,
    pub steps: u64,
    pub snapshots: u64,
    pub propagations: u64,
    pub skipped_propagations: u64,
    pub collapsed: bool,
}

/// Orchestrates a collapse run over an owned grid.
///
/// The random source and the snapshot sink are injected so runs can be seeded
/// and their output captured by the caller.
pub struct CollapseEngine<R: RandomSource, S: SnapshotSink> {
    config: CollapseConfig,
    grid: Grid,
    rng: R,
    sink: S,
    phase: EnginePhase,
    selection: Option<Selection>,
    steps: u64,
    snapshots: u64,
    propagations: u64,
    skipped: u64,
}

impl<R: RandomSource, S: SnapshotSink> CollapseEngine<R, S> {
    /// Builds the grid for `config`.
    ///
    /// # Errors
    /// * `CollapseError::Configuration` - invalid grid size
    pub fn new(config: CollapseConfig, rng: R, sink: S) -> Result<Self, CollapseError> {
        config.validate()?;
        let grid = Grid::new(config.size, config.initial_value)?;

        Ok(Self {
            config,
            grid,
            rng,
            sink,
            phase: EnginePhase::Initializing,
            selection: None,
            steps: 0,
            snapshots: 0,
            propagations: 0,
            skipped: 0,
        })
    }

    /// Computes the initial selection and emits the initial snapshot.
    pub fn start(&mut self) -> Result<Selection, CollapseError> {
        if self.phase != EnginePhase::Initializing {
            return Err(CollapseError::Phase {
                expected: EnginePhase::Initializing.name(),
                actual: self.phase.name(),
            });
        }

        let result = self.initialize();
        if result.is_err() {
            self.phase = EnginePhase::Failed;
        }
        result
    }

    fn initialize(&mut self) -> Result<Selection, CollapseError> {
        info!(
            "Starting collapse: {}x{} grid at entropy {} (seed={})",
            self.config.size,
            self.config.size,
            self.config.initial_value,
            self.rng.seed()
        );

        let selection = EntropySelector::select(&self.grid, &mut self.rng)?;
        self.emit_snapshot()?;
        self.selection = Some(selection);
        self.phase = if selection.is_terminal() {
            EnginePhase::Terminated
        } else {
            EnginePhase::Stepping
        };

        Ok(selection)
    }

    /// Runs one step.
    ///
    /// # Returns
    /// * `Ok(Some(report))` - a step was applied
    /// * `Ok(None)` - the run is already terminated; nothing changed
    /// * `Err(_)` - the step was abandoned and the engine is now `Failed`
    pub fn step(&mut self) -> Result<Option<StepReport>, CollapseError> {
        match self.phase {
            EnginePhase::Initializing | EnginePhase::Failed => {
                return Err(CollapseError::Phase {
                    expected: EnginePhase::Stepping.name(),
                    actual: self.phase.name(),
                })
            }
            EnginePhase::Terminated => return Ok(None),
            EnginePhase::Stepping => {}
        }

        let result = self.advance();
        if result.is_err() {
            self.phase = EnginePhase::Failed;
        }
        result.map(Some)
    }

    fn advance(&mut self) -> Result<StepReport, CollapseError> {
        if let Some(max_steps) = self.config.max_steps {
            if self.steps >= max_steps {
                return Err(CollapseError::StepBudgetExceeded(max_steps));
            }
        }

        let target = self
            .selection
            .and_then(|s| s.lowest)
            .ok_or_else(|| {
                CollapseError::InvariantViolation("stepping without a selected cell".to_string())
            })?;

        // Re-read so the collapse always acts on the grid's current value.
        let selected = self.grid.get(target.x, target.y)?;
        let collapsed_to = self.collapse(selected)?;
        let (propagations, skipped) = self.propagate(selected.x, selected.y, collapsed_to)?;

        self.emit_snapshot()?;
        self.steps += 1;
        self.propagations += propagations.len() as u64;
        self.skipped += skipped.len() as u64;

        let selection = EntropySelector::select(&self.grid, &mut self.rng)?;
        self.selection = Some(selection);

        debug!(
            "step {}: ({}, {}) {} -> {}, {} propagated, {} skipped, highest={}",
            self.steps,
            selected.x,
            selected.y,
            selected.value,
            collapsed_to,
            propagations.len(),
            skipped.len(),
            selection.highest
        );

        if selection.is_terminal() {
            self.phase = EnginePhase::Terminated;
            info!("Grid collapsed after {} steps", self.steps);
        }

        Ok(StepReport {
            step: self.steps,
            selected,
            collapsed_to,
            propagations,
            skipped,
            highest: selection.highest,
        })
    }

    /// Runs from the current phase to termination.
    pub fn run(&mut self) -> Result<RunSummary, CollapseError> {
        if self.phase == EnginePhase::Initializing {
            self.start()?;
        }
        while self.step()?.is_some() {}
        Ok(self.summary())
    }

    fn collapse(&mut self, cell: Cell) -> Result<u32, CollapseError> {
        if cell.value < 1 {
            return Ok(cell.value);
        }
        let value = self.rng.uniform_int(0, cell.value - 1)?;
        self.grid.set(cell.x, cell.y, value)?;
        Ok(value)
    }

    fn propagate(
        &mut self,
        x: usize,
        y: usize,
        collapsed: u32,
    ) -> Result<(Vec<Propagation>, Vec<(usize, usize)>), CollapseError> {
        let neighbors: Vec<(usize, usize)> = self.grid.neighbors(x, y).collect();
        let mut applied = Vec::with_capacity(neighbors.len());
        let mut skipped = Vec::new();

        for (nx, ny) in neighbors {
            let current = self.grid.get(nx, ny)?.value;
            if current == 0 {
                continue;
            }

            let (min, max) = (collapsed + 1, current - 1);
            if min > max {
                skipped.push((nx, ny));
                continue;
            }

            let value = self.rng.uniform_int(min, max)?;
            self.grid.set(nx, ny, value)?;
            applied.push(Propagation { x: nx, y: ny, from: current, to: value });
        }

        Ok((applied, skipped))
    }

    fn emit_snapshot(&mut self) -> Result<(), CollapseError> {
        self.sink.append(&self.grid.snapshot())?;
        self.snapshots += 1;
        Ok(())
    }

    /// Returns the totals so far.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.rng.seed(),
            size: self.config.size,
            initial_value: self.config.initial_value,
            steps: self.steps,
            snapshots: self.snapshots,
            propagations: self.propagations,
            skipped_propagations: self.skipped,
            collapsed: self.phase == EnginePhase::Terminated,
        }
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &CollapseConfig {
        &self.config
    }

    /// The current selection (None before `start`).
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }

    /// Consumes the engine, returning the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collapse_env::{EnvError, MemorySink, Snapshot, StdRandom};
    use proptest::prelude::*;

    fn run_to_end(size: usize, initial: u32, seed: u64) -> (RunSummary, Vec<Snapshot>) {
        let config = CollapseConfig::new(size, initial);
        let mut engine =
            CollapseEngine::new(config, StdRandom::from_seed(seed), MemorySink::new()).unwrap();
        let summary = engine.run().unwrap();
        (summary, engine.into_sink().into_snapshots())
    }

    fn assert_non_increasing(snapshots: &[Snapshot]) {
        for pair in snapshots.windows(2) {
            for (before, after) in pair[0].values.iter().zip(&pair[1].values) {
                assert!(after <= before, "value rose from {} to {}", before, after);
            }
        }
    }

    #[test]
    fn test_two_by_two_scenario() {
        let (summary, snapshots) = run_to_end(2, 2, 42);

        assert_eq!(snapshots.first(), Some(&Snapshot::filled(2, 2)));
        assert_eq!(snapshots.last(), Some(&Snapshot::filled(2, 0)));
        assert_non_increasing(&snapshots);
        assert!(summary.collapsed);
        assert!(summary.steps <= 8);
    }

    #[test]
    fn test_single_cell_scenario() {
        let config = CollapseConfig::new(1, 5);
        let mut engine =
            CollapseEngine::new(config, StdRandom::from_seed(7), MemorySink::new()).unwrap();
        engine.start().unwrap();

        while let Some(report) = engine.step().unwrap() {
            assert!(report.propagations.is_empty());
            assert!(report.skipped.is_empty());
            assert!(report.collapsed_to < report.selected.value);
        }

        assert_eq!(engine.phase(), EnginePhase::Terminated);
        assert!(engine.grid().is_collapsed());
        assert!(engine.steps() >= 1 && engine.steps() <= 5);
    }

    #[test]
    fn test_snapshot_count_is_steps_plus_one() {
        let (summary, snapshots) = run_to_end(4, 6, 11);
        assert_eq!(snapshots.len() as u64, summary.steps + 1);
        assert_eq!(summary.snapshots, summary.steps + 1);
        assert!(snapshots.iter().all(|s| s.size == 4 && s.is_complete()));
    }

    #[test]
    fn test_default_grid_terminates_within_bound() {
        let config = CollapseConfig::default();
        let (summary, snapshots) = run_to_end(config.size, config.initial_value, 2024);

        assert!(summary.steps <= config.step_bound());
        assert!(snapshots.last().unwrap().is_collapsed());
        // Only the final snapshot is fully collapsed.
        assert!(snapshots[..snapshots.len() - 1].iter().all(|s| !s.is_collapsed()));
    }

    #[test]
    fn test_propagation_bound() {
        let config = CollapseConfig::new(5, 9);
        let mut engine =
            CollapseEngine::new(config, StdRandom::from_seed(5), MemorySink::new()).unwrap();
        engine.start().unwrap();

        while let Some(report) = engine.step().unwrap() {
            for p in &report.propagations {
                assert!(report.collapsed_to < p.to, "{:?} vs {}", p, report.collapsed_to);
                assert!(p.to < p.from, "{:?}", p);
            }
            for &(x, y) in &report.skipped {
                let value = engine.grid().get(x, y).unwrap().value;
                assert!(value <= report.collapsed_to + 1);
            }
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let (_, a) = run_to_end(6, 9, 99);
        let (_, b) = run_to_end(6, 9, 99);
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_initial_value_terminates_immediately() {
        let (summary, snapshots) = run_to_end(3, 0, 1);
        assert_eq!(summary.steps, 0);
        assert_eq!(snapshots, vec![Snapshot::filled(3, 0)]);
    }

    #[test]
    fn test_zero_size_rejected_before_stepping() {
        let result = CollapseEngine::new(
            CollapseConfig::new(0, 9),
            StdRandom::from_seed(1),
            MemorySink::new(),
        );
        assert!(matches!(result, Err(CollapseError::Configuration(_))));
    }

    #[test]
    fn test_step_before_start() {
        let mut engine = CollapseEngine::new(
            CollapseConfig::new(2, 2),
            StdRandom::from_seed(1),
            MemorySink::new(),
        )
        .unwrap();
        assert!(matches!(engine.step(), Err(CollapseError::Phase { .. })));
    }

    #[test]
    fn test_start_twice() {
        let mut engine = CollapseEngine::new(
            CollapseConfig::new(2, 2),
            StdRandom::from_seed(1),
            MemorySink::new(),
        )
        .unwrap();
        engine.start().unwrap();
        assert!(matches!(engine.start(), Err(CollapseError::Phase { .. })));
    }

    #[test]
    fn test_terminated_is_final() {
        let mut engine = CollapseEngine::new(
            CollapseConfig::new(2, 2),
            StdRandom::from_seed(3),
            MemorySink::new(),
        )
        .unwrap();
        let summary = engine.run().unwrap();

        assert_eq!(engine.step().unwrap(), None);
        assert_eq!(engine.summary(), summary);
        assert_eq!(engine.sink().len() as u64, summary.snapshots);
    }

    #[test]
    fn test_step_budget() {
        let config = CollapseConfig::new(9, 9).with_max_steps(3);
        let mut engine =
            CollapseEngine::new(config, StdRandom::from_seed(8), MemorySink::new()).unwrap();

        assert!(matches!(engine.run(), Err(CollapseError::StepBudgetExceeded(3))));
        assert_eq!(engine.steps(), 3);
        assert_eq!(engine.sink().len(), 4);
    }

    struct FailAfter {
        remaining: usize,
    }

    impl SnapshotSink for FailAfter {
        fn append(&mut self, _snapshot: &Snapshot) -> Result<(), EnvError> {
            if self.remaining == 0 {
                return Err(EnvError::sink("disk full"));
            }
            self.remaining -= 1;
            Ok(())
        }
    }

    #[test]
    fn test_sink_failure_aborts_run() {
        let mut engine = CollapseEngine::new(
            CollapseConfig::new(3, 9),
            StdRandom::from_seed(4),
            FailAfter { remaining: 2 },
        )
        .unwrap();

        assert!(matches!(engine.run(), Err(CollapseError::Sink(_))));
        assert_eq!(engine.summary().snapshots, 2);
    }

    /// Rejects exactly one append (the `fail_at`-th, 0-based), accepts the rest.
    struct FailOnce {
        calls: usize,
        fail_at: usize,
        accepted: usize,
    }

    impl SnapshotSink for FailOnce {
        fn append(&mut self, _snapshot: &Snapshot) -> Result<(), EnvError> {
            let call = self.calls;
            self.calls += 1;
            if call == self.fail_at {
                return Err(EnvError::sink("transient write failure"));
            }
            self.accepted += 1;
            Ok(())
        }
    }

    #[test]
    fn test_failed_step_is_final() {
        let sink = FailOnce { calls: 0, fail_at: 2, accepted: 0 };
        let mut engine =
            CollapseEngine::new(CollapseConfig::new(3, 9), StdRandom::from_seed(0), sink).unwrap();
        engine.start().unwrap();
        engine.step().unwrap();

        assert!(matches!(engine.step(), Err(CollapseError::Sink(_))));
        assert_eq!(engine.phase(), EnginePhase::Failed);

        // The sink would accept again, but the engine must not resume.
        let grid_before = engine.grid().clone();
        assert!(matches!(engine.step(), Err(CollapseError::Phase { actual: "failed", .. })));
        assert!(matches!(engine.run(), Err(CollapseError::Phase { .. })));
        assert_eq!(engine.grid(), &grid_before);
        assert_eq!(engine.steps(), 1);
        assert_eq!(engine.sink().accepted, 2);

        let summary = engine.summary();
        assert!(!summary.collapsed);
        assert_eq!(summary.snapshots, 2);
    }

    #[test]
    fn test_failed_start_is_final() {
        let sink = FailOnce { calls: 0, fail_at: 0, accepted: 0 };
        let mut engine =
            CollapseEngine::new(CollapseConfig::new(2, 2), StdRandom::from_seed(0), sink).unwrap();

        assert!(matches!(engine.start(), Err(CollapseError::Sink(_))));
        assert_eq!(engine.phase(), EnginePhase::Failed);
        assert!(matches!(engine.start(), Err(CollapseError::Phase { .. })));
        assert!(matches!(engine.step(), Err(CollapseError::Phase { .. })));
    }

    /// Serves `uniform_int` from a fixed script and leaves shuffles as the
    /// identity permutation.
    struct Scripted {
        values: std::collections::VecDeque<u32>,
        uniform_calls: usize,
    }

    impl Scripted {
        fn new(values: &[u32]) -> Self {
            Self { values: values.iter().copied().collect(), uniform_calls: 0 }
        }
    }

    impl RandomSource for Scripted {
        fn uniform_int(&mut self, min: u32, max: u32) -> Result<u32, EnvError> {
            if min > max {
                return Err(EnvError::invalid_range(min, max));
            }
            self.uniform_calls += 1;
            let value = self.values.pop_front().expect("script exhausted");
            assert!((min..=max).contains(&value), "{} outside [{}, {}]", value, min, max);
            Ok(value)
        }

        fn shuffle<T>(&mut self, _items: &mut [T]) {}

        fn seed(&self) -> u64 {
            0
        }
    }

    #[test]
    fn test_neighbor_one_above_collapsed_is_skipped() {
        // Uniform 2x2 @ 2: identity shuffle selects (0, 0), which collapses to 1.
        // Both neighbors hold 2 == collapsed + 1, so [2, 1] is empty for each.
        let mut engine =
            CollapseEngine::new(CollapseConfig::new(2, 2), Scripted::new(&[1]), MemorySink::new())
                .unwrap();
        engine.start().unwrap();

        let report = engine.step().unwrap().unwrap();
        assert_eq!((report.selected.x, report.selected.y), (0, 0));
        assert_eq!(report.collapsed_to, 1);
        assert!(report.propagations.is_empty());
        assert_eq!(report.skipped, vec![(1, 0), (0, 1)]);

        assert_eq!(engine.rng().uniform_calls, 1);
        assert_eq!(engine.grid().get(1, 0).unwrap().value, 2);
        assert_eq!(engine.grid().get(0, 1).unwrap().value, 2);
        assert_eq!(engine.summary().skipped_propagations, 2);
        assert_eq!(engine.sink().last(), Some(&Snapshot::new(2, vec![1, 2, 2, 2])));
    }

    #[test]
    fn test_neighbor_two_above_collapsed_is_narrowed() {
        // 2x2 @ 3: (0, 0) collapses to 1; each neighbor at 3 has the range [2, 2].
        let mut engine = CollapseEngine::new(
            CollapseConfig::new(2, 3),
            Scripted::new(&[1, 2, 2]),
            MemorySink::new(),
        )
        .unwrap();
        engine.start().unwrap();

        let report = engine.step().unwrap().unwrap();
        assert!(report.skipped.is_empty());
        assert_eq!(
            report.propagations,
            vec![
                Propagation { x: 1, y: 0, from: 3, to: 2 },
                Propagation { x: 0, y: 1, from: 3, to: 2 },
            ]
        );
        assert_eq!(engine.rng().uniform_calls, 3);
    }

    proptest! {
        #[test]
        fn prop_run_collapses_monotonically(size in 1usize..6, initial in 0u32..12, seed in any::<u64>()) {
            let (summary, snapshots) = run_to_end(size, initial, seed);
            let bound = CollapseConfig::new(size, initial).step_bound();

            prop_assert!(summary.collapsed);
            prop_assert!(summary.steps <= bound);
            prop_assert_eq!(snapshots.len() as u64, summary.steps + 1);
            prop_assert!(snapshots.last().unwrap().is_collapsed());

            for pair in snapshots.windows(2) {
                for (before, after) in pair[0].values.iter().zip(&pair[1].values) {
                    prop_assert!(after <= before);
                    prop_assert!(*before <= initial);
                }
            }
        }
    }
}
