//! Collapse Simulator CLI
//!
//! Run entropy collapse scenarios from a seed, appending every snapshot to a
//! text log and optionally exporting the run as JSON.

use clap::Parser;
use collapse_core::CollapseConfig;
use collapse_sim::{ScenarioId, ScenarioResult, ScenarioRunner};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Entropy collapse simulation CLI
#[derive(Parser, Debug)]
#[command(name = "collapse-sim")]
#[command(about = "Run deterministic grid entropy collapse simulations", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of consecutive seeds to run
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
    seeds: u64,

    /// Scenario to run (classic, tiny, single, wide, deep, all)
    #[arg(short = 'S', long, default_value = "classic")]
    scenario: String,

    /// Grid side length (overrides the scenario)
    #[arg(long)]
    size: Option<usize>,

    /// Initial per-cell entropy (overrides the scenario)
    #[arg(long)]
    initial: Option<u32>,

    /// Text log the snapshots are appended to
    #[arg(short, long, default_value = "output.txt")]
    output: PathBuf,

    /// Do not write the text log
    #[arg(long)]
    no_output: bool,

    /// Export the run to a JSON file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Abort a run after this many steps
    #[arg(long)]
    max_steps: Option<u64>,

    /// Verbose output (per-step logging)
    #[arg(short, long)]
    verbose: bool,

    /// JSON summary on stdout for CI parsing
    #[arg(long)]
    json: bool,
}

/// A run to perform: a preset or a custom configuration.
enum Plan {
    Preset(ScenarioId),
    Custom(CollapseConfig),
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if !args.json {
        info!("Collapse Simulator v{}", env!("CARGO_PKG_VERSION"));
    }

    // Parse plan
    let plans: Vec<Plan> = if args.size.is_some() || args.initial.is_some() {
        let base = args
            .scenario
            .parse::<ScenarioId>()
            .map(|s| s.config())
            .unwrap_or_default();
        let mut config = base;
        if let Some(size) = args.size {
            config = config.with_size(size);
        }
        if let Some(initial) = args.initial {
            config = config.with_initial_value(initial);
        }
        vec![Plan::Custom(config)]
    } else if args.scenario == "all" {
        ScenarioId::all().into_iter().map(Plan::Preset).collect()
    } else {
        match args.scenario.parse() {
            Ok(scenario) => vec![Plan::Preset(scenario)],
            Err(e) => {
                error!("{}", e);
                error!("Available scenarios: classic, tiny, single, wide, deep, all");
                std::process::exit(1);
            }
        }
    };

    if args.export.is_some() && (plans.len() > 1 || args.seeds > 1) {
        error!("--export only supports a single scenario and seed");
        std::process::exit(1);
    }

    // Determine base seed
    let base_seed = if args.seed == 0 {
        rand::random::<u64>()
    } else {
        args.seed
    };

    // Run simulations
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset);

        let mut runner = ScenarioRunner::new(seed);
        if !args.no_output {
            runner = runner.with_output(&args.output);
        }
        if let Some(path) = &args.export {
            runner = runner.with_export(path);
        }
        if let Some(max_steps) = args.max_steps {
            runner = runner.with_max_steps(max_steps);
        }

        for plan in &plans {
            let result = match plan {
                Plan::Preset(scenario) => runner.run(*scenario),
                Plan::Custom(config) => runner.run_config("custom", *config),
            };

            if !args.json {
                if result.passed {
                    info!(
                        "✓ {} (seed={}) collapsed in {} steps ({} propagations, {} skipped)",
                        result.scenario,
                        seed,
                        result.summary.steps,
                        result.summary.propagations,
                        result.summary.skipped_propagations
                    );
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        result.scenario,
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();
    let failed_count = all_results.iter().filter(|r| !r.passed).count();

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed_count,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario,
                    "seed": r.seed,
                    "passed": r.passed,
                    "steps": r.summary.steps,
                    "snapshots": r.summary.snapshots,
                    "propagations": r.summary.propagations,
                    "skipped_propagations": r.summary.skipped_propagations,
                    "draws": r.draws,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to render summary: {}", e),
        }
    } else if failed_count == 0 {
        info!("All {} runs passed", total);
    } else {
        error!("{}/{} runs failed", failed_count, total);
        for result in all_results.iter().filter(|r| !r.passed) {
            error!(
                "  - {} seed={}: {}",
                result.scenario,
                result.seed,
                result.failure_reason.as_deref().unwrap_or("unknown")
            );
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
