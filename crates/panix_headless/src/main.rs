//! Headless Panix game runner.
//!
//! This binary runs the game without a UI, controlled via JSON on stdin/stdout
//! or by RON scenario files. Designed for scripted play and CI testing.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p panix_headless
//!
//! # Interactive, starting from a scenario's content and resources
//! cargo run -p panix_headless -- run --scenario scenarios/first_drone.ron
//!
//! # Play a scenario to the end and print the final state
//! cargo run -p panix_headless -- simulate --scenario scenarios/first_drone.ron
//!
//! # Play every scenario in a directory
//! cargo run -p panix_headless -- batch --dir scenarios --output results/batch.json
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information
//!
//! See the protocol module for command/response format.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use panix_core::game::Game;
use panix_headless::{
    batch::{run_batch, BatchConfig},
    runner::{HeadlessConfig, HeadlessRunner},
    scenario::Scenario,
};

#[derive(Parser)]
#[command(name = "panix_headless")]
#[command(about = "Headless Panix game runner for scripted play and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive JSON-lines session
    Run {
        /// Scenario file providing content and starting resources
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Output state after every tick
        #[arg(long)]
        auto_state: bool,
    },

    /// Play a scenario to the end and print the final state as JSON
    Simulate {
        /// Scenario file to play
        #[arg(short, long)]
        scenario: PathBuf,
    },

    /// Play every scenario in a directory in parallel
    Batch {
        /// Directory of scenario files
        #[arg(short, long)]
        dir: PathBuf,

        /// Maximum parallel scenarios (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: usize,

        /// Also write the full results as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Some(Commands::Run {
            scenario,
            auto_state,
        }) => cmd_run(scenario, auto_state),
        Some(Commands::Simulate { scenario }) => cmd_simulate(scenario),
        Some(Commands::Batch {
            dir,
            parallel,
            output,
        }) => cmd_batch(dir, parallel, output),
        // Default: interactive mode
        None => cmd_run(None, false),
    };

    match result {
        Ok(code) => code,
        Err(message) => {
            tracing::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

/// Run an interactive session
fn cmd_run(scenario: Option<PathBuf>, auto_state: bool) -> Result<ExitCode, String> {
    let game = match scenario {
        Some(path) => {
            let scenario = Scenario::load(&path).map_err(|e| e.to_string())?;
            tracing::info!("Starting interactive session from '{}'", scenario.name);
            scenario.build_game().map_err(|e| e.to_string())?
        }
        None => {
            tracing::info!("Starting interactive session");
            Game::default()
        }
    };

    let config = HeadlessConfig {
        auto_state_output: auto_state,
    };
    HeadlessRunner::with_game(game, config)
        .run()
        .map_err(|e| format!("Output error: {e}"))?;
    Ok(ExitCode::SUCCESS)
}

/// Play one scenario
fn cmd_simulate(path: PathBuf) -> Result<ExitCode, String> {
    let scenario = Scenario::load(&path).map_err(|e| e.to_string())?;
    let outcome = scenario.run().map_err(|e| e.to_string())?;

    for rejected in &outcome.rejected {
        tracing::warn!(
            "{} at {}ms rejected: {}",
            rejected.action,
            rejected.at_ms,
            rejected.message
        );
    }

    let json = serde_json::to_string_pretty(&outcome).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}

/// Play a directory of scenarios
fn cmd_batch(dir: PathBuf, parallel: usize, output: Option<PathBuf>) -> Result<ExitCode, String> {
    let config = BatchConfig::new(dir).with_parallel(parallel);
    let results = run_batch(config).map_err(|e| format!("Batch failed: {e}"))?;

    if let Some(path) = output {
        results
            .save(&path)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        tracing::info!("Results written to {}", path.display());
    }

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH RESULTS");
    eprintln!("{}", "=".repeat(50));
    for outcome in &results.outcomes {
        eprintln!(
            "{:<30} ticks={:<6} rejected={:<3} hash={:016x}",
            outcome.name,
            outcome.final_state.tick,
            outcome.rejected.len(),
            outcome.final_state.hash
        );
    }
    for error in &results.errors {
        eprintln!("FAILED {}: {}", error.path, error.message);
    }
    eprintln!(
        "Completed: {}/{} in {:.2}s",
        results.summary.completed, results.summary.total, results.duration_seconds
    );

    let summary = serde_json::to_string(&results.summary).map_err(|e| e.to_string())?;
    println!("{summary}");

    Ok(if results.summary.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
