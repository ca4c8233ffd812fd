//! Batch scenario runner.
//!
//! Plays every scenario file in a directory in parallel using rayon and
//! collects the outcomes into one report.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::scenario::{Scenario, ScenarioOutcome};

/// File extension of scenario files.
pub const SCENARIO_EXTENSION: &str = "ron";

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Directory to scan for scenario files
    pub dir: PathBuf,
    /// Maximum parallel scenarios (0 = use rayon default)
    pub parallel: usize,
}

impl BatchConfig {
    /// Create config for a scenario directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            parallel: 0,
        }
    }

    /// Limit the number of worker threads
    #[must_use]
    pub const fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Error during batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Scenario file
    pub path: String,
    /// Error message
    pub message: String,
}

/// Aggregate numbers over a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Scenario files found
    pub total: usize,
    /// Scenarios that ran to the end
    pub completed: usize,
    /// Scenarios that failed to load or run
    pub failed: usize,
    /// Scripted actions rejected across all completed scenarios
    pub rejected_actions: usize,
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Outcomes of the scenarios that completed, in file name order
    pub outcomes: Vec<ScenarioOutcome>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// List the scenario files in a directory, sorted by name.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn discover_scenarios(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == SCENARIO_EXTENSION) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn run_one(path: &Path) -> Result<ScenarioOutcome, BatchError> {
    Scenario::load(path)
        .and_then(|scenario| scenario.run())
        .map_err(|e| BatchError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Run every scenario in the configured directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or the thread pool
/// cannot be built. Individual scenario failures are reported in
/// [`BatchResults::errors`].
pub fn run_batch(config: BatchConfig) -> std::io::Result<BatchResults> {
    let start = Instant::now();
    let paths = discover_scenarios(&config.dir)?;
    let completed = AtomicUsize::new(0);

    info!(
        "Starting batch run: {} scenarios in {}",
        paths.len(),
        config.dir.display()
    );

    let play = || -> Vec<Result<ScenarioOutcome, BatchError>> {
        paths
            .par_iter()
            .map(|path| {
                let result = run_one(path);
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                match &result {
                    Ok(_) => debug!("Progress: {}/{}", done, paths.len()),
                    Err(e) => warn!("Scenario {} failed: {}", e.path, e.message),
                }
                result
            })
            .collect()
    };

    let results = if config.parallel > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel)
            .build()
            .map_err(std::io::Error::other)?
            .install(play)
    } else {
        play()
    };

    let (outcomes, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let outcomes: Vec<ScenarioOutcome> = outcomes.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary {
        total: paths.len(),
        completed: outcomes.len(),
        failed: errors.len(),
        rejected_actions: outcomes.iter().map(|o| o.rejected.len()).sum(),
    };
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} of {} scenarios in {:.2}s",
        summary.completed, summary.total, duration_seconds
    );

    Ok(BatchResults {
        config,
        outcomes,
        summary,
        duration_seconds,
        errors,
    })
}
