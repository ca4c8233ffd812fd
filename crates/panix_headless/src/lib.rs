//! Headless game runner for scripted play and CI verification.
//!
//! This crate drives a [`panix_core::game::Game`] without any UI:
//!
//! - **Interactive**: JSON commands on stdin, responses on stdout
//! - **Scenarios**: RON files with a timed action script, played to the end
//! - **Batches**: every scenario in a directory, in parallel
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from the controller (tick, craft, deploy, etc.)
//! - **stdout**: State updates and responses (JSON)
//! - **stderr**: Debug logs (human-readable)
//!
//! See [`protocol`] module for the full command/response specification.
//!
//! # Example
//!
//! ```bash
//! # Run interactively
//! echo '{"cmd":"tick","ms":1000,"count":60}' | cargo run -p panix_headless -- run
//!
//! # Play a scenario
//! cargo run -p panix_headless -- simulate --scenario scenarios/first_drone.ron
//!
//! # Play every scenario in a directory
//! cargo run -p panix_headless -- batch --dir scenarios
//! ```

pub mod batch;
pub mod protocol;
pub mod runner;
pub mod scenario;

pub use batch::{run_batch, BatchConfig, BatchResults, BatchSummary};
pub use protocol::{Command, GameSnapshot, Response};
pub use runner::{HeadlessConfig, HeadlessRunner};
pub use scenario::{Scenario, ScenarioError, ScenarioOutcome, TimedAction};
