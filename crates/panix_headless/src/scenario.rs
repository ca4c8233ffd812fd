//! Scenario loading and playback.
//!
//! A scenario fixes the content (built-in, a config file, inline overrides),
//! the starting resources and a timed action script, then plays the game
//! forward for a fixed duration in equal tick steps.
//!
//! # Example RON
//!
//! ```ron
//! (
//!     name: "First drone",
//!     initial_resources: {"iron": 60.0, "silicon": 50.0, "energy": 20.0},
//!     script: [
//!         (at_ms: 0, action: Craft(component: "chassis")),
//!         (at_ms: 0, action: Craft(component: "circuit")),
//!         (at_ms: 0, action: Craft(component: "powerCore")),
//!         (at_ms: 0, action: BuildDrone(drone_type: "basicGatherer")),
//!         (at_ms: 1000, action: Deploy(q: 1, r: 1)),
//!     ],
//!     duration_ms: 60000,
//! )
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use panix_core::action::Action;
use panix_core::config::{ConfigOverrides, GameConfig};
use panix_core::error::GameError;
use panix_core::game::Game;

use crate::protocol::GameSnapshot;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Referenced config could not be loaded or failed validation.
    #[error("Scenario config error: {0}")]
    Config(#[from] GameError),
    /// Scenario fields are out of range.
    #[error("Invalid scenario: {0}")]
    Invalid(String),
}

/// An action scheduled at a point of simulated time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedAction {
    /// Simulated milliseconds since start.
    pub at_ms: u64,
    /// What to do.
    pub action: Action,
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Full config file, relative to the scenario file. Built-in content if absent.
    #[serde(default)]
    pub config: Option<PathBuf>,
    /// Override layer applied on top of the config.
    #[serde(default)]
    pub overrides: Option<ConfigOverrides>,
    /// Resources granted before the first tick.
    #[serde(default)]
    pub initial_resources: BTreeMap<String, f64>,
    /// Actions to apply, in time order.
    #[serde(default)]
    pub script: Vec<TimedAction>,
    /// Total simulated time.
    pub duration_ms: u64,
    /// Tick step.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: f64,
}

const fn default_tick_ms() -> f64 {
    100.0
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "Idle".to_string(),
            description: "The starting base alone for one minute".to_string(),
            config: None,
            overrides: None,
            initial_resources: BTreeMap::new(),
            script: Vec::new(),
            duration_ms: 60_000,
            tick_ms: default_tick_ms(),
        }
    }
}

/// A scripted action the game rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedAction {
    /// When it was scheduled.
    pub at_ms: u64,
    /// Action name.
    pub action: String,
    /// Why it was rejected.
    pub message: String,
}

/// Result of playing a scenario to the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Scenario name.
    pub name: String,
    /// Scripted actions that succeeded.
    pub actions_applied: usize,
    /// Scripted actions that were rejected.
    pub rejected: Vec<RejectedAction>,
    /// Final state.
    pub final_state: GameSnapshot,
}

impl Scenario {
    /// Load a scenario from a RON file.
    ///
    /// A relative `config` path is resolved against the scenario's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let mut scenario = Self::from_ron_str(&contents)?;
        if let (Some(config), Some(dir)) = (&scenario.config, path.parent()) {
            if config.is_relative() {
                scenario.config = Some(dir.join(config));
            }
        }
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check timing fields: a positive tick length and no scripted action
    /// after the end of the run.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !(self.tick_ms > 0.0 && self.tick_ms.is_finite()) {
            return Err(ScenarioError::Invalid(format!(
                "tick_ms must be positive, got {}",
                self.tick_ms
            )));
        }
        if let Some(late) = self.script.iter().find(|timed| timed.at_ms > self.duration_ms) {
            return Err(ScenarioError::Invalid(format!(
                "{} at {}ms is past duration_ms {}",
                late.action.name(),
                late.at_ms,
                self.duration_ms
            )));
        }
        Ok(())
    }

    /// Resolve the scenario's content layers into a validated config.
    pub fn game_config(&self) -> Result<GameConfig, ScenarioError> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };
        if let Some(overrides) = &self.overrides {
            config = config.with_overrides(overrides.clone());
        }
        config.validate()?;
        Ok(config)
    }

    /// Build the starting game: content plus initial resources.
    pub fn build_game(&self) -> Result<Game, ScenarioError> {
        let mut game = Game::new(self.game_config()?);
        for (resource, amount) in &self.initial_resources {
            game.add_resource(resource, *amount);
        }
        Ok(game)
    }

    /// Play the scenario to the end.
    ///
    /// Before each tick, every scripted action due at or before the current
    /// time is applied in script order. Actions due exactly at the end run
    /// after the last tick.
    pub fn run(&self) -> Result<ScenarioOutcome, ScenarioError> {
        self.validate()?;

        let mut game = self.build_game()?;
        let mut script: Vec<&TimedAction> = self.script.iter().collect();
        script.sort_by_key(|timed| timed.at_ms);
        let mut pending = script.into_iter().peekable();

        let mut applied = 0;
        let mut rejected = Vec::new();
        let mut apply_due = |game: &mut Game, now_ms: f64| {
            while let Some(timed) = pending.next_if(|timed| timed.at_ms as f64 <= now_ms) {
                match game.apply(&timed.action, timed.at_ms) {
                    Ok(()) => applied += 1,
                    Err(e) => {
                        debug!(at_ms = timed.at_ms, action = timed.action.name(), "Rejected: {e}");
                        rejected.push(RejectedAction {
                            at_ms: timed.at_ms,
                            action: timed.action.name().to_string(),
                            message: e.to_string(),
                        });
                    }
                }
            }
        };

        let duration = self.duration_ms as f64;
        let mut now = 0.0;
        while now < duration {
            apply_due(&mut game, now);
            let step = self.tick_ms.min(duration - now);
            game.tick(step);
            now += step;
        }
        apply_due(&mut game, duration);

        info!(
            scenario = %self.name,
            ticks = game.tick_count(),
            applied,
            rejected = rejected.len(),
            "Scenario complete"
        );

        Ok(ScenarioOutcome {
            name: self.name.clone(),
            actions_applied: applied,
            rejected,
            final_state: GameSnapshot::capture(&game),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST_DRONE: &str = r#"(
        name: "First drone",
        initial_resources: {"iron": 60.0, "silicon": 50.0, "energy": 20.0},
        script: [
            (at_ms: 0, action: Craft(component: "chassis")),
            (at_ms: 0, action: Craft(component: "circuit")),
            (at_ms: 0, action: Craft(component: "powerCore")),
            (at_ms: 0, action: BuildDrone(drone_type: "basicGatherer")),
            (at_ms: 1000, action: Deploy(q: 1, r: 1)),
        ],
        duration_ms: 11000,
        tick_ms: 500.0,
    )"#;

    #[test]
    fn test_parse_scenario_defaults() {
        let scenario = Scenario::from_ron_str(r#"(name: "x", duration_ms: 10)"#).unwrap();
        assert!(scenario.script.is_empty());
        assert!(scenario.config.is_none());
        assert!((scenario.tick_ms - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_idle_scenario_mines_starting_iron() {
        let outcome = Scenario::default().run().unwrap();
        // 600 steps of 0.1 may land just under 60.
        assert!((59..=60).contains(&outcome.final_state.resources["iron"]));
        assert_eq!(outcome.final_state.tick, 600);
        assert_eq!(outcome.actions_applied, 0);
    }

    #[test]
    fn test_scripted_drone_mines_iron() {
        let outcome = Scenario::from_ron_str(FIRST_DRONE).unwrap().run().unwrap();
        assert_eq!(outcome.actions_applied, 5);
        assert!(outcome.rejected.is_empty());

        let state = &outcome.final_state;
        assert_eq!(state.drones.deployed, 1);
        // 11s of starting base plus 10s of one drone at 0.5/s.
        assert_eq!(state.resources["iron"], 16);
        assert_eq!(state.tiles.len(), 1);
        assert_eq!((state.tiles[0].q, state.tiles[0].r), (1, 1));
    }

    #[test]
    fn test_rejections_are_reported() {
        let scenario = Scenario::from_ron_str(
            r#"(
                name: "broke",
                script: [(at_ms: 0, action: Craft(component: "chassis"))],
                duration_ms: 100,
            )"#,
        )
        .unwrap();
        let outcome = scenario.run().unwrap();
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].message, "Insufficient resources");
    }

    #[test]
    fn test_runs_are_deterministic() {
        let scenario = Scenario::from_ron_str(FIRST_DRONE).unwrap();
        let a = scenario.run().unwrap();
        let b = scenario.run().unwrap();
        assert_eq!(a.final_state.hash, b.final_state.hash);
    }

    #[test]
    fn test_zero_tick_rejected() {
        let scenario = Scenario {
            tick_ms: 0.0,
            ..Scenario::default()
        };
        assert!(matches!(scenario.run(), Err(ScenarioError::Invalid(_))));
    }

    #[test]
    fn test_action_past_duration_rejected() {
        let err = Scenario::from_ron_str(
            r#"(
                name: "late",
                script: [(at_ms: 5000, action: AddResource(resource: "iron", amount: 1.0))],
                duration_ms: 1000,
            )"#,
        )
        .unwrap_err();
        assert!(matches!(err, ScenarioError::Invalid(_)));
        assert!(err.to_string().contains("5000ms"), "{err}");

        let scenario = Scenario {
            script: vec![TimedAction {
                at_ms: 60_001,
                action: Action::AddResource {
                    resource: "iron".to_string(),
                    amount: 1.0,
                },
            }],
            ..Scenario::default()
        };
        assert!(matches!(scenario.run(), Err(ScenarioError::Invalid(_))));
    }

    #[test]
    fn test_action_at_duration_still_runs() {
        let scenario = Scenario::from_ron_str(
            r#"(
                name: "edge",
                script: [(at_ms: 1000, action: AddResource(resource: "silicon", amount: 3.0))],
                duration_ms: 1000,
                tick_ms: 500.0,
            )"#,
        )
        .unwrap();
        let outcome = scenario.run().unwrap();
        assert_eq!(outcome.actions_applied, 1);
        assert_eq!(outcome.final_state.resources["silicon"], 3);
    }

    #[test]
    fn test_missing_file() {
        let err = Scenario::load("does/not/exist.ron").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }

    #[test]
    fn test_relative_config_path_resolved() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("content.ron"),
            GameConfig::default().to_ron_string().unwrap(),
        )
        .unwrap();
        let path = dir.path().join("s.ron");
        std::fs::write(&path, r#"(name: "c", config: Some("content.ron"), duration_ms: 1000, tick_ms: 500.0)"#)
            .unwrap();

        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.config, Some(dir.path().join("content.ron")));
        assert_eq!(scenario.run().unwrap().final_state.resources["iron"], 1);
    }

    #[test]
    fn test_inline_overrides_apply() {
        let scenario = Scenario::from_ron_str(
            r#"(
                name: "crystal",
                overrides: Some((
                    resources: {
                        "custom_crystal": (id: "custom_crystal", name: "Crystal", icon: "C"),
                    },
                )),
                initial_resources: {"custom_crystal": 5.0},
                duration_ms: 0,
            )"#,
        )
        .unwrap();
        let outcome = scenario.run().unwrap();
        assert_eq!(outcome.final_state.tick, 0);
        assert_eq!(outcome.final_state.resources["custom_crystal"], 5);
    }
}
