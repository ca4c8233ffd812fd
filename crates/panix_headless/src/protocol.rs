//! JSON protocol for headless game communication.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the controller
//! **Output (stdout):** Game state updates and responses
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0","tick":0}`
//! 2. Controller sends commands as JSON lines
//! 3. Runner answers every command with `ack`, `error` or `state`, preceded by
//!    any `event` lines the command produced
//! 4. On `quit` (or end of input) the runner outputs `{"type":"bye",...}`
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","tick":0}
//! -> {"cmd":"add_resource","resource":"iron","amount":100}
//! <- {"type":"ack","cmd":"add_resource"}
//! -> {"cmd":"craft","component":"chassis"}
//! <- {"type":"ack","cmd":"craft"}
//! -> {"cmd":"deploy","q":3,"r":1}
//! <- {"type":"error","message":"No drones available","cmd":"deploy"}
//! -> {"cmd":"tick","ms":1000,"count":5}
//! <- {"type":"ack","cmd":"tick"}
//! -> {"cmd":"query"}
//! <- {"type":"state","tick":5,"elapsed_ms":5000.0,...}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use panix_core::action::Action;
use panix_core::events::GameEvent;
use panix_core::game::Game;

/// Protocol version announced in `ready`.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (controller -> runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance the game `count` times by `ms` each. Without `ms` each tick
    /// is one frame at the configured target rate.
    Tick {
        #[serde(default)]
        ms: Option<f64>,
        #[serde(default = "default_tick_count")]
        count: u32,
    },

    /// Query current game state without advancing time.
    Query,

    /// Craft one component.
    Craft { component: String },

    /// Assemble one drone.
    BuildDrone { drone_type: String },

    /// Deploy an available drone.
    Deploy { q: i32, r: i32 },

    /// Recall a drone.
    Remove { q: i32, r: i32 },

    /// Place a structure.
    BuildStructure {
        structure_type: String,
        q: i32,
        r: i32,
    },

    /// Remove a structure.
    Demolish { q: i32, r: i32 },

    /// Grant resources.
    AddResource { resource: String, amount: f64 },

    /// Write a save file. `.json` paths are written as JSON, others as bincode.
    Save { path: String },

    /// Restore from a save file.
    Load { path: String },

    /// Start over from the starting state.
    Reset,

    /// Quit the runner.
    Quit,
}

const fn default_tick_count() -> u32 {
    1
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Query => "query",
            Self::Craft { .. } => "craft",
            Self::BuildDrone { .. } => "build_drone",
            Self::Deploy { .. } => "deploy",
            Self::Remove { .. } => "remove",
            Self::BuildStructure { .. } => "build_structure",
            Self::Demolish { .. } => "demolish",
            Self::AddResource { .. } => "add_resource",
            Self::Save { .. } => "save",
            Self::Load { .. } => "load",
            Self::Reset => "reset",
            Self::Quit => "quit",
        }
    }

    /// The game action this command maps to, if it is a plain action.
    ///
    /// `tick` is excluded since it repeats; session commands have no action.
    #[must_use]
    pub fn to_action(&self) -> Option<Action> {
        match self {
            Self::Craft { component } => Some(Action::Craft {
                component: component.clone(),
            }),
            Self::BuildDrone { drone_type } => Some(Action::BuildDrone {
                drone_type: drone_type.clone(),
            }),
            Self::Deploy { q, r } => Some(Action::Deploy { q: *q, r: *r }),
            Self::Remove { q, r } => Some(Action::Remove { q: *q, r: *r }),
            Self::BuildStructure {
                structure_type,
                q,
                r,
            } => Some(Action::BuildStructure {
                structure_type: structure_type.clone(),
                q: *q,
                r: *r,
            }),
            Self::Demolish { q, r } => Some(Action::Demolish { q: *q, r: *r }),
            Self::AddResource { resource, amount } => Some(Action::AddResource {
                resource: resource.clone(),
                amount: *amount,
            }),
            Self::Tick { .. }
            | Self::Query
            | Self::Save { .. }
            | Self::Load { .. }
            | Self::Reset
            | Self::Quit => None,
        }
    }
}

// ============================================================================
// Output Responses (runner -> controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready { version: String, tick: u64 },

    /// Acknowledgment of a command.
    Ack { cmd: String },

    /// Error processing a command.
    Error {
        message: String,
        cmd: Option<String>,
    },

    /// Current game state.
    State(GameSnapshot),

    /// A game event produced by the last command.
    Event { event: GameEvent },

    /// Goodbye message before shutdown.
    Bye { tick: u64, hash: u64 },
}

// ============================================================================
// State Types
// ============================================================================

/// Serializable view of a running game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Ticks applied since start or reset.
    pub tick: u64,
    /// Simulated milliseconds since start or reset.
    pub elapsed_ms: f64,
    /// Whole resource amounts.
    pub resources: BTreeMap<String, u64>,
    /// Per-second generation rates from the last tick.
    pub rates: BTreeMap<String, f64>,
    /// Crafted components on hand.
    pub components: BTreeMap<String, u32>,
    /// Drone pool.
    pub drones: DroneState,
    /// Tiles that currently hold drones.
    pub tiles: Vec<TileState>,
    /// Placed structures.
    pub structures: Vec<StructureState>,
    /// Determinism hash of the full state.
    pub hash: u64,
}

/// Drone pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroneState {
    pub available: u32,
    pub deployed: u32,
    pub total_built: u64,
}

/// A tile with drones on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileState {
    pub q: i32,
    pub r: i32,
    pub tile_type: String,
    pub drones: u32,
    pub max_drones: u32,
}

/// A placed structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureState {
    pub q: i32,
    pub r: i32,
    pub structure_type: String,
}

impl GameSnapshot {
    /// Capture the observable state of a game.
    #[must_use]
    pub fn capture(game: &Game) -> Self {
        let tiles = game
            .grid()
            .tiles()
            .filter(|tile| tile.drones > 0)
            .map(|tile| TileState {
                q: tile.coord.q,
                r: tile.coord.r,
                tile_type: tile.tile_type.id().to_string(),
                drones: tile.drones,
                max_drones: tile.max_drones,
            })
            .collect();
        let structures = game
            .structures()
            .all_structures()
            .map(|record| StructureState {
                q: record.q,
                r: record.r,
                structure_type: record.structure_type.clone(),
            })
            .collect();

        Self {
            tick: game.tick_count(),
            elapsed_ms: game.elapsed_ms(),
            resources: game.resources().all_resources(),
            rates: game.resources().generation_rates().clone(),
            components: game.crafting().all_components().clone(),
            drones: DroneState {
                available: game.drones().available_drones(),
                deployed: game.grid().total_deployed(),
                total_built: game.drones().total_built(),
            },
            tiles,
            structures,
            hash: game.state_hash(),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    #[must_use]
    pub fn ready(tick: u64) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            tick,
        }
    }

    /// Create an acknowledgment.
    #[must_use]
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Create a state response for a game.
    #[must_use]
    pub fn state(game: &Game) -> Self {
        Self::State(GameSnapshot::capture(game))
    }

    /// Serialize to JSON line (with newline).
    #[must_use]
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tick_command() {
        let json = r#"{"cmd":"tick","ms":250,"count":60}"#;
        let cmd = Command::from_json(json).unwrap();
        assert_eq!(
            cmd,
            Command::Tick {
                ms: Some(250.0),
                count: 60
            }
        );
    }

    #[test]
    fn test_default_tick_fields() {
        let cmd = Command::from_json(r#"{"cmd":"tick"}"#).unwrap();
        assert_eq!(cmd, Command::Tick { ms: None, count: 1 });
    }

    #[test]
    fn test_parse_build_structure_command() {
        let json = r#"{"cmd":"build_structure","structure_type":"solarPanel","q":4,"r":0}"#;
        let cmd = Command::from_json(json).unwrap();
        assert_eq!(cmd.name(), "build_structure");
        assert_eq!(
            cmd.to_action(),
            Some(Action::BuildStructure {
                structure_type: "solarPanel".to_string(),
                q: 4,
                r: 0,
            })
        );
    }

    #[test]
    fn test_session_commands_have_no_action() {
        for json in [
            r#"{"cmd":"query"}"#,
            r#"{"cmd":"reset"}"#,
            r#"{"cmd":"quit"}"#,
            r#"{"cmd":"save","path":"a.json"}"#,
        ] {
            assert!(Command::from_json(json).unwrap().to_action().is_none());
        }
    }

    #[test]
    fn test_unknown_command_fails_to_parse() {
        assert!(Command::from_json(r#"{"cmd":"spawn"}"#).is_err());
        assert!(Command::from_json("not json").is_err());
    }

    #[test]
    fn test_serialize_state_response() {
        let game = Game::default();
        let json = Response::state(&game).to_json_line();
        assert!(json.ends_with('\n'));
        assert!(json.contains(r#""type":"state""#));
        assert!(json.contains(r#""tick":0"#));
        assert!(json.contains(r#""iron":"#));
    }

    #[test]
    fn test_error_response_shape() {
        let json = Response::error("Invalid tile", Some("deploy")).to_json_line();
        let value: serde_json::Value = serde_json::from_str(json.trim()).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["message"], "Invalid tile");
        assert_eq!(value["cmd"], "deploy");
    }

    #[test]
    fn test_event_response_round_trips() {
        let resp = Response::Event {
            event: GameEvent::SettingsUpdated {
                key: "playerName".to_string(),
            },
        };
        let line = resp.to_json_line();
        assert_eq!(serde_json::from_str::<Response>(line.trim()).unwrap(), resp);
    }
}
