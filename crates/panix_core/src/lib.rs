//! # Panix Core
//!
//! Game state core for Panix Incremental, a hex-grid idle game.
//!
//! This crate contains **only** game state and rules:
//! - No rendering
//! - No UI
//! - No clock (time enters only as tick deltas)
//!
//! IO is limited to explicit load/save entry points for config, settings
//! and save files.
//!
//! ## Crate Structure
//!
//! - [`hex`] - Axial coordinates and hex math
//! - [`grid`] - The tile map and drone occupancy
//! - [`resources`] - Resource ledger and generation
//! - [`crafting`] - Component crafting
//! - [`drones`] - Drone assembly and deployment
//! - [`structures`] - Structure placement
//! - [`game`] - Context object wiring the managers together
//! - [`action`] - Player actions as replayable data
//! - [`config`] / [`data`] - Content definitions and overrides
//! - [`save`] - Versioned save files

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod action;
pub mod config;
pub mod crafting;
pub mod data;
pub mod drones;
pub mod error;
pub mod events;
pub mod game;
pub mod grid;
pub mod hex;
pub mod resources;
pub mod save;
pub mod settings;
pub mod structures;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::action::Action;
    pub use crate::config::{ConfigManager, ConfigOverrides, GameConfig, ValidationReport};
    pub use crate::crafting::CraftingManager;
    pub use crate::data::{cost_of, ComponentCost, ResourceCost, BASIC_GATHERER, SOLAR_PANEL};
    pub use crate::drones::{Deployment, DroneManager};
    pub use crate::error::{ActionError, ActionResult, GameError, Result};
    pub use crate::events::{EventBus, EventKind, GameEvent};
    pub use crate::game::Game;
    pub use crate::grid::{HexGrid, Tile, TileType};
    pub use crate::hex::HexCoord;
    pub use crate::resources::ResourceManager;
    pub use crate::save::{SaveData, SaveInfo};
    pub use crate::settings::{NumberFormat, SettingsManager};
    pub use crate::structures::{StructureManager, StructureRecord};
}
