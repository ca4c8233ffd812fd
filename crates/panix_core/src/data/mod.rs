//! Data structures for game content configuration.
//!
//! This module contains pure data structures that define resources, tile
//! types, recipes, structures, the map layout and balance constants. All
//! structs are designed to be deserialized from RON files.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! Loading and override resolution live in [`crate::config`].

mod balance_data;
mod map_data;
mod recipe_data;
mod resource_data;
mod structure_data;

pub use balance_data::{BalanceData, DroneBalance, GameLoopBalance, ResourceBalance};
pub use map_data::{MapData, EMPTY_CELL, START_CELL};
pub use recipe_data::{
    cost_of, ComponentCost, ComponentRecipe, DroneRecipe, ResourceCost,
    BASIC_GATHERER,
};
pub use resource_data::{ResourceData, TileTypeData};
pub use structure_data::{StructureData, ENERGY_PER_SECOND, PER_SECOND_SUFFIX, SOLAR_PANEL};
