//! Component and drone recipes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Resource id -> whole units required.
pub type ResourceCost = BTreeMap<String, u64>;

/// Component id -> count required.
pub type ComponentCost = BTreeMap<String, u32>;

/// Build a cost map from `(id, amount)` pairs.
#[must_use]
pub fn cost_of<V: Copy>(entries: &[(&str, V)]) -> BTreeMap<String, V> {
    entries
        .iter()
        .map(|(id, amount)| ((*id).to_string(), *amount))
        .collect()
}

/// Recipe crafting a component from resources.
///
/// # Example RON
///
/// ```ron
/// ComponentRecipe(
///     id: "chassis",
///     name: "Drone Chassis",
///     description: "Basic frame for all drones",
///     cost: {"iron": 50, "silicon": 0, "energy": 0},
///     craft_time: 0,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecipe {
    /// Component identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display description.
    #[serde(default)]
    pub description: String,
    /// Resources deducted per craft.
    pub cost: ResourceCost,
    /// Crafting time in milliseconds. Crafting is instant when zero.
    #[serde(default)]
    pub craft_time: u64,
}

/// Recipe assembling a drone from components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneRecipe {
    /// Drone type identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display description.
    #[serde(default)]
    pub description: String,
    /// Components consumed per drone.
    pub components: ComponentCost,
    /// Build time in milliseconds. Building is instant when zero.
    #[serde(default)]
    pub build_time: u64,
}

/// Default drone type deployed by the player.
pub const BASIC_GATHERER: &str = "basicGatherer";

impl ComponentRecipe {
    /// Built-in component recipes: chassis, circuit, power core.
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        vec![
            Self {
                id: "chassis".to_string(),
                name: "Drone Chassis".to_string(),
                description: "Basic frame for all drones".to_string(),
                cost: cost_of(&[("iron", 50), ("silicon", 0), ("energy", 0)]),
                craft_time: 0,
            },
            Self {
                id: "circuit".to_string(),
                name: "Basic Circuit".to_string(),
                description: "Electronic control system".to_string(),
                cost: cost_of(&[("iron", 10), ("silicon", 30), ("energy", 0)]),
                craft_time: 0,
            },
            Self {
                id: "powerCore".to_string(),
                name: "Power Core".to_string(),
                description: "Energy storage and distribution".to_string(),
                cost: cost_of(&[("iron", 0), ("silicon", 20), ("energy", 20)]),
                craft_time: 0,
            },
        ]
    }
}

impl DroneRecipe {
    /// Built-in drone recipes.
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        vec![Self {
            id: BASIC_GATHERER.to_string(),
            name: "Basic Gathering Drone".to_string(),
            description: "Automated resource collector".to_string(),
            components: cost_of(&[("chassis", 1), ("circuit", 1), ("powerCore", 1)]),
            build_time: 0,
        }]
    }
}
