//! Structure definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::recipe_data::{cost_of, ResourceCost};

/// Stat key for passive energy output.
pub const ENERGY_PER_SECOND: &str = "energyPerSecond";

/// Suffix marking a per-second production stat (`"<resource>PerSecond"`).
pub const PER_SECOND_SUFFIX: &str = "PerSecond";

/// Built-in solar panel id.
pub const SOLAR_PANEL: &str = "solarPanel";

/// A structure the player can place on a tile.
///
/// # Example RON
///
/// ```ron
/// StructureData(
///     id: "solarPanel",
///     name: "structures.solarPanel.name",
///     description: "structures.solarPanel.description",
///     costs: {"iron": 10, "silicon": 5},
///     stats: {"energyPerSecond": 1.0},
///     buildable_on: ["empty"],
///     category: "energy",
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureData {
    /// Unique identifier.
    pub id: String,
    /// Localization key for the display name.
    pub name: String,
    /// Localization key for the description.
    #[serde(default)]
    pub description: String,
    /// Resources deducted on build.
    pub costs: ResourceCost,
    /// Per-second production values, copied into each placed record.
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
    /// Tile type ids this structure may occupy.
    pub buildable_on: Vec<String>,
    /// UI grouping.
    #[serde(default)]
    pub category: String,
    /// RGB display color.
    #[serde(default)]
    pub color: u32,
    /// Display glyph.
    #[serde(default)]
    pub icon: String,
}

impl StructureData {
    /// Built-in structures.
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        vec![Self {
            id: SOLAR_PANEL.to_string(),
            name: "structures.solarPanel.name".to_string(),
            description: "structures.solarPanel.description".to_string(),
            costs: cost_of(&[("iron", 10), ("silicon", 5)]),
            stats: cost_of(&[(ENERGY_PER_SECOND, 1.0)]),
            buildable_on: vec!["empty".to_string()],
            category: "energy".to_string(),
            color: 0x00F5_A623,
            icon: "☀️".to_string(),
        }]
    }

    /// Whether this structure may be placed on the given tile type.
    #[must_use]
    pub fn can_build_on(&self, tile_type: &str) -> bool {
        self.buildable_on.iter().any(|t| t == tile_type)
    }

    /// Resources this structure produces, from `"<resource>PerSecond"` stats.
    pub fn produced_resources(&self) -> impl Iterator<Item = &str> + '_ {
        self.stats
            .keys()
            .filter_map(|stat| stat.strip_suffix(PER_SECOND_SUFFIX))
    }
}
