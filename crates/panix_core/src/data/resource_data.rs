//! Resource and tile type definitions.

use serde::{Deserialize, Serialize};

/// A resource tracked by the ledger.
///
/// # Example RON
///
/// ```ron
/// ResourceData(id: "iron", name: "resources.iron", icon: "🔩", base_rate: 1.0)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    /// Unique identifier, also the ledger key.
    pub id: String,
    /// Localization key for the display name.
    pub name: String,
    /// Display glyph.
    pub icon: String,
    /// Generation multiplier for tiles producing this resource.
    #[serde(default)]
    pub base_rate: f64,
}

impl ResourceData {
    /// Create a resource definition.
    #[must_use]
    pub fn new(id: &str, icon: &str, base_rate: f64) -> Self {
        Self {
            id: id.to_string(),
            name: format!("resources.{id}"),
            icon: icon.to_string(),
            base_rate,
        }
    }

    /// Built-in resources: iron, silicon, energy.
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::new("iron", "🔩", 1.0),
            Self::new("silicon", "💎", 1.0),
            // Energy only comes from structures.
            Self::new("energy", "⚡", 0.0),
        ]
    }
}

/// A tile type that map layouts may reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileTypeData {
    /// Unique identifier used in layout cells.
    pub id: String,
    /// Localization key for the display name.
    pub name: String,
    /// Resource mined by drones on this tile, `None` for barren tiles.
    #[serde(default)]
    pub resource_produced: Option<String>,
    /// Generation multiplier.
    #[serde(default)]
    pub base_rate: f64,
}

impl TileTypeData {
    /// Built-in tile types: one per resource plus `empty`.
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        let mut tiles: Vec<Self> = ["iron", "silicon", "energy"]
            .into_iter()
            .map(|id| Self {
                id: id.to_string(),
                name: format!("tiles.{id}"),
                resource_produced: Some(id.to_string()),
                base_rate: 1.0,
            })
            .collect();
        tiles.push(Self {
            id: "empty".to_string(),
            name: "tiles.empty".to_string(),
            resource_produced: None,
            base_rate: 0.0,
        });
        tiles
    }
}
