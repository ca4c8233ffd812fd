//! Layered game configuration.
//!
//! The base layer is the built-in content ([`GameConfig::default`]) or a full
//! config file. An optional [`ConfigOverrides`] layer (the dev editor's output)
//! is merged once at load time. Managers only ever see the resolved,
//! immutable [`GameConfig`].
//!
//! Override rules:
//! - An id already present in the base replaces the base entry.
//! - A new id must carry the `custom_` prefix; other new ids are skipped.

mod validation;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{
    BalanceData, ComponentRecipe, DroneRecipe, MapData, ResourceData, StructureData, TileTypeData,
};
use crate::error::{GameError, Result};

pub use validation::{ConfigManager, EntityKind, ValidationReport};

/// Prefix required for entities added through overrides.
pub const CUSTOM_PREFIX: &str = "custom_";

/// Fully resolved, read-only game content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Balance constants.
    #[serde(default)]
    pub balance: BalanceData,
    /// Map layout.
    #[serde(default)]
    pub map: MapData,
    /// Resource definitions keyed by id.
    pub resources: BTreeMap<String, ResourceData>,
    /// Tile type definitions keyed by id.
    pub tile_types: BTreeMap<String, TileTypeData>,
    /// Component recipes keyed by component id.
    pub components: BTreeMap<String, ComponentRecipe>,
    /// Drone recipes keyed by drone type.
    pub drones: BTreeMap<String, DroneRecipe>,
    /// Structure definitions keyed by id.
    pub structures: BTreeMap<String, StructureData>,
}

fn keyed<T>(items: Vec<T>, id: impl Fn(&T) -> &str) -> BTreeMap<String, T> {
    items
        .into_iter()
        .map(|item| (id(&item).to_string(), item))
        .collect()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            balance: BalanceData::default(),
            map: MapData::default(),
            resources: keyed(ResourceData::builtin(), |r| &r.id),
            tile_types: keyed(TileTypeData::builtin(), |t| &t.id),
            components: keyed(ComponentRecipe::builtin(), |c| &c.id),
            drones: keyed(DroneRecipe::builtin(), |d| &d.id),
            structures: keyed(StructureData::builtin(), |s| &s.id),
        }
    }
}

impl GameConfig {
    /// Parse a full config from RON.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load a full config from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| GameError::io(path, e))?;
        ron::from_str(&source).map_err(|e| GameError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize to pretty RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| GameError::InvalidState(e.to_string()))
    }

    /// Merge an override layer on top of this config.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        merge_layer(&mut self.resources, overrides.resources, "resource");
        merge_layer(&mut self.tile_types, overrides.tile_types, "tile type");
        merge_layer(&mut self.structures, overrides.structures, "structure");
        merge_layer(&mut self.drones, overrides.drones, "drone");
        if let Some(balance) = overrides.balance {
            self.balance = balance;
        }
        self
    }

    /// Run every validation check.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidConfig`] listing every problem found.
    pub fn validate(&self) -> Result<()> {
        let report = ConfigManager::new(self).validate_all();
        if report.is_valid() {
            Ok(())
        } else {
            Err(GameError::InvalidConfig(report.errors))
        }
    }

    /// Look up a component recipe.
    #[must_use]
    pub fn component(&self, id: &str) -> Option<&ComponentRecipe> {
        self.components.get(id)
    }

    /// Look up a drone recipe.
    #[must_use]
    pub fn drone(&self, id: &str) -> Option<&DroneRecipe> {
        self.drones.get(id)
    }

    /// Look up a structure definition.
    #[must_use]
    pub fn structure(&self, id: &str) -> Option<&StructureData> {
        self.structures.get(id)
    }

    /// Look up a resource definition.
    #[must_use]
    pub fn resource(&self, id: &str) -> Option<&ResourceData> {
        self.resources.get(id)
    }

    /// Structures belonging to a UI category.
    pub fn structures_in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a StructureData> + 'a {
        self.structures
            .values()
            .filter(move |s| s.category == category)
    }

    /// Resource ids in ledger order.
    pub fn resource_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.resources.keys().map(String::as_str)
    }
}

fn merge_layer<T>(base: &mut BTreeMap<String, T>, layer: BTreeMap<String, T>, kind: &str) {
    for (id, item) in layer {
        if base.contains_key(&id) || id.starts_with(CUSTOM_PREFIX) {
            tracing::debug!(kind, id = %id, "Applying config override");
            base.insert(id, item);
        } else {
            tracing::warn!(
                kind,
                id = %id,
                "Skipping override: new ids must start with '{CUSTOM_PREFIX}'"
            );
        }
    }
}

/// User-supplied override layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    /// Resource overrides.
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceData>,
    /// Tile type overrides.
    #[serde(default)]
    pub tile_types: BTreeMap<String, TileTypeData>,
    /// Structure overrides.
    #[serde(default)]
    pub structures: BTreeMap<String, StructureData>,
    /// Drone overrides.
    #[serde(default)]
    pub drones: BTreeMap<String, DroneRecipe>,
    /// Replacement balance table.
    #[serde(default)]
    pub balance: Option<BalanceData>,
}

impl ConfigOverrides {
    /// Parse overrides from RON.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load overrides from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| GameError::io(path, e))?;
        ron::from_str(&source).map_err(|e| GameError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Whether the layer changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
            && self.tile_types.is_empty()
            && self.structures.is_empty()
            && self.drones.is_empty()
            && self.balance.is_none()
    }
}
