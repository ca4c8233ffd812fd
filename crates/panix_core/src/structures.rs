//! Structure placement and passive production.
//!
//! At most one structure stands on a tile. Each placed record carries a copy
//! of its definition's stats taken at build time, so later config changes
//! do not alter structures already built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::data::{StructureData, ENERGY_PER_SECOND, PER_SECOND_SUFFIX};
use crate::error::{ActionError, ActionResult};
use crate::events::{EventBus, GameEvent};
use crate::grid::Tile;
use crate::hex::HexCoord;
use crate::resources::ResourceManager;

/// Outcome of a build eligibility check.
pub type BuildCheck = ActionResult;

/// A placed structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureRecord {
    /// Structure type id.
    pub structure_type: String,
    /// Axial q.
    pub q: i32,
    /// Axial r.
    pub r: i32,
    /// Host time of placement, milliseconds.
    pub build_time: u64,
    /// Stats snapshot.
    pub stats: BTreeMap<String, f64>,
}

impl StructureRecord {
    /// Tile the structure occupies.
    #[must_use]
    pub const fn coord(&self) -> HexCoord {
        HexCoord::new(self.q, self.r)
    }
}

/// Persisted structure row, keyed by `"q,r"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureEntry {
    /// Coordinate key.
    pub key: String,
    /// Structure type id.
    pub structure_type: String,
    /// Axial q.
    pub q: i32,
    /// Axial r.
    pub r: i32,
    /// Host time of placement, milliseconds.
    pub build_time: u64,
    /// Stats snapshot.
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
}

/// Persisted structure table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureSaveData {
    /// Every placed structure.
    #[serde(default)]
    pub structures: Vec<StructureEntry>,
    /// Host time of the last recorded update, milliseconds.
    #[serde(default)]
    pub last_update_time: u64,
}

/// Structure table keyed by coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureManager {
    definitions: BTreeMap<String, StructureData>,
    structures: BTreeMap<HexCoord, StructureRecord>,
    last_update_time: u64,
}

impl StructureManager {
    /// Create an empty table.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            definitions: config.structures.clone(),
            structures: BTreeMap::new(),
            last_update_time: 0,
        }
    }

    /// Check whether a structure may be placed.
    ///
    /// # Errors
    ///
    /// Checked in order: unknown type, tile occupied, ineligible tile type,
    /// insufficient resources.
    pub fn can_build_structure(
        &self,
        structure_type: &str,
        coord: HexCoord,
        tile: &Tile,
        resources: &ResourceManager,
    ) -> BuildCheck {
        let definition = self
            .definitions
            .get(structure_type)
            .ok_or(ActionError::UnknownStructureType)?;

        if self.structures.contains_key(&coord) {
            return Err(ActionError::TileOccupied);
        }
        if !definition.can_build_on(tile.tile_type.id()) {
            return Err(ActionError::IneligibleTileType);
        }
        if !resources.can_afford(&definition.costs) {
            return Err(ActionError::InsufficientResources);
        }
        Ok(())
    }

    /// Place a structure, paying its cost.
    ///
    /// Returns `false` and logs the reason when the check fails. On success
    /// emits exactly one [`GameEvent::StructureBuilt`].
    pub fn build_structure(
        &mut self,
        structure_type: &str,
        coord: HexCoord,
        tile: &Tile,
        resources: &mut ResourceManager,
        now_ms: u64,
        events: &mut EventBus,
    ) -> bool {
        if let Err(reason) = self.can_build_structure(structure_type, coord, tile, resources) {
            tracing::warn!(structure_type, %coord, %reason, "Cannot build structure");
            return false;
        }
        let Some(definition) = self.definitions.get(structure_type) else {
            return false;
        };
        if !resources.spend(&definition.costs) {
            tracing::warn!(structure_type, %coord, "Cannot build structure: payment failed");
            return false;
        }

        self.structures.insert(
            coord,
            StructureRecord {
                structure_type: structure_type.to_string(),
                q: coord.q,
                r: coord.r,
                build_time: now_ms,
                stats: definition.stats.clone(),
            },
        );
        tracing::debug!(structure_type, %coord, "Structure built");
        events.emit(GameEvent::StructureBuilt {
            structure_type: structure_type.to_string(),
            coord,
        });
        true
    }

    /// Remove a structure. No refund.
    pub fn demolish_structure(&mut self, coord: HexCoord, events: &mut EventBus) -> bool {
        if self.structures.remove(&coord).is_none() {
            return false;
        }
        tracing::debug!(%coord, "Structure demolished");
        events.emit(GameEvent::StructureDemolished { coord });
        true
    }

    /// Structure on a tile.
    #[must_use]
    pub fn structure_at(&self, coord: HexCoord) -> Option<&StructureRecord> {
        self.structures.get(&coord)
    }

    /// Whether a tile is occupied.
    #[must_use]
    pub fn has_structure(&self, coord: HexCoord) -> bool {
        self.structures.contains_key(&coord)
    }

    /// All placed structures, ordered by coordinate.
    pub fn all_structures(&self) -> impl Iterator<Item = &StructureRecord> + '_ {
        self.structures.values()
    }

    /// Number of placed structures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    /// Whether nothing is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    /// Number of placed structures of one type.
    #[must_use]
    pub fn structure_count(&self, structure_type: &str) -> usize {
        self.structures
            .values()
            .filter(|s| s.structure_type == structure_type)
            .count()
    }

    /// Summed `energyPerSecond` of every placed structure.
    #[must_use]
    pub fn total_energy_generation(&self) -> f64 {
        self.structures
            .values()
            .filter_map(|s| s.stats.get(ENERGY_PER_SECOND))
            .sum()
    }

    /// Summed `<resource>PerSecond` stats keyed by resource id.
    #[must_use]
    pub fn production_rates(&self) -> BTreeMap<String, f64> {
        let mut rates = BTreeMap::new();
        for record in self.structures.values() {
            for (stat, &value) in &record.stats {
                if let Some(resource) = stat.strip_suffix(PER_SECOND_SUFFIX) {
                    *rates.entry(resource.to_string()).or_insert(0.0) += value;
                }
            }
        }
        rates
    }

    /// Structure definition by id.
    #[must_use]
    pub fn definition(&self, structure_type: &str) -> Option<&StructureData> {
        self.definitions.get(structure_type)
    }

    /// Host time of the last recorded update.
    #[must_use]
    pub const fn last_update_time(&self) -> u64 {
        self.last_update_time
    }

    /// Record the host time of an update.
    pub fn set_last_update_time(&mut self, now_ms: u64) {
        self.last_update_time = now_ms;
    }

    /// Remove everything.
    pub fn reset(&mut self, now_ms: u64) {
        self.structures.clear();
        self.last_update_time = now_ms;
    }

    /// Snapshot for persistence.
    #[must_use]
    pub fn save_data(&self) -> StructureSaveData {
        StructureSaveData {
            structures: self
                .structures
                .iter()
                .map(|(coord, record)| StructureEntry {
                    key: coord.key(),
                    structure_type: record.structure_type.clone(),
                    q: record.q,
                    r: record.r,
                    build_time: record.build_time,
                    stats: record.stats.clone(),
                })
                .collect(),
            last_update_time: self.last_update_time,
        }
    }

    /// Replace the table with saved records.
    ///
    /// The `"q,r"` key decides placement; a malformed key falls back to the
    /// row's own `q`/`r`.
    pub fn load_save_data(&mut self, data: &StructureSaveData) {
        self.structures.clear();
        for entry in &data.structures {
            let coord = entry.key.parse().unwrap_or_else(|_| {
                tracing::warn!(key = %entry.key, "Malformed structure key, using q/r");
                HexCoord::new(entry.q, entry.r)
            });
            self.structures.insert(
                coord,
                StructureRecord {
                    structure_type: entry.structure_type.clone(),
                    q: coord.q,
                    r: coord.r,
                    build_time: entry.build_time,
                    stats: entry.stats.clone(),
                },
            );
        }
        self.last_update_time = data.last_update_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SOLAR_PANEL;
    use crate::events::EventKind;
    use crate::grid::TileType;

    fn tile(q: i32, r: i32, tile_type: TileType) -> Tile {
        Tile {
            coord: HexCoord::new(q, r),
            tile_type,
            drones: 0,
            max_drones: 10,
            is_starting: false,
        }
    }

    fn empty_tile(q: i32, r: i32) -> Tile {
        tile(q, r, TileType::Empty)
    }

    fn rich() -> ResourceManager {
        ResourceManager::from_amounts([("iron", 100.0), ("silicon", 100.0), ("energy", 0.0)])
    }

    fn manager() -> StructureManager {
        StructureManager::new(&GameConfig::default())
    }

    #[test]
    fn test_build_solar_panel() {
        let mut structures = manager();
        let mut resources = rich();
        let mut events = EventBus::new();
        let t = empty_tile(2, 3);

        assert!(structures.build_structure(SOLAR_PANEL, t.coord, &t, &mut resources, 42, &mut events));
        assert_eq!(resources.resource("iron"), 90);
        assert_eq!(resources.resource("silicon"), 95);

        let record = structures.structure_at(t.coord).unwrap();
        assert_eq!(record.build_time, 42);
        assert_eq!(record.stats.get(ENERGY_PER_SECOND), Some(&1.0));
        assert_eq!(structures.structure_count(SOLAR_PANEL), 1);

        let emitted = events.drain();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].kind(), EventKind::StructureBuilt);
    }

    #[test]
    fn test_check_order() {
        let mut structures = manager();
        let mut resources = rich();
        let mut events = EventBus::new();
        let t = empty_tile(0, 0);
        let iron = tile(1, 0, TileType::Resource("iron".to_string()));

        assert_eq!(
            structures.can_build_structure("fusionReactor", t.coord, &t, &resources),
            Err(ActionError::UnknownStructureType)
        );
        assert_eq!(
            structures.can_build_structure(SOLAR_PANEL, iron.coord, &iron, &resources),
            Err(ActionError::IneligibleTileType)
        );
        assert_eq!(
            structures.can_build_structure(SOLAR_PANEL, t.coord, &t, &ResourceManager::from_amounts([])),
            Err(ActionError::InsufficientResources)
        );

        structures.build_structure(SOLAR_PANEL, t.coord, &t, &mut resources, 0, &mut events);
        assert_eq!(
            structures.can_build_structure(SOLAR_PANEL, t.coord, &t, &resources),
            Err(ActionError::TileOccupied)
        );
    }

    #[test]
    fn test_failed_build_changes_nothing() {
        let mut structures = manager();
        let mut resources = ResourceManager::from_amounts([("iron", 5.0), ("silicon", 5.0)]);
        let mut events = EventBus::new();
        let t = empty_tile(0, 0);
        let before = resources.clone();

        assert!(!structures.build_structure(SOLAR_PANEL, t.coord, &t, &mut resources, 0, &mut events));
        assert_eq!(resources, before);
        assert!(structures.is_empty());
        assert!(events.pending().is_empty());
    }

    #[test]
    fn test_demolish() {
        let mut structures = manager();
        let mut resources = rich();
        let mut events = EventBus::new();
        let t = empty_tile(4, -2);

        structures.build_structure(SOLAR_PANEL, t.coord, &t, &mut resources, 0, &mut events);
        events.drain();

        assert!(structures.demolish_structure(t.coord, &mut events));
        assert!(!structures.has_structure(t.coord));
        assert_eq!(resources.resource("iron"), 90);
        assert_eq!(
            events.drain(),
            vec![GameEvent::StructureDemolished { coord: t.coord }]
        );

        assert!(!structures.demolish_structure(t.coord, &mut events));
        assert!(events.pending().is_empty());
    }

    #[test]
    fn test_energy_generation_sums_stats() {
        let mut structures = manager();
        let mut resources = rich();
        let mut events = EventBus::new();
        for q in 0..3 {
            let t = empty_tile(q, 0);
            structures.build_structure(SOLAR_PANEL, t.coord, &t, &mut resources, 0, &mut events);
        }
        assert_eq!(structures.total_energy_generation(), 3.0);
        assert_eq!(structures.production_rates().get("energy"), Some(&3.0));
    }

    #[test]
    fn test_save_round_trip() {
        let mut structures = manager();
        let mut resources = rich();
        let mut events = EventBus::new();
        let t = empty_tile(-1, 5);
        structures.build_structure(SOLAR_PANEL, t.coord, &t, &mut resources, 1234, &mut events);
        structures.set_last_update_time(5000);

        let data = structures.save_data();
        assert_eq!(data.structures[0].key, "-1,5");

        let mut loaded = manager();
        loaded.load_save_data(&data);
        assert_eq!(loaded, structures);

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["lastUpdateTime"], 5000);
        assert_eq!(json["structures"][0]["structureType"], "solarPanel");
        assert_eq!(json["structures"][0]["buildTime"], 1234);
    }

    #[test]
    fn test_reset() {
        let mut structures = manager();
        let mut resources = rich();
        let mut events = EventBus::new();
        let t = empty_tile(0, 0);
        structures.build_structure(SOLAR_PANEL, t.coord, &t, &mut resources, 0, &mut events);
        structures.reset(99);
        assert!(structures.is_empty());
        assert_eq!(structures.last_update_time(), 99);
    }
}
