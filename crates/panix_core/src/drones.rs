//! Drone assembly and deployment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::crafting::CraftingManager;
use crate::data::{DroneRecipe, BASIC_GATHERER};
use crate::error::{ActionError, ActionResult};
use crate::grid::HexGrid;
use crate::hex::HexCoord;

/// One drone placed on a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// Axial q.
    pub q: i32,
    /// Axial r.
    pub r: i32,
    /// Drone type id.
    pub drone_type: String,
}

impl Deployment {
    /// Tile this drone sits on.
    #[must_use]
    pub const fn coord(&self) -> HexCoord {
        HexCoord::new(self.q, self.r)
    }
}

/// Persisted drone state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneSaveData {
    /// Lifetime drones built.
    pub total_built: u64,
    /// Drones in the pool, not on a tile.
    pub available_drones: u32,
    /// Deployments in placement order.
    #[serde(default)]
    pub deployments: Vec<Deployment>,
}

/// Drone inventory and deployment records.
///
/// The grid's per-tile counts are the source of truth for generation; the
/// deployment list mirrors them for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct DroneManager {
    recipes: BTreeMap<String, DroneRecipe>,
    starting_drones: u32,
    total_built: u64,
    available: u32,
    deployments: Vec<Deployment>,
}

impl DroneManager {
    /// Create with the configured starting pool and nothing deployed.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let starting_drones = config.balance.drones.starting_drones;
        Self {
            recipes: config.drones.clone(),
            starting_drones,
            total_built: 0,
            available: starting_drones,
            deployments: Vec::new(),
        }
    }

    /// Assemble a drone from components.
    ///
    /// # Errors
    ///
    /// Unknown drone type or missing components. Nothing changes on error.
    pub fn build_drone(&mut self, drone_type: &str, crafting: &mut CraftingManager) -> ActionResult {
        let recipe = self
            .recipes
            .get(drone_type)
            .ok_or_else(|| ActionError::UnknownDroneType(drone_type.to_string()))?;

        if !crafting.has_components(&recipe.components) {
            return Err(ActionError::InsufficientComponents);
        }
        if !crafting.consume_components(&recipe.components) {
            return Err(ActionError::ConsumptionFailed);
        }

        self.available += 1;
        self.total_built += 1;
        tracing::debug!(
            drone_type,
            available = self.available,
            total_built = self.total_built,
            "Built drone"
        );
        Ok(())
    }

    /// Whether the recipe exists and its components are in stock.
    #[must_use]
    pub fn can_build_drone(&self, drone_type: &str, crafting: &CraftingManager) -> bool {
        self.recipes
            .get(drone_type)
            .is_some_and(|recipe| crafting.has_components(&recipe.components))
    }

    /// Move one drone from the pool onto a resource tile.
    ///
    /// # Errors
    ///
    /// Checked in order: empty pool, unknown tile, starting tile, empty
    /// tile, tile full.
    pub fn deploy_drone(&mut self, coord: HexCoord, grid: &mut HexGrid) -> ActionResult {
        if self.available == 0 {
            return Err(ActionError::NoDronesAvailable);
        }
        let tile = grid.tile(coord).ok_or(ActionError::InvalidTile)?;
        if tile.is_starting {
            return Err(ActionError::StartingTile);
        }
        if tile.tile_type.is_empty() {
            return Err(ActionError::EmptyTile);
        }
        if !grid.can_deploy(coord) {
            return Err(ActionError::TileAtCapacity);
        }
        if !grid.add_drone(coord) {
            return Err(ActionError::DeployFailed);
        }

        self.available -= 1;
        self.deployments.push(Deployment {
            q: coord.q,
            r: coord.r,
            drone_type: BASIC_GATHERER.to_string(),
        });
        tracing::debug!(%coord, available = self.available, "Deployed drone");
        Ok(())
    }

    /// Return one drone from a tile to the pool.
    ///
    /// A tile count with no matching deployment record still succeeds; the
    /// mismatch is logged.
    ///
    /// # Errors
    ///
    /// Unknown tile or no drones on it.
    pub fn remove_drone(&mut self, coord: HexCoord, grid: &mut HexGrid) -> ActionResult {
        let drones = grid.tile(coord).ok_or(ActionError::InvalidTile)?.drones;
        if drones == 0 {
            return Err(ActionError::NoDronesOnTile);
        }

        grid.set_drone_count(coord, drones - 1);
        self.available += 1;

        match self.deployments.iter().position(|d| d.coord() == coord) {
            Some(index) => {
                self.deployments.remove(index);
            }
            None => tracing::warn!(%coord, "Removed drone had no deployment record"),
        }
        tracing::debug!(%coord, available = self.available, "Recalled drone");
        Ok(())
    }

    /// Drones in the pool.
    #[must_use]
    pub const fn available_drones(&self) -> u32 {
        self.available
    }

    /// Lifetime drones built.
    #[must_use]
    pub const fn total_built(&self) -> u64 {
        self.total_built
    }

    /// Deployment records, oldest first.
    #[must_use]
    pub fn deployments(&self) -> &[Deployment] {
        &self.deployments
    }

    /// Recipe for a drone type.
    #[must_use]
    pub fn recipe(&self, drone_type: &str) -> Option<&DroneRecipe> {
        self.recipes.get(drone_type)
    }

    /// Back to the starting pool. The caller clears the grid.
    pub fn reset(&mut self) {
        self.total_built = 0;
        self.available = self.starting_drones;
        self.deployments.clear();
    }

    /// Snapshot for persistence.
    #[must_use]
    pub fn save_data(&self) -> DroneSaveData {
        DroneSaveData {
            total_built: self.total_built,
            available_drones: self.available,
            deployments: self.deployments.clone(),
        }
    }

    /// Restore counters and re-place every deployment onto the grid.
    ///
    /// Expects a grid without drones. Deployments that no longer fit are
    /// dropped with a warning.
    pub fn load_save_data(&mut self, data: &DroneSaveData, grid: &mut HexGrid) {
        self.total_built = data.total_built;
        self.available = data.available_drones;
        self.deployments.clear();

        for deployment in &data.deployments {
            if grid.add_drone(deployment.coord()) {
                self.deployments.push(deployment.clone());
            } else {
                tracing::warn!(
                    coord = %deployment.coord(),
                    "Dropping saved deployment that no longer fits the grid"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceManager;

    struct Fixture {
        drones: DroneManager,
        crafting: CraftingManager,
        resources: ResourceManager,
        grid: HexGrid,
    }

    fn fixture() -> Fixture {
        let config = GameConfig::default();
        Fixture {
            drones: DroneManager::new(&config),
            crafting: CraftingManager::new(&config),
            resources: ResourceManager::from_amounts([
                ("iron", 1000.0),
                ("silicon", 1000.0),
                ("energy", 1000.0),
            ]),
            grid: HexGrid::new(&config),
        }
    }

    impl Fixture {
        fn build(&mut self, count: u32) {
            for _ in 0..count {
                for kind in ["chassis", "circuit", "powerCore"] {
                    self.crafting
                        .craft_component(kind, &mut self.resources)
                        .unwrap();
                }
                self.drones
                    .build_drone(BASIC_GATHERER, &mut self.crafting)
                    .unwrap();
            }
        }

        fn first(&self, tile_type: &str) -> HexCoord {
            self.grid
                .tiles()
                .find(|t| t.tile_type.id() == tile_type && !t.is_starting)
                .map(|t| t.coord)
                .unwrap()
        }
    }

    #[test]
    fn test_build_drone() {
        let mut f = fixture();
        f.build(1);
        assert_eq!(f.drones.available_drones(), 1);
        assert_eq!(f.drones.total_built(), 1);
        assert!(f.crafting.all_components().values().all(|&c| c == 0));
    }

    #[test]
    fn test_starting_drones_seed_pool() {
        let mut config = GameConfig::default();
        config.balance.drones.starting_drones = 3;
        let mut grid = HexGrid::new(&config);
        let mut drones = DroneManager::new(&config);
        assert_eq!(drones.available_drones(), 3);
        assert_eq!(drones.total_built(), 0);

        let iron = grid
            .tiles()
            .find(|t| t.tile_type.id() == "iron" && !t.is_starting)
            .map(|t| t.coord)
            .unwrap();
        drones.deploy_drone(iron, &mut grid).unwrap();
        assert_eq!(drones.available_drones(), 2);

        drones.reset();
        assert_eq!(drones.available_drones(), 3);
        assert!(drones.deployments().is_empty());
    }

    #[test]
    fn test_build_unknown_type() {
        let mut f = fixture();
        let err = f.drones.build_drone("warDrone", &mut f.crafting).unwrap_err();
        assert_eq!(err.to_string(), "Unknown drone type: warDrone");
    }

    #[test]
    fn test_build_without_components() {
        let mut f = fixture();
        f.crafting.craft_component("chassis", &mut f.resources).unwrap();
        let before = f.crafting.clone();
        let err = f.drones.build_drone(BASIC_GATHERER, &mut f.crafting).unwrap_err();
        assert_eq!(err, ActionError::InsufficientComponents);
        assert_eq!(f.crafting, before);
        assert!(!f.drones.can_build_drone(BASIC_GATHERER, &f.crafting));
    }

    #[test]
    fn test_deploy_and_remove() {
        let mut f = fixture();
        f.build(1);
        let iron = f.first("iron");

        f.drones.deploy_drone(iron, &mut f.grid).unwrap();
        assert_eq!(f.grid.tile(iron).unwrap().drones, 1);
        assert_eq!(f.drones.available_drones(), 0);
        assert_eq!(f.drones.deployments()[0].coord(), iron);

        f.drones.remove_drone(iron, &mut f.grid).unwrap();
        assert_eq!(f.grid.tile(iron).unwrap().drones, 0);
        assert_eq!(f.drones.available_drones(), 1);
        assert!(f.drones.deployments().is_empty());
    }

    #[test]
    fn test_deploy_errors_in_order() {
        let mut f = fixture();
        let start = f.grid.starting_tile().unwrap().coord;
        assert_eq!(
            f.drones.deploy_drone(start, &mut f.grid),
            Err(ActionError::NoDronesAvailable)
        );

        f.build(1);
        assert_eq!(
            f.drones.deploy_drone(HexCoord::new(99, 99), &mut f.grid),
            Err(ActionError::InvalidTile)
        );
        assert_eq!(
            f.drones.deploy_drone(start, &mut f.grid),
            Err(ActionError::StartingTile)
        );
        let empty = f.first("empty");
        assert_eq!(
            f.drones.deploy_drone(empty, &mut f.grid),
            Err(ActionError::EmptyTile)
        );
        assert_eq!(f.drones.available_drones(), 1);
    }

    #[test]
    fn test_deploy_full_tile() {
        let mut f = fixture();
        f.build(1);
        let silicon = f.first("silicon");
        f.grid.set_drone_count(silicon, 10);
        assert_eq!(
            f.drones.deploy_drone(silicon, &mut f.grid),
            Err(ActionError::TileAtCapacity)
        );
    }

    #[test]
    fn test_remove_from_empty_tile() {
        let mut f = fixture();
        let iron = f.first("iron");
        assert_eq!(
            f.drones.remove_drone(iron, &mut f.grid),
            Err(ActionError::NoDronesOnTile)
        );
        assert_eq!(
            f.drones.remove_drone(HexCoord::new(-40, 2), &mut f.grid),
            Err(ActionError::InvalidTile)
        );
    }

    #[test]
    fn test_remove_without_record_is_tolerated() {
        let mut f = fixture();
        let iron = f.first("iron");
        f.grid.set_drone_count(iron, 2);
        f.drones.remove_drone(iron, &mut f.grid).unwrap();
        assert_eq!(f.grid.tile(iron).unwrap().drones, 1);
        assert_eq!(f.drones.available_drones(), 1);
    }

    #[test]
    fn test_load_reapplies_deployments() {
        let mut f = fixture();
        f.build(3);
        let iron = f.first("iron");
        let energy = f.first("energy");
        f.drones.deploy_drone(iron, &mut f.grid).unwrap();
        f.drones.deploy_drone(iron, &mut f.grid).unwrap();
        f.drones.deploy_drone(energy, &mut f.grid).unwrap();
        let data = f.drones.save_data();

        let config = GameConfig::default();
        let mut grid = HexGrid::new(&config);
        let mut loaded = DroneManager::new(&config);
        loaded.load_save_data(&data, &mut grid);

        assert_eq!(loaded.save_data(), data);
        assert_eq!(grid.tile(iron).unwrap().drones, 2);
        assert_eq!(grid.tile(energy).unwrap().drones, 1);
    }

    #[test]
    fn test_save_json_shape() {
        let data = DroneSaveData {
            total_built: 2,
            available_drones: 1,
            deployments: vec![Deployment {
                q: 1,
                r: 2,
                drone_type: BASIC_GATHERER.to_string(),
            }],
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["totalBuilt"], 2);
        assert_eq!(json["availableDrones"], 1);
        assert_eq!(json["deployments"][0]["droneType"], "basicGatherer");
    }
}
