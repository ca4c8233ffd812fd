//! The game context.
//!
//! [`Game`] constructs every manager once from a resolved [`GameConfig`] and
//! hands collaborators to each other explicitly on every call. It is the only
//! place that knows how the managers fit together.
//!
//! The host drives it in one of two ways:
//! - call [`Game::tick`] with each frame's elapsed milliseconds, or
//! - call [`Game::resume`] with a monotonic host clock and let the game work
//!   out (and cap) the elapsed time itself.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::config::GameConfig;
use crate::crafting::CraftingManager;
use crate::drones::DroneManager;
use crate::error::{ActionError, ActionResult};
use crate::events::{EventBus, GameEvent};
use crate::grid::HexGrid;
use crate::hex::HexCoord;
use crate::resources::ResourceManager;
use crate::settings::SettingsManager;
use crate::structures::StructureManager;

/// Every piece of mutable game state plus the config it was built from.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    pub(crate) grid: HexGrid,
    pub(crate) resources: ResourceManager,
    pub(crate) crafting: CraftingManager,
    pub(crate) drones: DroneManager,
    pub(crate) structures: StructureManager,
    settings: SettingsManager,
    events: EventBus,
    elapsed_ms: f64,
    tick_count: u64,
    last_tick_at: Option<u64>,
    last_save_at: u64,
}

impl Game {
    /// Build a fresh game.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let grid = HexGrid::new(&config);
        let resources = ResourceManager::new(&config);
        let crafting = CraftingManager::new(&config);
        let drones = DroneManager::new(&config);
        let structures = StructureManager::new(&config);

        tracing::info!(
            tiles = grid.len(),
            resources = config.resources.len(),
            structures = config.structures.len(),
            "Game initialized"
        );

        Self {
            config,
            grid,
            resources,
            crafting,
            drones,
            structures,
            settings: SettingsManager::new(),
            events: EventBus::new(),
            elapsed_ms: 0.0,
            tick_count: 0,
            last_tick_at: None,
            last_save_at: 0,
        }
    }

    /// Replace the settings manager, e.g. with a file-backed one.
    #[must_use]
    pub fn with_settings(mut self, settings: SettingsManager) -> Self {
        self.settings = settings;
        self
    }

    /// Advance the simulation by `delta_ms`.
    pub fn tick(&mut self, delta_ms: f64) {
        self.resources
            .update(delta_ms, &self.grid, Some(&self.structures));
        self.elapsed_ms += delta_ms.max(0.0);
        self.tick_count += 1;
    }

    /// Advance to host time `now_ms`, crediting the time since the last call.
    ///
    /// The first call only records the clock. Elapsed time is capped at
    /// `balance.game_loop.max_offline_ms`. Returns the milliseconds credited.
    pub fn resume(&mut self, now_ms: u64) -> u64 {
        let credited = match self.last_tick_at {
            Some(previous) => {
                let elapsed = now_ms.saturating_sub(previous);
                let cap = self.config.balance.game_loop.max_offline_ms;
                if elapsed > cap {
                    tracing::info!(elapsed, cap, "Capping offline progress");
                }
                elapsed.min(cap)
            }
            None => 0,
        };

        if credited > 0 {
            self.tick(credited as f64);
        }
        self.last_tick_at = Some(now_ms);
        self.structures.set_last_update_time(now_ms);
        credited
    }

    /// Whether the auto-save interval has passed since the last save.
    #[must_use]
    pub fn auto_save_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_save_at) >= self.config.balance.game_loop.auto_save_interval_ms
    }

    /// Record that a save happened at `now_ms`.
    pub fn mark_saved(&mut self, now_ms: u64) {
        self.last_save_at = now_ms;
    }

    /// Craft one component.
    ///
    /// # Errors
    ///
    /// See [`CraftingManager::craft_component`].
    pub fn craft_component(&mut self, kind: &str) -> ActionResult {
        self.crafting.craft_component(kind, &mut self.resources)
    }

    /// Assemble one drone.
    ///
    /// # Errors
    ///
    /// See [`DroneManager::build_drone`].
    pub fn build_drone(&mut self, drone_type: &str) -> ActionResult {
        self.drones.build_drone(drone_type, &mut self.crafting)
    }

    /// Deploy a drone onto a tile.
    ///
    /// # Errors
    ///
    /// See [`DroneManager::deploy_drone`].
    pub fn deploy_drone(&mut self, coord: HexCoord) -> ActionResult {
        self.drones.deploy_drone(coord, &mut self.grid)
    }

    /// Recall a drone from a tile.
    ///
    /// # Errors
    ///
    /// See [`DroneManager::remove_drone`].
    pub fn remove_drone(&mut self, coord: HexCoord) -> ActionResult {
        self.drones.remove_drone(coord, &mut self.grid)
    }

    /// Place a structure at `now_ms` host time.
    ///
    /// # Errors
    ///
    /// Unknown tile, or any reason from
    /// [`StructureManager::can_build_structure`].
    pub fn build_structure(
        &mut self,
        structure_type: &str,
        coord: HexCoord,
        now_ms: u64,
    ) -> ActionResult {
        let tile = self.grid.tile(coord).ok_or(ActionError::InvalidTile)?;
        self.structures
            .can_build_structure(structure_type, coord, tile, &self.resources)?;
        if self.structures.build_structure(
            structure_type,
            coord,
            tile,
            &mut self.resources,
            now_ms,
            &mut self.events,
        ) {
            Ok(())
        } else {
            Err(ActionError::InsufficientResources)
        }
    }

    /// Remove a structure.
    ///
    /// # Errors
    ///
    /// No structure on the tile.
    pub fn demolish_structure(&mut self, coord: HexCoord) -> ActionResult {
        if self.structures.demolish_structure(coord, &mut self.events) {
            Ok(())
        } else {
            Err(ActionError::NoStructure)
        }
    }

    /// Add to a resource. Unknown ids are ignored.
    pub fn add_resource(&mut self, id: &str, amount: f64) {
        self.resources.add_resource(id, amount);
    }

    /// Change a setting by key, emitting [`GameEvent::SettingsUpdated`].
    pub fn set_setting(&mut self, key: &str, value: &str) -> bool {
        self.settings.set(key, value, &mut self.events)
    }

    /// Hard reset: back to a fresh game, keeping config and settings.
    pub fn reset(&mut self, now_ms: u64) {
        self.grid.clear_drones();
        self.resources.reset();
        self.crafting.reset();
        self.drones.reset();
        self.structures.reset(now_ms);
        self.elapsed_ms = 0.0;
        self.tick_count = 0;
        self.last_tick_at = None;
        self.last_save_at = now_ms;
        tracing::info!("Game reset");
    }

    /// Take the events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// Event bus, for subscribing listeners.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The map.
    #[must_use]
    pub const fn grid(&self) -> &HexGrid {
        &self.grid
    }

    /// The resource ledger.
    #[must_use]
    pub const fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    /// Component inventory.
    #[must_use]
    pub const fn crafting(&self) -> &CraftingManager {
        &self.crafting
    }

    /// Drone state.
    #[must_use]
    pub const fn drones(&self) -> &DroneManager {
        &self.drones
    }

    /// Structure table.
    #[must_use]
    pub const fn structures(&self) -> &StructureManager {
        &self.structures
    }

    /// Player settings.
    #[must_use]
    pub const fn settings(&self) -> &SettingsManager {
        &self.settings
    }

    /// Player settings, mutable. Use [`Game::set_setting`] to emit events.
    pub fn settings_mut(&mut self) -> &mut SettingsManager {
        &mut self.settings
    }

    /// Total simulated milliseconds.
    #[must_use]
    pub const fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Number of ticks run.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub(crate) fn set_progress(&mut self, elapsed_ms: f64, last_update_time: u64) {
        self.elapsed_ms = elapsed_ms;
        self.last_tick_at = (last_update_time > 0).then_some(last_update_time);
    }

    pub(crate) fn reload_drones(&mut self, data: &crate::drones::DroneSaveData) {
        self.grid.clear_drones();
        self.drones.load_save_data(data, &mut self.grid);
    }

    /// Hash of all gameplay state.
    ///
    /// Two games that received the same actions and deltas hash equal, and
    /// a save/restore round trip preserves the hash.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.elapsed_ms.to_bits().hash(&mut hasher);

        for (id, amount) in &self.resources.save_data().resources {
            id.hash(&mut hasher);
            amount.to_bits().hash(&mut hasher);
        }
        self.crafting.save_data().hash(&mut hasher);

        self.drones.total_built().hash(&mut hasher);
        self.drones.available_drones().hash(&mut hasher);
        for tile in self.grid.tiles() {
            tile.coord.hash(&mut hasher);
            tile.drones.hash(&mut hasher);
        }

        for record in self.structures.all_structures() {
            record.structure_type.hash(&mut hasher);
            record.coord().hash(&mut hasher);
        }

        hasher.finish()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BASIC_GATHERER, SOLAR_PANEL};

    fn rich_game() -> Game {
        let mut game = Game::default();
        for id in ["iron", "silicon", "energy"] {
            game.add_resource(id, 1000.0);
        }
        game
    }

    fn first(game: &Game, tile_type: &str) -> HexCoord {
        game.grid()
            .tiles()
            .find(|t| t.tile_type.id() == tile_type && !t.is_starting)
            .map(|t| t.coord)
            .unwrap()
    }

    #[test]
    fn test_tick_generates_from_starting_tile() {
        let mut game = Game::default();
        game.tick(1000.0);
        assert_eq!(game.resources().resource("iron"), 1);
        assert_eq!(game.tick_count(), 1);
        assert_eq!(game.elapsed_ms(), 1000.0);
    }

    #[test]
    fn test_full_chain() {
        let mut game = rich_game();
        for kind in ["chassis", "circuit", "powerCore"] {
            game.craft_component(kind).unwrap();
        }
        game.build_drone(BASIC_GATHERER).unwrap();
        let silicon = first(&game, "silicon");
        game.deploy_drone(silicon).unwrap();

        let before = game.resources().raw_amount("silicon");
        game.tick(2000.0);
        assert!((game.resources().raw_amount("silicon") - before - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_structure_energy_feeds_ledger() {
        let mut game = rich_game();
        let empty = first(&game, "empty");
        game.build_structure(SOLAR_PANEL, empty, 0).unwrap();
        assert_eq!(game.drain_events().len(), 1);

        let before = game.resources().raw_amount("energy");
        game.tick(1000.0);
        assert!((game.resources().raw_amount("energy") - before - 1.0).abs() < 1e-9);
        assert_eq!(game.resources().generation_rate("energy"), 1.0);
    }

    #[test]
    fn test_build_structure_errors() {
        let mut game = rich_game();
        assert_eq!(
            game.build_structure(SOLAR_PANEL, HexCoord::new(-30, 0), 0),
            Err(ActionError::InvalidTile)
        );
        let iron = first(&game, "iron");
        assert_eq!(
            game.build_structure(SOLAR_PANEL, iron, 0),
            Err(ActionError::IneligibleTileType)
        );
        assert_eq!(
            game.demolish_structure(iron),
            Err(ActionError::NoStructure)
        );
    }

    #[test]
    fn test_resume_caps_offline_time() {
        let mut game = Game::default();
        assert_eq!(game.resume(1_000), 0);
        assert_eq!(game.resume(3_000), 2_000);
        assert_eq!(game.resources().resource("iron"), 2);

        let cap = game.config().balance.game_loop.max_offline_ms;
        assert_eq!(game.resume(3_000 + cap * 2), cap);
    }

    #[test]
    fn test_auto_save_due() {
        let mut game = Game::default();
        assert!(!game.auto_save_due(9_999));
        assert!(game.auto_save_due(10_000));
        game.mark_saved(10_000);
        assert!(!game.auto_save_due(15_000));
    }

    #[test]
    fn test_reset() {
        let mut game = rich_game();
        game.craft_component("chassis").unwrap();
        game.tick(500.0);
        game.reset(0);
        assert_eq!(game.resources().resource("iron"), 0);
        assert_eq!(game.crafting().component("chassis"), 0);
        assert_eq!(game.tick_count(), 0);
        assert_eq!(game.state_hash(), Game::default().state_hash());
    }

    #[test]
    fn test_state_hash_tracks_changes() {
        let mut a = Game::default();
        let mut b = Game::default();
        assert_eq!(a.state_hash(), b.state_hash());
        a.tick(16.0);
        assert_ne!(a.state_hash(), b.state_hash());
        b.tick(16.0);
        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_set_setting_emits_event() {
        let mut game = Game::default();
        assert!(game.set_setting("playerName", "Vega"));
        assert_eq!(game.settings().player_name(), "Vega");
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::SettingsUpdated {
                key: "playerName".to_string()
            }]
        );
    }
}
