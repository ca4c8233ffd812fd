//! Resource ledger and per-tick generation.
//!
//! Time enters the game only through [`ResourceManager::update`]. The host
//! must call it once per frame with the true elapsed time; there is no
//! internal clock and no deduplication of repeated deltas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::data::ResourceCost;
use crate::grid::HexGrid;
use crate::structures::StructureManager;

/// Persisted ledger contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSaveData {
    /// Raw (unfloored) amounts by resource id.
    pub resources: BTreeMap<String, f64>,
}

/// Accumulated resources plus the last computed generation rates.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceManager {
    amounts: BTreeMap<String, f64>,
    rates: BTreeMap<String, f64>,
    starting: BTreeMap<String, f64>,
}

impl ResourceManager {
    /// Create a ledger holding every configured resource at its starting amount.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let starting: BTreeMap<String, f64> = config
            .resource_ids()
            .map(|id| {
                let amount = config
                    .balance
                    .resources
                    .starting_resources
                    .get(id)
                    .copied()
                    .unwrap_or(0.0);
                (id.to_string(), amount.max(0.0))
            })
            .collect();

        Self {
            rates: starting.keys().map(|id| (id.clone(), 0.0)).collect(),
            amounts: starting.clone(),
            starting,
        }
    }

    /// Create a ledger with explicit amounts, all other ids unknown.
    #[must_use]
    pub fn from_amounts<'a>(amounts: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let amounts: BTreeMap<String, f64> = amounts
            .into_iter()
            .map(|(id, amount)| (id.to_string(), amount.max(0.0)))
            .collect();
        Self {
            rates: amounts.keys().map(|id| (id.clone(), 0.0)).collect(),
            starting: amounts.keys().map(|id| (id.clone(), 0.0)).collect(),
            amounts,
        }
    }

    /// Advance generation by `delta_ms` milliseconds.
    ///
    /// Adds the starting base's fixed iron output, every drone-occupied
    /// resource tile's output and, when given, the passive output of placed
    /// structures. Refreshes the rate snapshot and clamps every total at zero.
    pub fn update(
        &mut self,
        delta_ms: f64,
        grid: &HexGrid,
        structures: Option<&StructureManager>,
    ) {
        let delta_seconds = (delta_ms / 1000.0).max(0.0);

        for rate in self.rates.values_mut() {
            *rate = 0.0;
        }

        if let Some(start) = grid.starting_tile() {
            let rate = grid.generation_rate(start.coord);
            self.credit("iron", rate, delta_seconds);
        }

        for tile in grid.tiles() {
            if tile.drones == 0 || tile.is_starting {
                continue;
            }
            if let Some(resource) = tile.tile_type.resource() {
                let rate = grid.generation_rate(tile.coord);
                self.credit(resource, rate, delta_seconds);
            }
        }

        if let Some(structures) = structures {
            for (resource, rate) in structures.production_rates() {
                self.credit(&resource, rate, delta_seconds);
            }
        }

        self.clamp();
    }

    fn credit(&mut self, resource: &str, rate: f64, delta_seconds: f64) {
        if let Some(amount) = self.amounts.get_mut(resource) {
            *amount += rate * delta_seconds;
            *self.rates.entry(resource.to_string()).or_insert(0.0) += rate;
        }
    }

    fn clamp(&mut self) {
        for amount in self.amounts.values_mut() {
            if !(*amount >= 0.0) {
                *amount = 0.0;
            }
        }
    }

    /// Current amount, floored for display and affordability.
    #[must_use]
    pub fn resource(&self, id: &str) -> u64 {
        self.amounts
            .get(id)
            .map_or(0, |amount| amount.floor() as u64)
    }

    /// Unfloored amount.
    #[must_use]
    pub fn raw_amount(&self, id: &str) -> f64 {
        self.amounts.get(id).copied().unwrap_or(0.0)
    }

    /// All amounts, floored.
    #[must_use]
    pub fn all_resources(&self) -> BTreeMap<String, u64> {
        self.amounts
            .keys()
            .map(|id| (id.clone(), self.resource(id)))
            .collect()
    }

    /// Rate per second computed by the last update.
    #[must_use]
    pub fn generation_rate(&self, id: &str) -> f64 {
        self.rates.get(id).copied().unwrap_or(0.0)
    }

    /// All rates from the last update.
    #[must_use]
    pub fn generation_rates(&self) -> &BTreeMap<String, f64> {
        &self.rates
    }

    /// Whether every listed resource's floored amount covers the cost.
    ///
    /// Vacuously true for an empty cost.
    #[must_use]
    pub fn can_afford(&self, cost: &ResourceCost) -> bool {
        cost.iter()
            .all(|(id, &required)| self.resource(id) >= required)
    }

    /// Deduct a cost, all or nothing.
    ///
    /// Returns `false` without touching the ledger when unaffordable.
    pub fn spend(&mut self, cost: &ResourceCost) -> bool {
        if !self.can_afford(cost) {
            return false;
        }

        for (id, &amount) in cost {
            if let Some(current) = self.amounts.get_mut(id) {
                *current -= amount as f64;
            }
        }
        self.clamp();
        true
    }

    /// Add to a resource. Unknown ids are ignored.
    pub fn add_resource(&mut self, id: &str, amount: f64) {
        match self.amounts.get_mut(id) {
            Some(current) => {
                *current += amount;
                self.clamp();
            }
            None => tracing::debug!(resource = id, "Ignoring add for unknown resource"),
        }
    }

    /// Restore the starting amounts.
    pub fn reset(&mut self) {
        self.amounts = self.starting.clone();
        for rate in self.rates.values_mut() {
            *rate = 0.0;
        }
    }

    /// Snapshot for persistence.
    #[must_use]
    pub fn save_data(&self) -> ResourceSaveData {
        ResourceSaveData {
            resources: self.amounts.clone(),
        }
    }

    /// Replace the ledger with saved amounts.
    ///
    /// Configured ids missing from the save fall back to zero; ids the config
    /// does not know are skipped. Negative amounts are clamped.
    pub fn load_save_data(&mut self, data: &ResourceSaveData) {
        for amount in self.amounts.values_mut() {
            *amount = 0.0;
        }
        for (id, &amount) in &data.resources {
            match self.amounts.get_mut(id) {
                Some(slot) => *slot = amount,
                None => tracing::warn!(id = %id, "Skipping saved amount for unknown resource"),
            }
        }
        self.clamp();
    }
}
