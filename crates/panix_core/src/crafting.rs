//! Component crafting and inventory.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::data::{ComponentCost, ComponentRecipe};
use crate::error::{ActionError, ActionResult};
use crate::resources::ResourceManager;

/// Persisted inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CraftingSaveData {
    /// Current counts.
    #[serde(default)]
    pub components: BTreeMap<String, u32>,
    /// Lifetime crafted counts.
    #[serde(default)]
    pub total_crafted: BTreeMap<String, u64>,
}

/// Turns resources into components and holds the component inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct CraftingManager {
    recipes: BTreeMap<String, ComponentRecipe>,
    components: BTreeMap<String, u32>,
    total_crafted: BTreeMap<String, u64>,
}

impl CraftingManager {
    /// Create an empty inventory with a slot for every configured component.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let recipes = config.components.clone();
        let components = recipes.keys().map(|id| (id.clone(), 0)).collect();
        let total_crafted = recipes.keys().map(|id| (id.clone(), 0)).collect();
        Self {
            recipes,
            components,
            total_crafted,
        }
    }

    /// Craft one component, paying its recipe cost.
    ///
    /// # Errors
    ///
    /// Unknown component, missing recipe, or insufficient resources. The
    /// ledger and inventory are unchanged on error.
    pub fn craft_component(&mut self, kind: &str, resources: &mut ResourceManager) -> ActionResult {
        if !self.components.contains_key(kind) {
            return Err(ActionError::InvalidComponentType(kind.to_string()));
        }
        let recipe = self
            .recipes
            .get(kind)
            .ok_or_else(|| ActionError::NoRecipe(kind.to_string()))?;

        if !resources.can_afford(&recipe.cost) {
            return Err(ActionError::InsufficientResources);
        }
        if !resources.spend(&recipe.cost) {
            return Err(ActionError::DeductionFailed);
        }

        *self.components.entry(kind.to_string()).or_insert(0) += 1;
        *self.total_crafted.entry(kind.to_string()).or_insert(0) += 1;
        tracing::debug!(component = kind, count = self.component(kind), "Crafted component");
        Ok(())
    }

    /// Whether the recipe exists and is affordable.
    #[must_use]
    pub fn can_craft(&self, kind: &str, resources: &ResourceManager) -> bool {
        self.recipes
            .get(kind)
            .is_some_and(|recipe| resources.can_afford(&recipe.cost))
    }

    /// Whether every listed component is in stock.
    #[must_use]
    pub fn has_components(&self, cost: &ComponentCost) -> bool {
        cost.iter()
            .all(|(id, &required)| self.component(id) >= required)
    }

    /// Deduct components, all or nothing.
    pub fn consume_components(&mut self, cost: &ComponentCost) -> bool {
        if !self.has_components(cost) {
            return false;
        }
        for (id, &amount) in cost {
            if let Some(count) = self.components.get_mut(id) {
                *count -= amount;
            }
        }
        true
    }

    /// Count in stock, 0 for unknown ids.
    #[must_use]
    pub fn component(&self, kind: &str) -> u32 {
        self.components.get(kind).copied().unwrap_or(0)
    }

    /// Inventory snapshot.
    #[must_use]
    pub fn all_components(&self) -> &BTreeMap<String, u32> {
        &self.components
    }

    /// Lifetime crafted count.
    #[must_use]
    pub fn total_crafted(&self, kind: &str) -> u64 {
        self.total_crafted.get(kind).copied().unwrap_or(0)
    }

    /// Recipe for a component.
    #[must_use]
    pub fn recipe(&self, kind: &str) -> Option<&ComponentRecipe> {
        self.recipes.get(kind)
    }

    /// Empty the inventory and counters.
    pub fn reset(&mut self) {
        self.components.values_mut().for_each(|c| *c = 0);
        self.total_crafted.values_mut().for_each(|c| *c = 0);
    }

    /// Snapshot for persistence.
    #[must_use]
    pub fn save_data(&self) -> CraftingSaveData {
        CraftingSaveData {
            components: self.components.clone(),
            total_crafted: self.total_crafted.clone(),
        }
    }

    /// Replace counts with saved ones.
    ///
    /// Components missing from the save, including every component when a
    /// map is empty, load as zero. Ids without a recipe are skipped.
    pub fn load_save_data(&mut self, data: &CraftingSaveData) {
        restore(&mut self.components, &data.components, "component count");
        restore(&mut self.total_crafted, &data.total_crafted, "crafted total");
    }
}

fn restore<T: Copy + Default>(
    target: &mut BTreeMap<String, T>,
    saved: &BTreeMap<String, T>,
    what: &str,
) {
    for (id, value) in target.iter_mut() {
        *value = saved.get(id).copied().unwrap_or_default();
    }
    for id in saved.keys().filter(|id| !target.contains_key(*id)) {
        tracing::warn!(id = %id, "Skipping saved {what} for unknown component");
    }
}
