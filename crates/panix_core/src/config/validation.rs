//! Validation and dependency checks for config entities.

use crate::data::{DroneRecipe, ResourceData, StructureData, TileTypeData, ENERGY_PER_SECOND};

use super::GameConfig;

/// Kind of config entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A ledger resource.
    Resource,
    /// A map tile type.
    TileType,
    /// A placeable structure.
    Structure,
    /// A drone recipe.
    Drone,
}

/// Outcome of validating one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems found, empty when valid.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Whether no problems were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }
}

/// Letters, digits, hyphen and underscore only.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Validates config entities against a resolved [`GameConfig`].
///
/// `is_edit` marks an entity that replaces an existing definition, which
/// skips the uniqueness check.
#[derive(Debug, Clone, Copy)]
pub struct ConfigManager<'a> {
    config: &'a GameConfig,
}

impl<'a> ConfigManager<'a> {
    /// Validate against the given config.
    #[must_use]
    pub const fn new(config: &'a GameConfig) -> Self {
        Self { config }
    }

    fn check_common(
        report: &mut ValidationReport,
        label: &str,
        id: &str,
        name: &str,
        exists: bool,
        is_edit: bool,
    ) {
        if id.is_empty() {
            report.push(format!("{label} ID is required"));
        }
        if name.is_empty() {
            report.push(format!("{label} name is required"));
        }
        if !id.is_empty() && !is_valid_id(id) {
            report.push(format!(
                "{label} ID must contain only letters, numbers, hyphens, and underscores"
            ));
        }
        if exists && !is_edit {
            report.push(format!("{label} ID '{id}' is already in use"));
        }
    }

    /// Validate a resource definition.
    #[must_use]
    pub fn validate_resource(&self, resource: &ResourceData, is_edit: bool) -> ValidationReport {
        let mut report = ValidationReport::default();
        Self::check_common(
            &mut report,
            "Resource",
            &resource.id,
            &resource.name,
            self.config.resources.contains_key(&resource.id),
            is_edit,
        );
        if resource.icon.is_empty() {
            report.push("Resource icon is required");
        }
        if !resource.base_rate.is_finite() {
            report.push("Base rate must be a number");
        }
        report
    }

    /// Validate a tile type definition.
    #[must_use]
    pub fn validate_tile_type(&self, tile: &TileTypeData, is_edit: bool) -> ValidationReport {
        let mut report = ValidationReport::default();
        Self::check_common(
            &mut report,
            "Tile type",
            &tile.id,
            &tile.name,
            self.config.tile_types.contains_key(&tile.id),
            is_edit,
        );
        if let Some(resource) = &tile.resource_produced {
            if !self.config.resources.contains_key(resource) {
                report.push(format!("Resource '{resource}' does not exist"));
            }
        }
        if !tile.base_rate.is_finite() {
            report.push("Base rate must be a number");
        }
        report
    }

    /// Validate a structure definition.
    #[must_use]
    pub fn validate_structure(&self, structure: &StructureData, is_edit: bool) -> ValidationReport {
        let mut report = ValidationReport::default();
        Self::check_common(
            &mut report,
            "Structure",
            &structure.id,
            &structure.name,
            self.config.structures.contains_key(&structure.id),
            is_edit,
        );
        for resource in structure.costs.keys() {
            if !self.config.resources.contains_key(resource) {
                report.push(format!("Cost resource '{resource}' does not exist"));
            }
        }
        if structure.stats.contains_key(ENERGY_PER_SECOND)
            && !self.config.resources.contains_key("energy")
        {
            report.push("Energy resource does not exist");
        }
        for resource in structure.produced_resources() {
            if resource != "energy" && !self.config.resources.contains_key(resource) {
                report.push(format!("Production resource '{resource}' does not exist"));
            }
        }
        for tile in &structure.buildable_on {
            if !self.config.tile_types.contains_key(tile) {
                report.push(format!("Tile type '{tile}' does not exist"));
            }
        }
        report
    }

    /// Validate a drone definition.
    #[must_use]
    pub fn validate_drone(&self, drone: &DroneRecipe, is_edit: bool) -> ValidationReport {
        let mut report = ValidationReport::default();
        Self::check_common(
            &mut report,
            "Drone",
            &drone.id,
            &drone.name,
            self.config.drones.contains_key(&drone.id),
            is_edit,
        );
        for component in drone.components.keys() {
            if !self.config.components.contains_key(component) {
                report.push(format!("Invalid component type '{component}'"));
            }
        }
        report
    }

    /// Entities that reference `id`, which block its deletion.
    #[must_use]
    pub fn check_dependencies(&self, kind: EntityKind, id: &str) -> Vec<String> {
        let mut dependencies = Vec::new();
        match kind {
            EntityKind::Resource => {
                for (tile_id, tile) in &self.config.tile_types {
                    if tile.resource_produced.as_deref() == Some(id) {
                        dependencies.push(format!("Tile type '{tile_id}' produces this resource"));
                    }
                }
                for (structure_id, structure) in &self.config.structures {
                    if structure.costs.contains_key(id) {
                        dependencies
                            .push(format!("Structure '{structure_id}' requires this resource"));
                    }
                }
                for (component_id, recipe) in &self.config.components {
                    if recipe.cost.contains_key(id) {
                        dependencies
                            .push(format!("Component '{component_id}' requires this resource"));
                    }
                }
            }
            EntityKind::TileType => {
                let used = self.config.map.cells().filter(|(_, cell)| *cell == id).count();
                if used > 0 {
                    dependencies.push(format!("{used} map tiles use this type"));
                }
                for (structure_id, structure) in &self.config.structures {
                    if structure.can_build_on(id) {
                        dependencies
                            .push(format!("Structure '{structure_id}' can be built on this type"));
                    }
                }
            }
            EntityKind::Structure | EntityKind::Drone => {}
        }
        dependencies
    }

    /// Validate every entity and the map layout of the config.
    ///
    /// Each entity is checked as an edit of itself.
    #[must_use]
    pub fn validate_all(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        let mut absorb = |prefix: &str, entity: ValidationReport| {
            for error in entity.errors {
                report.push(format!("{prefix}: {error}"));
            }
        };

        for resource in self.config.resources.values() {
            absorb(
                &format!("resource '{}'", resource.id),
                self.validate_resource(resource, true),
            );
        }
        for tile in self.config.tile_types.values() {
            absorb(
                &format!("tile type '{}'", tile.id),
                self.validate_tile_type(tile, true),
            );
        }
        for structure in self.config.structures.values() {
            absorb(
                &format!("structure '{}'", structure.id),
                self.validate_structure(structure, true),
            );
        }
        for drone in self.config.drones.values() {
            absorb(
                &format!("drone '{}'", drone.id),
                self.validate_drone(drone, true),
            );
        }
        for recipe in self.config.components.values() {
            for resource in recipe.cost.keys() {
                if !self.config.resources.contains_key(resource) {
                    absorb(
                        &format!("component '{}'", recipe.id),
                        ValidationReport {
                            errors: vec![format!("Cost resource '{resource}' does not exist")],
                        },
                    );
                }
            }
        }

        absorb("map", ValidationReport { errors: self.config.map.problems() });
        for (coord, cell) in self.config.map.cells() {
            if cell != crate::data::START_CELL && !self.config.tile_types.contains_key(cell) {
                absorb(
                    "map",
                    ValidationReport {
                        errors: vec![format!("Tile {coord} uses unknown type '{cell}'")],
                    },
                );
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cost_of;

    fn resource(id: &str) -> ResourceData {
        ResourceData::new(id, "*", 1.0)
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        let report = ConfigManager::new(&config).validate_all();
        assert!(report.is_valid(), "{:?}", report.errors);
    }

    #[test]
    fn test_resource_id_format_and_uniqueness() {
        let config = GameConfig::default();
        let manager = ConfigManager::new(&config);

        assert!(manager.validate_resource(&resource("custom_gold"), false).is_valid());

        let report = manager.validate_resource(&resource("bad id!"), false);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("only letters, numbers")));

        let report = manager.validate_resource(&resource("iron"), false);
        assert_eq!(report.errors, vec!["Resource ID 'iron' is already in use"]);
        assert!(manager.validate_resource(&resource("iron"), true).is_valid());
    }

    #[test]
    fn test_resource_required_fields() {
        let config = GameConfig::default();
        let manager = ConfigManager::new(&config);
        let empty = ResourceData {
            id: String::new(),
            name: String::new(),
            icon: String::new(),
            base_rate: f64::NAN,
        };
        let report = manager.validate_resource(&empty, false);
        assert!(report.errors.contains(&"Resource ID is required".to_string()));
        assert!(report.errors.contains(&"Resource name is required".to_string()));
        assert!(report.errors.contains(&"Resource icon is required".to_string()));
        assert!(report.errors.contains(&"Base rate must be a number".to_string()));
    }

    #[test]
    fn test_tile_type_unknown_resource() {
        let config = GameConfig::default();
        let tile = TileTypeData {
            id: "custom_crystal".to_string(),
            name: "Crystal".to_string(),
            resource_produced: Some("crystal".to_string()),
            base_rate: 1.0,
        };
        let report = ConfigManager::new(&config).validate_tile_type(&tile, false);
        assert_eq!(report.errors, vec!["Resource 'crystal' does not exist"]);
    }

    #[test]
    fn test_structure_unknown_cost_and_production() {
        let config = GameConfig::default();
        let mut structure = StructureData::builtin().remove(0);
        structure.id = "custom_mine".to_string();
        structure.costs.insert("gold".to_string(), 5);
        structure.stats.insert("uraniumPerSecond".to_string(), 1.0);

        let report = ConfigManager::new(&config).validate_structure(&structure, false);
        assert!(report
            .errors
            .contains(&"Cost resource 'gold' does not exist".to_string()));
        assert!(report
            .errors
            .contains(&"Production resource 'uranium' does not exist".to_string()));
    }

    #[test]
    fn test_drone_invalid_component() {
        let config = GameConfig::default();
        let drone = DroneRecipe {
            id: "custom_tank".to_string(),
            name: "Tank".to_string(),
            description: String::new(),
            components: cost_of(&[("chassis", 1), ("turret", 1)]),
            build_time: 0,
        };
        let report = ConfigManager::new(&config).validate_drone(&drone, false);
        assert_eq!(report.errors, vec!["Invalid component type 'turret'"]);
    }

    #[test]
    fn test_resource_dependencies() {
        let config = GameConfig::default();
        let deps = ConfigManager::new(&config).check_dependencies(EntityKind::Resource, "iron");
        assert!(deps.contains(&"Tile type 'iron' produces this resource".to_string()));
        assert!(deps.contains(&"Structure 'solarPanel' requires this resource".to_string()));
        assert!(deps.contains(&"Component 'chassis' requires this resource".to_string()));
    }

    #[test]
    fn test_tile_type_dependencies() {
        let config = GameConfig::default();
        let deps = ConfigManager::new(&config).check_dependencies(EntityKind::TileType, "empty");
        assert!(deps.iter().any(|d| d.ends_with("map tiles use this type")));
        assert!(deps
            .iter()
            .any(|d| d.contains("Structure 'solarPanel' can be built")));

        let none = ConfigManager::new(&config).check_dependencies(EntityKind::Drone, "basicGatherer");
        assert!(none.is_empty());
    }

    #[test]
    fn test_validate_all_flags_unknown_layout_cell() {
        let mut config = GameConfig::default();
        config.map.layout[0][0] = "lava".to_string();
        let report = ConfigManager::new(&config).validate_all();
        assert_eq!(report.errors, vec!["map: Tile 0,0 uses unknown type 'lava'"]);
    }
}
