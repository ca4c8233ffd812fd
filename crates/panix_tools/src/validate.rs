//! Config and override validation.
//!
//! Loads a full config (or the built-in content), merges an optional
//! override layer the same way the game does, then checks every entity and
//! the map layout. All problems are collected before reporting.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use panix_core::config::{ConfigManager, ConfigOverrides, GameConfig, CUSTOM_PREFIX};
use panix_core::error::GameError;

/// Why validation failed.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A file could not be read or parsed.
    #[error(transparent)]
    Load(#[from] GameError),

    /// The merged config has problems.
    #[error("{} problem(s) found:\n  {}", .0.len(), .0.join("\n  "))]
    Invalid(Vec<String>),
}

impl ValidationError {
    /// Every individual problem, one line each.
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        match self {
            Self::Load(e) => vec![e.to_string()],
            Self::Invalid(problems) => problems.clone(),
        }
    }
}

/// What a successful validation looked at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    /// Resource definitions.
    pub resources: usize,
    /// Tile type definitions.
    pub tile_types: usize,
    /// Component recipes.
    pub components: usize,
    /// Drone recipes.
    pub drones: usize,
    /// Structure definitions.
    pub structures: usize,
    /// Override entries the merge will skip, as `"kind 'id'"`.
    pub skipped_overrides: Vec<String>,
}

/// Override entries that introduce a new id without the custom prefix.
///
/// The merge drops these with a warning; the validator lists them.
#[must_use]
pub fn skipped_overrides(base: &GameConfig, overrides: &ConfigOverrides) -> Vec<String> {
    fn collect<T, U>(
        kind: &str,
        base: &BTreeMap<String, T>,
        layer: &BTreeMap<String, U>,
        out: &mut Vec<String>,
    ) {
        out.extend(
            layer
                .keys()
                .filter(|id| !base.contains_key(*id) && !id.starts_with(CUSTOM_PREFIX))
                .map(|id| format!("{kind} '{id}'")),
        );
    }

    let mut skipped = Vec::new();
    collect("resource", &base.resources, &overrides.resources, &mut skipped);
    collect("tile type", &base.tile_types, &overrides.tile_types, &mut skipped);
    collect("structure", &base.structures, &overrides.structures, &mut skipped);
    collect("drone", &base.drones, &overrides.drones, &mut skipped);
    skipped
}

/// Validate an already resolved config.
///
/// # Errors
///
/// Returns [`ValidationError::Invalid`] listing every problem found.
pub fn validate_config(config: &GameConfig) -> Result<ValidationSummary, ValidationError> {
    let report = ConfigManager::new(config).validate_all();
    if !report.is_valid() {
        return Err(ValidationError::Invalid(report.errors));
    }

    Ok(ValidationSummary {
        resources: config.resources.len(),
        tile_types: config.tile_types.len(),
        components: config.components.len(),
        drones: config.drones.len(),
        structures: config.structures.len(),
        skipped_overrides: Vec::new(),
    })
}

/// Load a config file (or the built-in content) plus an optional override
/// file, merge them and validate the result.
///
/// # Errors
///
/// Returns [`ValidationError::Load`] if a file cannot be read or parsed and
/// [`ValidationError::Invalid`] if the merged config has problems.
pub fn validate_files(
    config_path: Option<&Path>,
    overrides_path: Option<&Path>,
) -> Result<ValidationSummary, ValidationError> {
    let base = match config_path {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            GameConfig::load(path)?
        }
        None => {
            tracing::info!("Using built-in config");
            GameConfig::default()
        }
    };

    let (config, skipped) = match overrides_path {
        Some(path) => {
            tracing::info!("Applying overrides from {}", path.display());
            let overrides = ConfigOverrides::load(path)?;
            let skipped = skipped_overrides(&base, &overrides);
            (base.with_overrides(overrides), skipped)
        }
        None => (base, Vec::new()),
    };

    let mut summary = validate_config(&config)?;
    summary.skipped_overrides = skipped;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_config_is_valid() {
        let summary = validate_files(None, None).unwrap();
        assert_eq!(summary.resources, 3);
        assert_eq!(summary.components, 3);
        assert_eq!(summary.drones, 1);
        assert!(summary.skipped_overrides.is_empty());
    }

    #[test]
    fn test_all_problems_reported() {
        let mut config = GameConfig::default();
        if let Some(drone) = config.drones.get_mut("basicGatherer") {
            drone.components.insert("flux".to_string(), 1);
        }
        if let Some(structure) = config.structures.get_mut("solarPanel") {
            structure.costs.insert("mithril".to_string(), 3);
        }

        let err = validate_config(&config).unwrap_err();
        let problems = err.problems();
        assert!(problems.len() >= 2, "{problems:?}");
        assert!(problems.iter().any(|p| p.contains("flux")));
        assert!(problems.iter().any(|p| p.contains("mithril")));
        assert!(err.to_string().contains("problem(s) found"));
    }

    #[test]
    fn test_override_file_merged_and_skips_listed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.ron");
        std::fs::write(
            &path,
            r#"(
                resources: {
                    "custom_crystal": (id: "custom_crystal", name: "Crystal", icon: "C"),
                    "gold": (id: "gold", name: "Gold", icon: "G"),
                },
            )"#,
        )
        .unwrap();

        let summary = validate_files(None, Some(&path)).unwrap();
        assert_eq!(summary.resources, 4);
        assert_eq!(summary.skipped_overrides, vec!["resource 'gold'".to_string()]);
    }

    #[test]
    fn test_config_file_round_trip_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ron");
        std::fs::write(&path, GameConfig::default().to_ron_string().unwrap()).unwrap();
        assert!(validate_files(Some(&path), None).is_ok());
    }

    #[test]
    fn test_unparseable_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        std::fs::write(&path, "(resources: {").unwrap();
        let err = validate_files(Some(&path), None).unwrap_err();
        assert!(matches!(err, ValidationError::Load(GameError::DataParseError { .. })));
    }

    #[test]
    fn test_missing_override_file_is_load_error() {
        let err = validate_files(None, Some(Path::new("/nope/overrides.ron"))).unwrap_err();
        assert!(matches!(err, ValidationError::Load(GameError::Io { .. })));
    }
}
