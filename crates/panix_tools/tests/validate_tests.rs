//! Validator behavior against fixture configs.

use panix_core::config::GameConfig;
use panix_core::data::MapData;
use panix_test_utils::fixtures::starting_only_config;
use panix_tools::validate::{validate_config, ValidationError};

#[test]
fn single_tile_map_is_valid() {
    let summary = validate_config(&starting_only_config()).unwrap();
    assert_eq!(summary.structures, GameConfig::default().structures.len());
}

#[test]
fn unknown_layout_cell_is_reported() {
    let mut map = MapData::starting_only();
    map.layout[0].push("lava".to_string());
    map.width += 1;
    let config = GameConfig {
        map,
        ..GameConfig::default()
    };

    let err = validate_config(&config).unwrap_err();
    assert!(matches!(err, ValidationError::Invalid(_)));
    assert!(err.problems().iter().any(|p| p.contains("lava")), "{err}");
}
