//! Test fixtures and helpers.
//!
//! Pre-built games, configs and tiles for consistent testing.

use panix_core::config::GameConfig;
use panix_core::data::{MapData, BASIC_GATHERER};
use panix_core::game::Game;
use panix_core::grid::{Tile, TileType};
use panix_core::hex::HexCoord;

/// Component ids of the built-in recipes, in crafting order.
pub const COMPONENTS: [&str; 3] = ["chassis", "circuit", "powerCore"];

/// Default config with a map holding only the starting tile.
#[must_use]
pub fn starting_only_config() -> GameConfig {
    GameConfig {
        map: MapData::starting_only(),
        ..GameConfig::default()
    }
}

/// A game on the single-tile map.
#[must_use]
pub fn starting_only_game() -> Game {
    Game::new(starting_only_config())
}

/// A default game with the given resource amounts.
#[must_use]
pub fn game_with_resources(iron: f64, silicon: f64, energy: f64) -> Game {
    let mut game = Game::default();
    game.add_resource("iron", iron);
    game.add_resource("silicon", silicon);
    game.add_resource("energy", energy);
    game
}

/// A default game holding `count` undeployed basic gatherers and no
/// leftover resources.
///
/// # Panics
///
/// Panics if the built-in recipes cannot produce the drones.
#[must_use]
pub fn game_with_drones(count: u32) -> Game {
    let n = f64::from(count);
    let mut game = game_with_resources(60.0 * n, 50.0 * n, 20.0 * n);
    for _ in 0..count {
        for kind in COMPONENTS {
            game.craft_component(kind).expect("fixture craft");
        }
        game.build_drone(BASIC_GATHERER).expect("fixture drone");
    }
    game
}

/// First non-starting tile of a type in layout order.
///
/// # Panics
///
/// Panics if the map has no such tile.
#[must_use]
pub fn first_tile_of(game: &Game, tile_type: &str) -> HexCoord {
    game.grid()
        .tiles()
        .find(|t| t.tile_type.id() == tile_type && !t.is_starting)
        .map(|t| t.coord)
        .unwrap_or_else(|| panic!("no '{tile_type}' tile on the map"))
}

/// The starting tile's coordinate.
///
/// # Panics
///
/// Panics if the map has no starting tile.
#[must_use]
pub fn starting_coord(game: &Game) -> HexCoord {
    game.grid()
        .starting_tile()
        .map(|t| t.coord)
        .expect("map has a starting tile")
}

/// A free-standing empty tile.
#[must_use]
pub fn empty_tile(q: i32, r: i32) -> Tile {
    Tile {
        coord: HexCoord::new(q, r),
        tile_type: TileType::Empty,
        drones: 0,
        max_drones: 10,
        is_starting: false,
    }
}

/// A free-standing resource tile.
#[must_use]
pub fn resource_tile(q: i32, r: i32, resource: &str) -> Tile {
    Tile {
        tile_type: TileType::Resource(resource.to_string()),
        ..empty_tile(q, r)
    }
}
