//! Hex map tiles and drone occupancy.
//!
//! The grid is built once from the map layout and never changes shape
//! during a session. Only drone counts mutate, and only through the
//! accessors here.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::data::{TileTypeData, EMPTY_CELL, START_CELL};
use crate::hex::HexCoord;

/// Resource classification of a tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    /// Barren tile, drones cannot mine it. Structures can usually be built here.
    Empty,
    /// Tile yielding the named resource when drones are deployed. The tile
    /// type id equals the resource id.
    Resource(String),
    /// Tile type whose id differs from what it produces.
    Custom {
        /// Tile type id.
        id: String,
        /// Resource produced, `None` for barren tiles.
        resource: Option<String>,
    },
}

impl TileType {
    /// Interpret a layout cell against the tile type definitions.
    ///
    /// The starting base mines iron. Cells without a definition are read as
    /// the resource of the same name.
    #[must_use]
    pub fn from_cell(cell: &str, tile_types: &BTreeMap<String, TileTypeData>) -> Self {
        match cell {
            EMPTY_CELL => return Self::Empty,
            START_CELL => return Self::Resource("iron".to_string()),
            _ => {}
        }
        let Some(data) = tile_types.get(cell) else {
            tracing::warn!(cell, "Layout cell has no tile type definition");
            return Self::Resource(cell.to_string());
        };
        match data.resource_produced.as_deref() {
            Some(resource) if resource == cell => Self::Resource(resource.to_string()),
            resource => Self::Custom {
                id: cell.to_string(),
                resource: resource.map(str::to_string),
            },
        }
    }

    /// Tile type id as used by layouts and `buildable_on` lists.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Empty => EMPTY_CELL,
            Self::Resource(resource) => resource,
            Self::Custom { id, .. } => id,
        }
    }

    /// Resource produced, `None` for barren tiles.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Resource(resource) => Some(resource),
            Self::Custom { resource, .. } => resource.as_deref(),
        }
    }

    /// Whether drones have nothing to mine here.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resource().is_none()
    }
}

/// One cell of the hex map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Axial position.
    pub coord: HexCoord,
    /// Resource classification.
    pub tile_type: TileType,
    /// Drones currently deployed, `0..=max_drones`.
    pub drones: u32,
    /// Capacity.
    pub max_drones: u32,
    /// Whether this is the starting base.
    pub is_starting: bool,
}

impl Tile {
    /// Whether the tile has room for another drone.
    #[must_use]
    pub const fn has_capacity(&self) -> bool {
        self.drones < self.max_drones
    }
}

/// Fixed lookup table of tiles keyed by axial coordinate.
#[derive(Debug, Clone)]
pub struct HexGrid {
    tiles: HashMap<HexCoord, Tile>,
    /// Layout (row-major) order, for deterministic iteration.
    order: Vec<HexCoord>,
    width: u32,
    height: u32,
    starting: Option<HexCoord>,
    starting_tile_rate: f64,
    drone_generation_rate: f64,
}

impl HexGrid {
    /// Build every tile from the config's layout and tile types.
    ///
    /// The first `"start"` cell becomes the starting base and mines iron.
    /// Further `"start"` cells are treated as plain iron tiles.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let map = &config.map;
        let balance = &config.balance;
        let mut tiles = HashMap::with_capacity(map.layout.len() * map.width as usize);
        let mut order = Vec::with_capacity(tiles.capacity());
        let mut starting = None;

        for (coord, cell) in map.cells() {
            let is_starting = cell == START_CELL && starting.is_none();
            if is_starting {
                starting = Some(coord);
            } else if cell == START_CELL {
                tracing::warn!(%coord, "Extra starting cell in layout, treating as iron");
            }

            tiles.insert(
                coord,
                Tile {
                    coord,
                    tile_type: TileType::from_cell(cell, &config.tile_types),
                    drones: 0,
                    max_drones: balance.drones.max_drones_per_tile,
                    is_starting,
                },
            );
            order.push(coord);
        }

        tracing::debug!(
            tiles = order.len(),
            starting = ?starting,
            "Hex grid initialized"
        );

        Self {
            tiles,
            order,
            width: map.width,
            height: map.height,
            starting,
            starting_tile_rate: balance.resources.starting_tile_rate,
            drone_generation_rate: balance.resources.drone_generation_rate,
        }
    }

    /// Layout width in columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Layout height in rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the grid has no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tile at a coordinate.
    #[must_use]
    pub fn tile(&self, coord: HexCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    /// All tiles in layout order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.order.iter().filter_map(|coord| self.tiles.get(coord))
    }

    /// The starting base tile.
    #[must_use]
    pub fn starting_tile(&self) -> Option<&Tile> {
        self.starting.and_then(|coord| self.tiles.get(&coord))
    }

    /// Set a tile's drone count, clamped to `[0, max_drones]`.
    ///
    /// Unknown coordinates are ignored.
    pub fn set_drone_count(&mut self, coord: HexCoord, count: u32) {
        if let Some(tile) = self.tiles.get_mut(&coord) {
            tile.drones = count.min(tile.max_drones);
        }
    }

    /// Add one drone if the tile is under capacity.
    pub fn add_drone(&mut self, coord: HexCoord) -> bool {
        match self.tiles.get_mut(&coord) {
            Some(tile) if tile.has_capacity() => {
                tile.drones += 1;
                true
            }
            _ => false,
        }
    }

    /// Whether a drone may be deployed: a non-starting resource tile with room.
    #[must_use]
    pub fn can_deploy(&self, coord: HexCoord) -> bool {
        self.tiles.get(&coord).is_some_and(|tile| {
            !tile.tile_type.is_empty() && !tile.is_starting && tile.has_capacity()
        })
    }

    /// Resources per second produced by a tile.
    ///
    /// The starting base yields a fixed rate, resource tiles yield per drone,
    /// empty or unknown tiles yield nothing.
    #[must_use]
    pub fn generation_rate(&self, coord: HexCoord) -> f64 {
        match self.tiles.get(&coord) {
            Some(tile) if tile.is_starting => self.starting_tile_rate,
            Some(tile) if !tile.tile_type.is_empty() => {
                f64::from(tile.drones) * self.drone_generation_rate
            }
            _ => 0.0,
        }
    }

    /// Total drones deployed across all tiles.
    #[must_use]
    pub fn total_deployed(&self) -> u32 {
        self.tiles.values().map(|t| t.drones).sum()
    }

    /// Remove every deployed drone.
    pub fn clear_drones(&mut self) {
        for tile in self.tiles.values_mut() {
            tile.drones = 0;
        }
    }
}
