//! Error types for the game core.
//!
//! Two families live here:
//! - [`ActionError`] - player-facing failures of craft/build/deploy actions.
//!   The `Display` text is what the UI shows verbatim.
//! - [`GameError`] - infrastructure failures (data files, save files, config).

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Outcome of a player action. `Ok(())` means the state transition happened.
pub type ActionResult = std::result::Result<(), ActionError>;

/// Why a player action was rejected.
///
/// Every variant leaves game state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Component id not present in the recipe table.
    #[error("Invalid component type: {0}")]
    InvalidComponentType(String),

    /// Component id known to the inventory but missing a recipe.
    #[error("No recipe found for: {0}")]
    NoRecipe(String),

    /// Drone id not present in the recipe table.
    #[error("Unknown drone type: {0}")]
    UnknownDroneType(String),

    /// Not enough resources for a cost.
    #[error("Insufficient resources")]
    InsufficientResources,

    /// Ledger refused the deduction after the affordability check passed.
    #[error("Failed to deduct resources")]
    DeductionFailed,

    /// Not enough components for a drone recipe.
    #[error("Insufficient components")]
    InsufficientComponents,

    /// Inventory refused the deduction after the sufficiency check passed.
    #[error("Failed to consume components")]
    ConsumptionFailed,

    /// No built drones waiting in the pool.
    #[error("No drones available")]
    NoDronesAvailable,

    /// Coordinate outside the grid.
    #[error("Invalid tile")]
    InvalidTile,

    /// Deployment targeted the starting base.
    #[error("Cannot deploy to starting tile")]
    StartingTile,

    /// Deployment targeted a tile without a resource.
    #[error("Cannot deploy to empty tile")]
    EmptyTile,

    /// Tile already holds `max_drones`.
    #[error("Tile at maximum capacity")]
    TileAtCapacity,

    /// Grid refused the drone after the capacity check passed.
    #[error("Failed to deploy drone")]
    DeployFailed,

    /// Removal from a tile without drones.
    #[error("No drones on this tile")]
    NoDronesOnTile,

    /// Structure id not present in the structure table.
    #[error("Unknown structure type")]
    UnknownStructureType,

    /// Coordinate already holds a structure.
    #[error("Tile already has a structure")]
    TileOccupied,

    /// Structure's `buildable_on` list excludes the tile type.
    #[error("Cannot build on this tile type")]
    IneligibleTileType,

    /// No structure at the coordinate.
    #[error("No structure on this tile")]
    NoStructure,
}

/// Top-level error type for infrastructure failures.
#[derive(Debug, Error)]
pub enum GameError {
    /// Filesystem error while reading or writing game data.
    #[error("IO error for '{path}': {source}")]
    Io {
        /// Path involved in the failed operation.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Save data could not be encoded or decoded.
    #[error("Save data error: {0}")]
    SaveFormat(String),

    /// Save file was written by an incompatible version.
    #[error("Save version mismatch: expected {expected}, found {found}")]
    SaveVersionMismatch {
        /// Version this build reads.
        expected: String,
        /// Version stored in the file.
        found: String,
    },

    /// Configuration failed validation.
    #[error("Invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

impl GameError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
