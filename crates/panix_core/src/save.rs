//! Versioned save files.
//!
//! A save combines every manager's save data under one version tag. JSON is
//! the interchange format; bincode snapshots of the same structure are used
//! by the headless tools for speed. Paths ending in `.json` select JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crafting::CraftingSaveData;
use crate::drones::DroneSaveData;
use crate::error::{GameError, Result};
use crate::game::Game;
use crate::resources::ResourceSaveData;
use crate::structures::StructureSaveData;

/// Save format version this build reads and writes.
pub const SAVE_VERSION: &str = "1.0";

/// Complete persisted game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    /// Format version.
    pub version: String,
    /// Host time of the save, milliseconds.
    pub timestamp: u64,
    /// Resource ledger.
    pub resources: ResourceSaveData,
    /// Component inventory.
    pub crafting: CraftingSaveData,
    /// Drones and deployments.
    pub drones: DroneSaveData,
    /// Structure table.
    pub structures: StructureSaveData,
    /// Simulated milliseconds played.
    #[serde(default)]
    pub elapsed_ms: f64,
}

/// Header fields, readable without restoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveInfo {
    /// Format version.
    pub version: String,
    /// Host time of the save, milliseconds.
    pub timestamp: u64,
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn check_version(found: &str) -> Result<()> {
    if found == SAVE_VERSION {
        Ok(())
    } else {
        Err(GameError::SaveVersionMismatch {
            expected: SAVE_VERSION.to_string(),
            found: found.to_string(),
        })
    }
}

impl SaveData {
    /// Snapshot a game.
    #[must_use]
    pub fn capture(game: &Game, timestamp: u64) -> Self {
        Self {
            version: SAVE_VERSION.to_string(),
            timestamp,
            resources: game.resources.save_data(),
            crafting: game.crafting.save_data(),
            drones: game.drones.save_data(),
            structures: game.structures.save_data(),
            elapsed_ms: game.elapsed_ms(),
        }
    }

    /// Load this snapshot into a game, replacing its state.
    ///
    /// Drones are re-placed onto a cleared grid. The structure table's
    /// `lastUpdateTime` becomes the reference for the next
    /// [`Game::resume`], so time spent away is credited.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::SaveVersionMismatch`] for other versions; the
    /// game is untouched in that case.
    pub fn restore(&self, game: &mut Game) -> Result<()> {
        check_version(&self.version)?;

        game.resources.load_save_data(&self.resources);
        game.crafting.load_save_data(&self.crafting);
        game.reload_drones(&self.drones);
        game.structures.load_save_data(&self.structures);
        game.set_progress(self.elapsed_ms, self.structures.last_update_time);

        tracing::info!(
            timestamp = self.timestamp,
            drones = game.drones.total_built(),
            structures = game.structures.len(),
            "Save restored"
        );
        Ok(())
    }

    /// Header of this save.
    #[must_use]
    pub fn info(&self) -> SaveInfo {
        SaveInfo {
            version: self.version.clone(),
            timestamp: self.timestamp,
        }
    }

    /// Encode as pretty JSON.
    ///
    /// # Errors
    ///
    /// Serialization failure.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| GameError::SaveFormat(e.to_string()))
    }

    /// Decode JSON, rejecting other versions.
    ///
    /// # Errors
    ///
    /// Malformed JSON or version mismatch.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: Self =
            serde_json::from_str(json).map_err(|e| GameError::SaveFormat(e.to_string()))?;
        check_version(&data.version)?;
        Ok(data)
    }

    /// Encode with bincode.
    ///
    /// # Errors
    ///
    /// Serialization failure.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::SaveFormat(format!("Failed to serialize save: {e}")))
    }

    /// Decode bincode, rejecting other versions.
    ///
    /// # Errors
    ///
    /// Malformed bytes or version mismatch.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let data: Self = bincode::deserialize(bytes)
            .map_err(|e| GameError::SaveFormat(format!("Failed to deserialize save: {e}")))?;
        check_version(&data.version)?;
        Ok(data)
    }

    /// Write to a file, JSON for `.json` paths and bincode otherwise.
    ///
    /// # Errors
    ///
    /// Encoding or IO failure.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = if is_json(path) {
            self.to_json()?.into_bytes()
        } else {
            self.to_bytes()?
        };
        std::fs::write(path, bytes).map_err(|e| GameError::io(path, e))?;
        tracing::info!(path = %path.display(), "Game saved");
        Ok(())
    }

    /// Read a file written by [`SaveData::save_to_path`].
    ///
    /// # Errors
    ///
    /// IO failure, malformed contents or version mismatch.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| GameError::io(path, e))?;
        let data = if is_json(path) {
            let text = String::from_utf8(bytes).map_err(|e| GameError::SaveFormat(e.to_string()))?;
            Self::from_json(&text)?
        } else {
            Self::from_bytes(&bytes)?
        };
        tracing::info!(path = %path.display(), timestamp = data.timestamp, "Save loaded");
        Ok(data)
    }
}

impl SaveInfo {
    /// Read only the header of a save file. Does not check the version.
    ///
    /// # Errors
    ///
    /// IO failure or malformed contents.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| GameError::io(path, e))?;
        if is_json(path) {
            serde_json::from_slice(&bytes).map_err(|e| GameError::SaveFormat(e.to_string()))
        } else {
            bincode::deserialize(&bytes).map_err(|e| GameError::SaveFormat(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BASIC_GATHERER, SOLAR_PANEL};

    fn played_game() -> Game {
        let mut game = Game::default();
        for id in ["iron", "silicon", "energy"] {
            game.add_resource(id, 500.0);
        }
        for kind in ["chassis", "circuit", "powerCore"] {
            game.craft_component(kind).unwrap();
            game.craft_component(kind).unwrap();
        }
        game.build_drone(BASIC_GATHERER).unwrap();
        game.build_drone(BASIC_GATHERER).unwrap();

        let energy = game
            .grid()
            .tiles()
            .find(|t| t.tile_type.id() == "energy")
            .map(|t| t.coord)
            .unwrap();
        game.deploy_drone(energy).unwrap();

        let empty = game
            .grid()
            .tiles()
            .find(|t| t.tile_type.is_empty())
            .map(|t| t.coord)
            .unwrap();
        game.build_structure(SOLAR_PANEL, empty, 77).unwrap();
        game.tick(1234.5);
        game
    }

    #[test]
    fn test_restore_reproduces_state() {
        let game = played_game();
        let data = SaveData::capture(&game, 1000);

        let mut restored = Game::default();
        data.restore(&mut restored).unwrap();

        assert_eq!(SaveData::capture(&restored, 1000), data);
        assert_eq!(restored.grid().total_deployed(), 1);
        assert_eq!(restored.drones().available_drones(), 1);
    }

    #[test]
    fn test_restore_over_existing_game_clears_drones() {
        let game = played_game();
        let data = SaveData::capture(&game, 0);

        let mut target = played_game();
        data.restore(&mut target).unwrap();
        assert_eq!(target.grid().total_deployed(), 1);
    }

    #[test]
    fn test_json_and_bincode_agree() {
        let data = SaveData::capture(&played_game(), 42);
        let from_json = SaveData::from_json(&data.to_json().unwrap()).unwrap();
        let from_bytes = SaveData::from_bytes(&data.to_bytes().unwrap()).unwrap();
        assert_eq!(from_json, data);
        assert_eq!(from_bytes, data);
    }

    #[test]
    fn test_json_shape() {
        let data = SaveData::capture(&played_game(), 42);
        let json: serde_json::Value = serde_json::from_str(&data.to_json().unwrap()).unwrap();
        assert_eq!(json["version"], "1.0");
        assert_eq!(json["timestamp"], 42);
        assert!(json["resources"]["resources"]["iron"].is_number());
        assert!(json["crafting"]["totalCrafted"].is_object());
        assert_eq!(json["drones"]["totalBuilt"], 2);
        assert_eq!(json["structures"]["structures"][0]["buildTime"], 77);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut data = SaveData::capture(&Game::default(), 0);
        data.version = "0.9".to_string();

        let mut game = Game::default();
        let err = data.restore(&mut game).unwrap_err();
        assert!(matches!(err, GameError::SaveVersionMismatch { .. }));

        let json = serde_json::to_string(&data).unwrap();
        assert!(SaveData::from_json(&json).is_err());
    }

    #[test]
    fn test_save_to_path_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let data = SaveData::capture(&played_game(), 9);

        for name in ["save.json", "save.bin"] {
            let path = dir.path().join(name);
            data.save_to_path(&path).unwrap();
            assert_eq!(SaveData::load_from_path(&path).unwrap(), data);
            let info = SaveInfo::read(&path).unwrap();
            assert_eq!(info, data.info());
        }

        let text = std::fs::read_to_string(dir.path().join("save.json")).unwrap();
        assert!(text.contains("\"availableDrones\""));
    }

    #[test]
    fn test_restore_then_resume_credits_offline_time() {
        let mut game = Game::default();
        game.resume(10_000);
        let data = SaveData::capture(&game, 10_000);

        let mut restored = Game::default();
        data.restore(&mut restored).unwrap();
        assert_eq!(restored.resume(15_000), 5_000);
        assert_eq!(restored.resources().resource("iron"), 5);
    }

    #[test]
    fn test_missing_file() {
        let err = SaveData::load_from_path("/nonexistent/panix.json").unwrap_err();
        assert!(matches!(err, GameError::Io { .. }));
    }
}
