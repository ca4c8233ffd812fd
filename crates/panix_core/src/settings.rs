//! Player preferences.
//!
//! Settings persist as a JSON object. Loading merges whatever keys the file
//! holds over the defaults, so files written by older builds stay valid.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::events::{EventBus, GameEvent};

/// Maximum player name length in characters.
pub const MAX_PLAYER_NAME_LEN: usize = 20;

/// Settings format version written by this build.
pub const SETTINGS_VERSION: &str = "0.1.0";

/// How large numbers are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    /// Plain digits with suffixes.
    #[default]
    Normal,
    /// Mantissa and exponent.
    Scientific,
    /// Exponent a multiple of three.
    Engineering,
}

impl NumberFormat {
    /// Setting value as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Scientific => "scientific",
            Self::Engineering => "engineering",
        }
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumberFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "scientific" => Ok(Self::Scientific),
            "engineering" => Ok(Self::Engineering),
            other => Err(format!("Invalid number format: {other}")),
        }
    }
}

/// Stored preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Display format for numbers.
    pub number_format: NumberFormat,
    /// Language code.
    pub language: String,
    /// Display name.
    pub player_name: String,
    /// Settings format version.
    pub version: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            number_format: NumberFormat::Normal,
            language: "en".to_string(),
            player_name: "Commander".to_string(),
            version: SETTINGS_VERSION.to_string(),
        }
    }
}

/// Setting keys as they appear in the stored JSON.
pub mod keys {
    /// [`super::Settings::number_format`].
    pub const NUMBER_FORMAT: &str = "numberFormat";
    /// [`super::Settings::language`].
    pub const LANGUAGE: &str = "language";
    /// [`super::Settings::player_name`].
    pub const PLAYER_NAME: &str = "playerName";
    /// [`super::Settings::version`].
    pub const VERSION: &str = "version";
}

/// Owns the settings and, optionally, the file they persist to.
#[derive(Debug, Clone, Default)]
pub struct SettingsManager {
    settings: Settings,
    path: Option<PathBuf>,
}

impl SettingsManager {
    /// In-memory settings with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings backed by a file, loaded now if it exists.
    ///
    /// A missing or unreadable file leaves the defaults in place.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut manager = Self {
            settings: Settings::default(),
            path: Some(path.clone()),
        };
        if path.exists() {
            if let Err(e) = manager.load_file(&path) {
                tracing::error!(path = %path.display(), error = %e, "Failed to load settings");
            }
        }
        manager
    }

    /// Merge a JSON object over the current settings.
    ///
    /// Unknown keys are ignored; invalid values are rejected per setter rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object.
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| GameError::DataParseError {
                path: "<settings>".to_string(),
                message: e.to_string(),
            })?;
        let serde_json::Value::Object(map) = value else {
            return Err(GameError::DataParseError {
                path: "<settings>".to_string(),
                message: "settings must be a JSON object".to_string(),
            });
        };

        for (key, value) in map {
            let Some(text) = value.as_str() else {
                tracing::warn!(key = %key, "Ignoring non-string setting");
                continue;
            };
            match key.as_str() {
                keys::NUMBER_FORMAT => self.settings.number_format = parse_number_format(text),
                keys::LANGUAGE => self.settings.language = text.to_string(),
                keys::PLAYER_NAME => {
                    if let Some(name) = clean_player_name(text) {
                        self.settings.player_name = name;
                    }
                }
                keys::VERSION => self.settings.version = text.to_string(),
                _ => tracing::debug!(key = %key, "Ignoring unknown setting"),
            }
        }
        Ok(())
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path).map_err(|e| GameError::io(path, e))?;
        self.load_json(&text)
    }

    /// Settings as pretty JSON.
    ///
    /// # Errors
    ///
    /// Serialization failure.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.settings).map_err(|e| GameError::InvalidState(e.to_string()))
    }

    /// Write to the backing file, if any.
    ///
    /// # Errors
    ///
    /// IO or serialization failure.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| GameError::io(path, e))
    }

    fn changed(&self, key: &str, events: &mut EventBus) {
        if let Err(e) = self.save() {
            tracing::error!(error = %e, "Failed to save settings");
        }
        tracing::debug!(key, "Setting updated");
        events.emit(GameEvent::SettingsUpdated {
            key: key.to_string(),
        });
    }

    /// Current settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Look up a setting by its stored key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            keys::NUMBER_FORMAT => Some(self.settings.number_format.to_string()),
            keys::LANGUAGE => Some(self.settings.language.clone()),
            keys::PLAYER_NAME => Some(self.settings.player_name.clone()),
            keys::VERSION => Some(self.settings.version.clone()),
            _ => None,
        }
    }

    /// Set a setting by its stored key. Returns `false` for unknown or
    /// read-only keys and rejected values.
    pub fn set(&mut self, key: &str, value: &str, events: &mut EventBus) -> bool {
        match key {
            keys::NUMBER_FORMAT => {
                self.set_number_format(value, events);
                true
            }
            keys::LANGUAGE => {
                self.set_language(value, events);
                true
            }
            keys::PLAYER_NAME => self.set_player_name(value, events),
            _ => false,
        }
    }

    /// Current number format.
    #[must_use]
    pub const fn number_format(&self) -> NumberFormat {
        self.settings.number_format
    }

    /// Set the number format. Unrecognized values fall back to normal.
    pub fn set_number_format(&mut self, format: &str, events: &mut EventBus) {
        self.settings.number_format = parse_number_format(format);
        self.changed(keys::NUMBER_FORMAT, events);
    }

    /// Current language code.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.settings.language
    }

    /// Set the language code.
    pub fn set_language(&mut self, language: &str, events: &mut EventBus) {
        self.settings.language = language.to_string();
        self.changed(keys::LANGUAGE, events);
    }

    /// Current player name.
    #[must_use]
    pub fn player_name(&self) -> &str {
        &self.settings.player_name
    }

    /// Set the player name, trimmed and cut to 20 characters.
    ///
    /// Blank names are rejected and return `false`.
    pub fn set_player_name(&mut self, name: &str, events: &mut EventBus) -> bool {
        let Some(name) = clean_player_name(name) else {
            return false;
        };
        self.settings.player_name = name;
        self.changed(keys::PLAYER_NAME, events);
        true
    }

    /// Restore defaults.
    pub fn reset(&mut self, events: &mut EventBus) {
        self.settings = Settings::default();
        if let Err(e) = self.save() {
            tracing::error!(error = %e, "Failed to save settings");
        }
        for key in [keys::NUMBER_FORMAT, keys::LANGUAGE, keys::PLAYER_NAME] {
            events.emit(GameEvent::SettingsUpdated {
                key: key.to_string(),
            });
        }
    }
}

fn parse_number_format(value: &str) -> NumberFormat {
    value.parse().unwrap_or_else(|e: String| {
        tracing::warn!("{e}, using 'normal'");
        NumberFormat::Normal
    })
}

fn clean_player_name(name: &str) -> Option<String> {
    if name.trim().is_empty() {
        tracing::warn!("Player name cannot be empty");
        return None;
    }
    let name = if name.chars().count() > MAX_PLAYER_NAME_LEN {
        tracing::warn!("Player name too long, truncating to {MAX_PLAYER_NAME_LEN} characters");
        name.chars().take(MAX_PLAYER_NAME_LEN).collect::<String>()
    } else {
        name.to_string()
    };
    Some(name.trim().to_string())
}
