//! Configuration management for the staring-contest core.
//!
//! Provides persistent settings storage with schema versioning and
//! migrations. Configuration is stored in `~/.voidgaze/config.json`; a
//! missing file yields defaults and unknown fields are ignored, so the file
//! can be edited by hand or written by an older release.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::vision::tracker::{GazeConfig, GazeConfigError};

/// Current config schema version
const CURRENT_VERSION: u32 = 1;

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown config version: {0}")]
    UnknownVersion(u32),

    #[error("Invalid gaze parameters: {0}")]
    Gaze(#[from] GazeConfigError),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema version for migrations
    pub version: u32,
    /// Gaze/blink classification settings
    pub gaze: GazeConfig,
    /// Game rule settings
    pub game: GameConfig,
    /// Leaderboard settings
    pub ranking: RankingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            gaze: GazeConfig::default(),
            game: GameConfig::default(),
            ranking: RankingConfig::default(),
        }
    }
}

/// Game rule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Whether a pure blink ends the session (strict rule).
    ///
    /// Off by default: natural blinks should not cost the player the game.
    pub end_on_blink: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            end_on_blink: false,
        }
    }
}

/// Leaderboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Number of leaderboard entries to keep
    pub max_records: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { max_records: 10 }
    }
}

/// Get the path to the config file (~/.voidgaze/config.json)
pub fn get_config_path() -> PathBuf {
    home_dir_or_fallback().join(".voidgaze").join("config.json")
}

/// Get the path to the config directory (~/.voidgaze)
fn get_config_dir() -> PathBuf {
    home_dir_or_fallback().join(".voidgaze")
}

/// Get the home directory, falling back to /tmp if unavailable
fn home_dir_or_fallback() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        tracing::error!("Could not determine home directory, using /tmp");
        PathBuf::from("/tmp")
    })
}

/// Ensure the config directory exists
fn ensure_config_dir() -> Result<(), ConfigError> {
    let dir = get_config_dir();
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    Ok(())
}

impl Config {
    /// Load configuration from disk, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed, or
    /// migrated, or if the configured gaze parameters are invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&get_config_path())
    }

    /// Load configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        let migrated = migrate_config(config)?;

        // Bad thresholds are a startup failure, not something to discover
        // frame by frame.
        migrated.gaze.validate()?;

        Ok(migrated)
    }

    /// Save configuration to disk at the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory or file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        ensure_config_dir()?;
        self.save_to(&get_config_path())
    }

    /// Save configuration to an explicit path.
    ///
    /// # Errors
    ///
    /// See [`Config::save`].
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        tracing::info!("Config saved to {:?}", path);
        Ok(())
    }
}

/// Migrate configuration from older schema versions
fn migrate_config(mut config: Config) -> Result<Config, ConfigError> {
    let original_version = config.version;

    while config.version < CURRENT_VERSION {
        config = apply_migration(config)?;
    }

    if config.version > CURRENT_VERSION {
        return Err(ConfigError::UnknownVersion(config.version));
    }

    if config.version != original_version {
        tracing::info!(
            "Migrated config from version {} to {}",
            original_version,
            config.version
        );
    }

    Ok(config)
}

/// Apply a single migration step
fn apply_migration(mut config: Config) -> Result<Config, ConfigError> {
    match config.version {
        // Version 0 -> 1: initial migration (fields gained defaults)
        0 => {
            config.version = 1;
            Ok(config)
        }
        v => Err(ConfigError::UnknownVersion(v)),
    }
}
