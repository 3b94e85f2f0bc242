//! Application configuration and user preferences.

use crate::location::types::AccuracyTier;
use crate::recording::types::AutoPauseSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Unit system preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Metric units (km/h, km)
    #[default]
    Metric,
    /// Imperial units (mph, miles)
    Imperial,
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Units::Metric => write!(f, "Metric"),
            Units::Imperial => write!(f, "Imperial"),
        }
    }
}

impl Units {
    /// Convert a speed in m/s to the preferred display unit.
    pub fn convert_speed(&self, speed_ms: f64) -> (f64, &'static str) {
        match self {
            Units::Metric => (speed_ms * 3.6, "km/h"),
            Units::Imperial => (speed_ms * 2.23694, "mph"),
        }
    }

    /// Convert a distance in meters to the preferred display unit.
    pub fn convert_distance(&self, distance_m: f64) -> (f64, &'static str) {
        match self {
            Units::Metric => (distance_m / 1000.0, "km"),
            Units::Imperial => (distance_m / 1609.344, "mi"),
        }
    }
}

/// User-facing recording preferences.
///
/// May change mid-session; the recording service picks changes up on its
/// next loop iteration without a restart.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordingSettings {
    /// Unit system for display conversions
    pub units: Units,
    /// Positioning accuracy tier (sets the fix interval)
    pub accuracy: AccuracyTier,
    /// Auto-pause behavior
    pub auto_pause: AutoPauseSettings,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Recording preferences
    pub recording: RecordingSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            recording: RecordingSettings::default(),
        }
    }
}

impl AppConfig {
    /// Path of the ride database inside the data directory.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("rides.db")
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "ridetrack", "RideTrack")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from file.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = get_config_path();

    if !path.exists() {
        let config = AppConfig {
            data_dir: get_data_dir(),
            ..Default::default()
        };
        return Ok(config);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.data_dir = get_data_dir();

    Ok(config)
}

/// Save application configuration to file.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = get_config_path();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content = toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
