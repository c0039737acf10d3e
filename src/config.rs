//! Configuration for the scroll tracker.
//!
//! Nothing here is required: with no config file and no environment
//! variables the tracker keeps its data next to the executable and redraws
//! four times a second.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the stats file location.
pub const DATA_FILE_ENV: &str = "SCROLL_TRACKER_DATA_FILE";

/// Default name of the stats file.
pub const DATA_FILE_NAME: &str = "scroll_data.json";

/// Main configuration for the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Explicit stats file location; `None` keeps it beside the executable
    pub data_file: Option<PathBuf>,

    /// Time between dashboard redraws
    #[serde(rename = "refresh_interval_ms", with = "duration_ms_serde")]
    pub refresh_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            refresh_interval: Duration::from_millis(250),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, using defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config.refresh_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "refresh_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scroll-tracker")
            .join("config.json")
    }

    /// Resolve where the stats file lives.
    ///
    /// The environment variable wins over the config file, which wins over
    /// the default location beside the executable.
    pub fn data_file_path(&self) -> PathBuf {
        self.resolve_data_file(std::env::var_os(DATA_FILE_ENV).map(PathBuf::from))
    }

    fn resolve_data_file(&self, env_override: Option<PathBuf>) -> PathBuf {
        if let Some(path) = env_override.filter(|p| !p.as_os_str().is_empty()) {
            return path;
        }
        if let Some(ref path) = self.data_file {
            return path.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DATA_FILE_NAME)
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::InvalidValue(e) => write!(f, "Invalid value: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration as whole milliseconds.
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
