use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClearMindConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Unset means requests may wait indefinitely.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub state_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: "~/.config/clearmind/state.json".to_string(),
        }
    }
}

impl StorageConfig {
    /// `state_path` with `~` and `$VARS` expanded.
    pub fn resolved_state_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::full(&self.state_path).map_or_else(
            |e| {
                tracing::warn!(path = %self.state_path, error = %e, "Could not expand state path, using it verbatim");
                self.state_path.clone()
            },
            |p| p.into_owned(),
        ))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl ClearMindConfig {
    /// Layer defaults, an optional TOML file and `CLEARMIND_*` env vars
    /// (`CLEARMIND_API__BASE_URL`, ...), later sources winning.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("CLEARMIND")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        s.try_deserialize()
    }
}
