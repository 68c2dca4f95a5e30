use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Root settings structure (`rubberpipe.toml`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub global: GlobalConfig,
}

/// Global settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Directory holding adapters.json and history.json
    #[serde(default = "default_state_directory")]
    pub state_directory: PathBuf,

    /// Where sources write artifacts unless their config sets `backup_dir`
    #[serde(default = "default_staging_directory")]
    pub staging_directory: PathBuf,

    /// Logging configuration
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_max_files")]
    pub log_max_files: u32,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            state_directory: default_state_directory(),
            staging_directory: default_staging_directory(),
            log_directory: default_log_directory(),
            log_level: default_log_level(),
            log_max_files: default_log_max_files(),
        }
    }
}

/// One configured adapter instance, as supplied by a config store
///
/// `payload` is opaque to the hub; the factory registered for
/// `adapter_type` parses it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AdapterConfig {
    /// Unique across sources and destinations
    pub name: String,

    #[serde(rename = "type")]
    pub adapter_type: String,

    #[serde(rename = "config", default)]
    pub payload: Value,
}

impl AdapterConfig {
    pub fn new(name: impl Into<String>, adapter_type: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            adapter_type: adapter_type.into(),
            payload,
        }
    }
}

// Default value functions

fn default_state_directory() -> PathBuf { PathBuf::from("~/.local/share/rubberpipe") }
fn default_staging_directory() -> PathBuf { std::env::temp_dir().join("rubberpipe") }
fn default_log_directory() -> PathBuf { PathBuf::from("~/.local/share/rubberpipe/logs") }
fn default_log_level() -> String { "info".to_string() }
fn default_log_max_files() -> u32 { 10 }
