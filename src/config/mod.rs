//! Configuration module for rubberpipe
//!
//! Two kinds of configuration live here:
//!
//! 1. [`Settings`]: process-wide settings loaded from `rubberpipe.toml`
//!    (state and staging directories, logging)
//! 2. [`AdapterConfig`]: one `(name, type, payload)` row per adapter instance,
//!    kept in a [`crate::stores::ConfigStore`] and fed to the hub
//!
//! ## Example Usage
//!
//! ```no_run
//! use rubberpipe::config;
//!
//! let settings = config::load_settings("rubberpipe.toml")?.resolve_paths();
//! println!("State directory: {:?}", settings.global.state_directory);
//! # Ok::<(), config::ConfigError>(())
//! ```

mod loader;
mod types;

pub use loader::{default_settings_path, load_settings, load_settings_or_default, ConfigError, Result};
pub use types::*;

use serde_json::Value;

/// Payload keys whose values are replaced before display
const SECRET_KEYS: [&str; 3] = ["password", "secret", "token"];

impl Settings {
    /// Expand `~` in every configured path
    pub fn resolve_paths(mut self) -> Self {
        self.global.state_directory = expand_tilde(&self.global.state_directory);
        self.global.staging_directory = expand_tilde(&self.global.staging_directory);
        self.global.log_directory = expand_tilde(&self.global.log_directory);
        self
    }
}

/// Copy of a payload with secret values masked as `*****`
///
/// Only used for display; the stored payload is never altered.
pub fn masked_payload(payload: &Value) -> Value {
    match payload {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let lowered = key.to_lowercase();
                    if SECRET_KEYS.iter().any(|secret| lowered.contains(secret)) {
                        (key.clone(), Value::String("*****".to_string()))
                    } else {
                        (key.clone(), masked_payload(value))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(masked_payload).collect()),
        other => other.clone(),
    }
}

/// Expand tilde (~) in path
pub fn expand_tilde(path: &std::path::Path) -> std::path::PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
