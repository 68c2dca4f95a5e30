use super::types::*;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse settings file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "warning", "error"];

/// Load and validate settings from a TOML file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&contents)?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Load settings from an explicit path, or from the default location
///
/// An explicit path must exist. Without one, a missing default file
/// yields built-in defaults.
pub fn load_settings_or_default(path: Option<&Path>) -> Result<Settings> {
    if let Some(path) = path {
        return load_settings(path);
    }

    match default_settings_path() {
        Some(default_path) if default_path.exists() => load_settings(default_path),
        _ => Ok(Settings::default()),
    }
}

/// `~/.config/rubberpipe/rubberpipe.toml` on Linux
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rubberpipe").join("rubberpipe.toml"))
}

/// Validate the settings
fn validate_settings(settings: &Settings) -> Result<()> {
    let global = &settings.global;

    if !LOG_LEVELS.contains(&global.log_level.to_lowercase().as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "Unknown log_level '{}' (expected one of: trace, debug, info, warn, error)",
            global.log_level
        )));
    }

    if global.log_max_files == 0 {
        return Err(ConfigError::ValidationError(
            "log_max_files must be at least 1".to_string(),
        ));
    }

    if global.state_directory.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "state_directory must not be empty".to_string(),
        ));
    }

    Ok(())
}
