use super::{snapshot_state, update_state, ConfigStore, Result, StoreError};
use crate::config::AdapterConfig;
use std::path::{Path, PathBuf};
use tracing::info;

/// Adapter configs kept in `adapters.json` as a name-sorted array
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub const FILE_NAME: &'static str = "adapters.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<state_dir>/adapters.json`
    pub fn in_dir(state_dir: &Path) -> Self {
        Self::new(state_dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonConfigStore {
    fn list(&self) -> Result<Vec<AdapterConfig>> {
        let mut configs: Vec<AdapterConfig> = snapshot_state(&self.path)?;
        configs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(configs)
    }

    fn add(&self, config: AdapterConfig) -> Result<()> {
        update_state(&self.path, |configs: &mut Vec<AdapterConfig>| {
            if configs.iter().any(|c| c.name == config.name) {
                return Err(StoreError::AlreadyExists(config.name.clone()));
            }
            info!(
                "Adding adapter config '{}' ({})",
                config.name, config.adapter_type
            );
            configs.push(config);
            configs.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(())
        })
    }

    fn remove(&self, name: &str) -> Result<bool> {
        update_state(&self.path, |configs: &mut Vec<AdapterConfig>| {
            let before = configs.len();
            configs.retain(|c| c.name != name);
            let removed = configs.len() != before;
            if removed {
                info!("Removed adapter config '{}'", name);
            }
            Ok(removed)
        })
    }
}
