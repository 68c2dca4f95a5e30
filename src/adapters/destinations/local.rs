//! Local directory destination
//!
//! Artifacts are copied into `base_dir` under their own file name, and that
//! file name is the stored identifier. Two artifacts with the same name
//! overwrite each other.

use crate::adapters::DestinationAdapter;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Payload accepted by the `local` adapter type
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalConfig {
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LocalDestination {
    base_dir: PathBuf,
}

impl LocalDestination {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn from_config(payload: &Value) -> Result<Self> {
        let config: LocalConfig =
            serde_json::from_value(payload.clone()).context("Invalid local config")?;

        if config.base_dir.as_os_str().is_empty() {
            anyhow::bail!("Invalid local config: 'base_dir' must not be empty");
        }

        Ok(Self::new(crate::config::expand_tilde(&config.base_dir)))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve an identifier to a path inside `base_dir`
    ///
    /// Only a single plain file name is accepted, so identifiers read back
    /// from history cannot point outside the directory.
    fn resolve(&self, identifier: &str) -> Result<PathBuf> {
        let mut components = Path::new(identifier).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.base_dir.join(identifier)),
            _ => anyhow::bail!("Invalid backup identifier: '{}'", identifier),
        }
    }
}

impl DestinationAdapter for LocalDestination {
    fn store(&self, artifact: &Path) -> Result<String> {
        let filename = artifact
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Artifact has no usable file name: {:?}", artifact))?
            .to_string();
        let dest_path = self.base_dir.join(&filename);

        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!("Failed to create destination directory: {:?}", self.base_dir)
        })?;

        // Copying a file onto itself would truncate it
        let same_file = match (artifact.canonicalize(), dest_path.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };

        if same_file {
            debug!("Artifact already in destination: {:?}", dest_path);
        } else {
            fs::copy(artifact, &dest_path).with_context(|| {
                format!("Failed to copy {:?} to {:?}", artifact, dest_path)
            })?;
        }

        info!("Stored {:?} as '{}'", dest_path, filename);
        Ok(filename)
    }

    fn retrieve(&self, identifier: &str) -> Result<PathBuf> {
        let path = self.resolve(identifier)?;
        if !path.is_file() {
            anyhow::bail!("Backup file not found: {:?}", path);
        }
        Ok(path)
    }
}
