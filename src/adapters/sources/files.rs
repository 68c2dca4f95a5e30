//! Filesystem source - archives configured paths into a `.tar.gz`
//!
//! Each configured path is stored in the archive under its own base name,
//! and restore unpacks the archive into `restore_target`.

use crate::adapters::{timestamped_name, SourceAdapter};
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Payload accepted by the `files` adapter type
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesConfig {
    pub paths: Vec<PathBuf>,
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,
    pub restore_target: PathBuf,
}

#[derive(Debug)]
pub struct FilesSource {
    config: FilesConfig,
    backup_dir: PathBuf,
}

impl FilesSource {
    pub fn from_config(payload: &Value, staging_dir: &Path) -> Result<Self> {
        let config: FilesConfig =
            serde_json::from_value(payload.clone()).context("Invalid files config")?;

        if config.paths.is_empty() {
            anyhow::bail!("Invalid files config: 'paths' must not be empty");
        }

        let mut names = HashSet::new();
        for path in &config.paths {
            let name = path
                .file_name()
                .with_context(|| format!("Invalid files config: {:?} has no file name", path))?;
            if !names.insert(name.to_os_string()) {
                anyhow::bail!(
                    "Invalid files config: more than one path is named {:?}",
                    name
                );
            }
        }

        let backup_dir = config
            .backup_dir
            .clone()
            .unwrap_or_else(|| staging_dir.to_path_buf());

        Ok(Self { config, backup_dir })
    }
}

impl SourceAdapter for FilesSource {
    fn validate(&self) -> Result<()> {
        let missing: Vec<_> = self
            .config
            .paths
            .iter()
            .filter(|p| !p.exists())
            .collect();

        if !missing.is_empty() {
            anyhow::bail!("Paths do not exist: {:?}", missing);
        }
        Ok(())
    }

    fn backup(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.backup_dir).with_context(|| {
            format!("Failed to create backup directory: {:?}", self.backup_dir)
        })?;

        let archive_path = self.backup_dir.join(timestamped_name("tar.gz"));
        info!(
            "Archiving {} path(s) to {:?}",
            self.config.paths.len(),
            archive_path
        );

        let archive_file = File::create(&archive_path)
            .with_context(|| format!("Failed to create archive file: {:?}", archive_path))?;
        let encoder = GzEncoder::new(archive_file, Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for path in &self.config.paths {
            // file_name() checked in from_config
            let name = path.file_name().unwrap_or_default();
            debug!("Adding {:?} as {:?}", path, name);

            if path.is_dir() {
                builder
                    .append_dir_all(name, path)
                    .with_context(|| format!("Failed to append directory {:?}", path))?;
            } else {
                builder
                    .append_path_with_name(path, name)
                    .with_context(|| format!("Failed to append file {:?}", path))?;
            }
        }

        builder
            .into_inner()
            .and_then(|encoder| encoder.finish())
            .with_context(|| format!("Failed to finish archive: {:?}", archive_path))?;

        Ok(archive_path)
    }

    fn restore(&self, artifact: &Path) -> Result<()> {
        let target = &self.config.restore_target;
        fs::create_dir_all(target)
            .with_context(|| format!("Failed to create restore target: {:?}", target))?;

        info!("Unpacking {:?} into {:?}", artifact, target);

        let file = File::open(artifact)
            .with_context(|| format!("Failed to open archive: {:?}", artifact))?;
        let mut archive = tar::Archive::new(GzDecoder::new(file));
        archive
            .unpack(target)
            .with_context(|| format!("Failed to unpack archive {:?}", artifact))?;

        Ok(())
    }
}
