//! Hub - owns named adapters and runs the backup/restore workflows
//!
//! ## Workflows
//!
//! Backup: `validate -> backup -> store`
//! Restore: `lookup record -> retrieve -> restore`
//!
//! Each step is a function returning `Result<T, HubError>` whose success
//! value feeds the next step. The first failure ends the workflow. Nothing
//! is rolled back: an artifact produced before a failed `store` stays on
//! disk and its path is reported in [`HubError::Store`].
//!
//! The hub never writes history. Callers record every backup attempt
//! (see [`crate::managers::backup::BackupManager`]).

mod error;

pub use error::{ErrorKind, HubError};

use crate::adapters::{DestinationAdapter, SourceAdapter};
use crate::config::AdapterConfig;
use crate::registry::{AdapterRegistry, AdapterRole};
use crate::stores::HistoryStore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub type Result<T> = std::result::Result<T, HubError>;

pub struct Hub {
    sources: HashMap<String, Box<dyn SourceAdapter>>,
    destinations: HashMap<String, Box<dyn DestinationAdapter>>,
}

impl Hub {
    /// Build every configured adapter through the registry
    ///
    /// Any row that cannot be built aborts construction; a hub never starts
    /// with some adapters silently missing.
    pub fn new(registry: &AdapterRegistry, configs: &[AdapterConfig]) -> Result<Self> {
        let mut sources = HashMap::new();
        let mut destinations = HashMap::new();

        for config in configs {
            if sources.contains_key(&config.name) || destinations.contains_key(&config.name) {
                return Err(HubError::DuplicateAdapterName(config.name.clone()));
            }

            let parse_error = |source: anyhow::Error| HubError::ConfigParse {
                name: config.name.clone(),
                adapter_type: config.adapter_type.clone(),
                source,
            };

            if let Some(factory) = registry.source_factory(&config.adapter_type) {
                let adapter = factory(&config.payload).map_err(parse_error)?;
                sources.insert(config.name.clone(), adapter);
            } else if let Some(factory) = registry.destination_factory(&config.adapter_type) {
                let adapter = factory(&config.payload).map_err(parse_error)?;
                destinations.insert(config.name.clone(), adapter);
            } else {
                return Err(HubError::UnknownAdapterType {
                    name: config.name.clone(),
                    adapter_type: config.adapter_type.clone(),
                });
            }
        }

        info!(
            "Hub ready with {} source(s) and {} destination(s)",
            sources.len(),
            destinations.len()
        );

        Ok(Self {
            sources,
            destinations,
        })
    }

    /// Back up `source_name` into `dest_name`, returning the stored identifier
    pub fn backup(&self, source_name: &str, dest_name: &str) -> Result<String> {
        let source = self.source(source_name)?;
        let destination = self.destination(dest_name)?;

        info!("Starting backup: {} -> {}", source_name, dest_name);

        let stored = validate_source(source_name, source)
            .and_then(|()| produce_artifact(source_name, source))
            .and_then(|artifact| store_artifact(dest_name, destination, artifact))
            .inspect_err(|e| error!("Backup {} -> {} failed: {}", source_name, dest_name, e))?;

        info!(
            "Backup {} -> {} stored as '{}'",
            source_name, dest_name, stored
        );
        Ok(stored)
    }

    /// Restore the backup recorded under `backup_id`
    pub fn restore(&self, backup_id: u64, history: &dyn HistoryStore) -> Result<()> {
        let record = history
            .get(backup_id)?
            .ok_or(HubError::BackupNotFound(backup_id))?;

        let source = self.source(&record.source)?;
        let destination = self.destination(&record.destination)?;

        info!(
            "Restoring backup {} ('{}' from {} into {})",
            backup_id, record.filename, record.destination, record.source
        );

        retrieve_artifact(&record.destination, destination, &record.filename)
            .and_then(|local| restore_artifact(&record.source, source, &local))
            .inspect_err(|e| error!("Restore of backup {} failed: {}", backup_id, e))?;

        info!("Restore of backup {} completed", backup_id);
        Ok(())
    }

    /// Run `validate` on every source, in name order
    pub fn validate_sources(&self) -> Vec<(String, Result<()>)> {
        self.source_names()
            .into_iter()
            .map(|name| {
                let result = self
                    .source(&name)
                    .and_then(|source| validate_source(&name, source));
                (name, result)
            })
            .collect()
    }

    pub fn source(&self, name: &str) -> Result<&dyn SourceAdapter> {
        self.sources
            .get(name)
            .map(|s| &**s)
            .ok_or_else(|| HubError::AdapterNotFound {
                role: AdapterRole::Source,
                name: name.to_string(),
            })
    }

    pub fn destination(&self, name: &str) -> Result<&dyn DestinationAdapter> {
        self.destinations
            .get(name)
            .map(|d| &**d)
            .ok_or_else(|| HubError::AdapterNotFound {
                role: AdapterRole::Destination,
                name: name.to_string(),
            })
    }

    /// Configured source names, sorted
    pub fn source_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.sources.keys().cloned().collect();
        names.sort();
        names
    }

    /// Configured destination names, sorted
    pub fn destination_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.destinations.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("sources", &self.source_names())
            .field("destinations", &self.destination_names())
            .finish()
    }
}

fn validate_source(name: &str, source: &dyn SourceAdapter) -> Result<()> {
    info!("Validating source '{}'", name);
    source.validate().map_err(|source| HubError::Validation {
        adapter: name.to_string(),
        source,
    })
}

fn produce_artifact(name: &str, source: &dyn SourceAdapter) -> Result<PathBuf> {
    info!("Running backup on source '{}'", name);
    let artifact = source.backup().map_err(|source| HubError::Backup {
        adapter: name.to_string(),
        source,
    })?;
    info!("Source '{}' produced {:?}", name, artifact);
    Ok(artifact)
}

fn store_artifact(
    name: &str,
    destination: &dyn DestinationAdapter,
    artifact: PathBuf,
) -> Result<String> {
    info!("Storing {:?} in destination '{}'", artifact, name);
    match destination.store(&artifact) {
        Ok(identifier) => Ok(identifier),
        Err(source) => Err(HubError::Store {
            adapter: name.to_string(),
            artifact,
            source,
        }),
    }
}

fn retrieve_artifact(
    name: &str,
    destination: &dyn DestinationAdapter,
    identifier: &str,
) -> Result<PathBuf> {
    info!("Retrieving '{}' from destination '{}'", identifier, name);
    destination
        .retrieve(identifier)
        .map_err(|source| HubError::Retrieve {
            adapter: name.to_string(),
            identifier: identifier.to_string(),
            source,
        })
}

fn restore_artifact(name: &str, source: &dyn SourceAdapter, artifact: &Path) -> Result<()> {
    info!("Restoring {:?} onto source '{}'", artifact, name);
    source.restore(artifact).map_err(|source| HubError::Restore {
        adapter: name.to_string(),
        artifact: artifact.to_path_buf(),
        source,
    })
}
