//! Adapter registry - maps type discriminators to adapter factories
//!
//! The registry is built once at startup and passed by reference to
//! [`crate::hub::Hub::new`]. Adding a new backend means registering one more
//! factory here; the hub never names concrete adapter types.

use crate::adapters::destinations::local::LocalDestination;
use crate::adapters::sources::files::FilesSource;
use crate::adapters::sources::postgres::PostgresSource;
use crate::adapters::{DestinationAdapter, SourceAdapter};
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Builds a source adapter from an opaque configuration payload
pub type SourceFactory = Box<dyn Fn(&Value) -> Result<Box<dyn SourceAdapter>> + Send + Sync>;

/// Builds a destination adapter from an opaque configuration payload
pub type DestinationFactory =
    Box<dyn Fn(&Value) -> Result<Box<dyn DestinationAdapter>> + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Adapter type '{adapter_type}' is already registered as a {existing_role} adapter")]
    DuplicateRegistration {
        adapter_type: String,
        existing_role: AdapterRole,
    },
}

/// Which capability a registered type provides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterRole {
    Source,
    Destination,
}

impl std::fmt::Display for AdapterRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdapterRole::Source => write!(f, "source"),
            AdapterRole::Destination => write!(f, "destination"),
        }
    }
}

/// Type discriminator -> factory, one map per role
///
/// A type may be registered once across both roles. Lookups check sources
/// first, so a destination sharing a source's type would be unreachable.
#[derive(Default)]
pub struct AdapterRegistry {
    sources: HashMap<String, SourceFactory>,
    destinations: HashMap<String, DestinationFactory>,
}

impl AdapterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the adapters shipped in this crate
    ///
    /// `staging_dir` is where sources write artifacts when their payload
    /// does not set `backup_dir`.
    pub fn with_builtin_adapters(staging_dir: &Path) -> Result<Self, RegistryError> {
        let mut registry = Self::new();

        let staging = staging_dir.to_path_buf();
        registry.register_source("postgres", move |payload| {
            Ok(Box::new(PostgresSource::from_config(payload, &staging)?) as Box<dyn SourceAdapter>)
        })?;

        let staging: PathBuf = staging_dir.to_path_buf();
        registry.register_source("files", move |payload| {
            Ok(Box::new(FilesSource::from_config(payload, &staging)?) as Box<dyn SourceAdapter>)
        })?;

        registry.register_destination("local", |payload| {
            Ok(Box::new(LocalDestination::from_config(payload)?) as Box<dyn DestinationAdapter>)
        })?;

        Ok(registry)
    }

    /// Register a source factory under `adapter_type`
    ///
    /// Fails if the type is already taken; the existing factory is kept.
    pub fn register_source<F>(
        &mut self,
        adapter_type: impl Into<String>,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&Value) -> Result<Box<dyn SourceAdapter>> + Send + Sync + 'static,
    {
        let adapter_type = adapter_type.into();
        self.ensure_unregistered(&adapter_type)?;
        debug!("Registered source adapter type: {}", adapter_type);
        self.sources.insert(adapter_type, Box::new(factory));
        Ok(())
    }

    /// Register a destination factory under `adapter_type`
    ///
    /// Fails if the type is already taken; the existing factory is kept.
    pub fn register_destination<F>(
        &mut self,
        adapter_type: impl Into<String>,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&Value) -> Result<Box<dyn DestinationAdapter>> + Send + Sync + 'static,
    {
        let adapter_type = adapter_type.into();
        self.ensure_unregistered(&adapter_type)?;
        debug!("Registered destination adapter type: {}", adapter_type);
        self.destinations.insert(adapter_type, Box::new(factory));
        Ok(())
    }

    fn ensure_unregistered(&self, adapter_type: &str) -> Result<(), RegistryError> {
        let existing_role = if self.sources.contains_key(adapter_type) {
            AdapterRole::Source
        } else if self.destinations.contains_key(adapter_type) {
            AdapterRole::Destination
        } else {
            return Ok(());
        };

        Err(RegistryError::DuplicateRegistration {
            adapter_type: adapter_type.to_string(),
            existing_role,
        })
    }

    /// Factory for a source type, if registered
    pub fn source_factory(&self, adapter_type: &str) -> Option<&SourceFactory> {
        self.sources.get(adapter_type)
    }

    /// Factory for a destination type, if registered
    pub fn destination_factory(&self, adapter_type: &str) -> Option<&DestinationFactory> {
        self.destinations.get(adapter_type)
    }

    /// Role a type is registered under, if any
    pub fn role_of(&self, adapter_type: &str) -> Option<AdapterRole> {
        if self.sources.contains_key(adapter_type) {
            Some(AdapterRole::Source)
        } else if self.destinations.contains_key(adapter_type) {
            Some(AdapterRole::Destination)
        } else {
            None
        }
    }

    /// Registered source types, sorted
    pub fn source_types(&self) -> Vec<String> {
        let mut types: Vec<_> = self.sources.keys().cloned().collect();
        types.sort();
        types
    }

    /// Registered destination types, sorted
    pub fn destination_types(&self) -> Vec<String> {
        let mut types: Vec<_> = self.destinations.keys().cloned().collect();
        types.sort();
        types
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("sources", &self.source_types())
            .field("destinations", &self.destination_types())
            .finish()
    }
}
