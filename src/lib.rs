//! rubberpipe library
//!
//! Backs up pluggable sources (databases, file trees) into pluggable
//! destinations and restores them later. The [`hub::Hub`] builds named
//! adapters through an [`registry::AdapterRegistry`] and drives the
//! backup/restore workflows.

pub mod adapters;
pub mod config;
pub mod hub;
pub mod managers;
pub mod registry;
pub mod stores;
pub mod utils;

// Re-export commonly used types
pub use adapters::{DestinationAdapter, SourceAdapter};
pub use config::{load_settings, AdapterConfig, Settings};
pub use hub::{ErrorKind, Hub, HubError};
pub use managers::backup::{BackupManager, BackupManagerError};
pub use managers::logging::{init_console_logging, init_logging, LogGuard, LoggingConfig};
pub use registry::{AdapterRegistry, AdapterRole, RegistryError};
pub use stores::{BackupRecord, BackupStatus, ConfigStore, HistoryStore, NewBackupRecord};
