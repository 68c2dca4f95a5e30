use crate::registry::AdapterRole;
use crate::stores::StoreError;
use std::path::PathBuf;

/// Errors raised while building a [`super::Hub`] or running its workflows
///
/// Step errors carry the adapter name and keep the adapter's own failure
/// as their source.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("Adapter '{name}' has unknown type '{adapter_type}'")]
    UnknownAdapterType { name: String, adapter_type: String },

    #[error("Invalid configuration for adapter '{name}' (type '{adapter_type}')")]
    ConfigParse {
        name: String,
        adapter_type: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Adapter name '{0}' is configured more than once")]
    DuplicateAdapterName(String),

    #[error("{role} adapter '{name}' not found")]
    AdapterNotFound { role: AdapterRole, name: String },

    #[error("Backup {0} not found")]
    BackupNotFound(u64),

    #[error("Failed to read backup history")]
    History(#[from] StoreError),

    #[error("Source '{adapter}' failed validation")]
    Validation {
        adapter: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Source '{adapter}' failed to produce a backup")]
    Backup {
        adapter: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Destination '{adapter}' failed to store {artifact:?}")]
    Store {
        adapter: String,
        /// Artifact left behind by the source; it is not cleaned up
        artifact: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Destination '{adapter}' failed to retrieve '{identifier}'")]
    Retrieve {
        adapter: String,
        identifier: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Source '{adapter}' failed to restore {artifact:?}")]
    Restore {
        adapter: String,
        artifact: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Fieldless classification of [`HubError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownAdapterType,
    ConfigParse,
    DuplicateAdapterName,
    AdapterNotFound,
    BackupNotFound,
    History,
    Validation,
    Backup,
    Store,
    Retrieve,
    Restore,
}

impl HubError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HubError::UnknownAdapterType { .. } => ErrorKind::UnknownAdapterType,
            HubError::ConfigParse { .. } => ErrorKind::ConfigParse,
            HubError::DuplicateAdapterName(_) => ErrorKind::DuplicateAdapterName,
            HubError::AdapterNotFound { .. } => ErrorKind::AdapterNotFound,
            HubError::BackupNotFound(_) => ErrorKind::BackupNotFound,
            HubError::History(_) => ErrorKind::History,
            HubError::Validation { .. } => ErrorKind::Validation,
            HubError::Backup { .. } => ErrorKind::Backup,
            HubError::Store { .. } => ErrorKind::Store,
            HubError::Retrieve { .. } => ErrorKind::Retrieve,
            HubError::Restore { .. } => ErrorKind::Restore,
        }
    }

    /// True for errors that mean the deployment itself is broken
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::UnknownAdapterType | ErrorKind::ConfigParse | ErrorKind::DuplicateAdapterName
        )
    }

    /// The full cause chain on one line, as stored in backup history
    pub fn chain_message(&self) -> String {
        let mut message = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            message.push_str(": ");
            message.push_str(&err.to_string());
            cause = err.source();
        }
        message
    }
}
