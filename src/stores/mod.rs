//! Persisted stores the hub reads from and its callers write to
//!
//! - [`ConfigStore`]: `(name, type, payload)` rows used to build a hub
//! - [`HistoryStore`]: one [`BackupRecord`] per backup attempt
//!
//! The JSON file implementations keep each store in a single file under the
//! state directory, rewritten atomically while holding a [`StateLock`].

mod config_store;
mod history;
pub mod mock;

pub use config_store::JsonConfigStore;
pub use history::JsonHistoryStore;

use crate::config::AdapterConfig;
use crate::utils::locker::StateLock;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to access {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Adapter '{0}' already exists")]
    AlreadyExists(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Outcome of a backup attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupStatus {
    Success,
    Failed,
}

impl std::fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackupStatus::Success => write!(f, "success"),
            BackupStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A persisted backup attempt. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub id: u64,
    pub source: String,
    pub destination: String,
    /// Identifier returned by the destination's `store`; empty on failure
    pub filename: String,
    pub timestamp: DateTime<Utc>,
    pub status: BackupStatus,
    #[serde(default)]
    pub error_message: String,
}

/// A backup attempt before the store assigns its id and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBackupRecord {
    pub source: String,
    pub destination: String,
    pub filename: String,
    pub status: BackupStatus,
    pub error_message: String,
}

impl NewBackupRecord {
    pub fn success(source: &str, destination: &str, filename: &str) -> Self {
        Self {
            source: source.to_string(),
            destination: destination.to_string(),
            filename: filename.to_string(),
            status: BackupStatus::Success,
            error_message: String::new(),
        }
    }

    pub fn failed(source: &str, destination: &str, error_message: &str) -> Self {
        Self {
            source: source.to_string(),
            destination: destination.to_string(),
            filename: String::new(),
            status: BackupStatus::Failed,
            error_message: error_message.to_string(),
        }
    }

    fn into_record(self, id: u64, timestamp: DateTime<Utc>) -> BackupRecord {
        BackupRecord {
            id,
            source: self.source,
            destination: self.destination,
            filename: self.filename,
            timestamp,
            status: self.status,
            error_message: self.error_message,
        }
    }
}

/// Supplies adapter configuration rows
pub trait ConfigStore: Send + Sync {
    /// All configured adapters, sorted by name
    fn list(&self) -> Result<Vec<AdapterConfig>>;

    /// Add a new adapter; names must be unique
    fn add(&self, config: AdapterConfig) -> Result<()>;

    /// Remove an adapter, returning whether it existed
    fn remove(&self, name: &str) -> Result<bool>;
}

/// Supplies and records backup history
pub trait HistoryStore: Send + Sync {
    /// Look up a record by id
    fn get(&self, id: u64) -> Result<Option<BackupRecord>>;

    /// Persist a new attempt, assigning its id and timestamp
    fn append(&self, record: NewBackupRecord) -> Result<BackupRecord>;

    /// All records, newest first
    fn list(&self) -> Result<Vec<BackupRecord>>;
}

/// Newest first; equal timestamps fall back to the higher id
pub(crate) fn sort_newest_first(records: &mut [BackupRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
}

/// Read a JSON state file, treating a missing file as empty
fn read_state<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if contents.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a JSON state file via a temp file + rename
fn write_state<T: Serialize>(path: &Path, state: &T) -> Result<()> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_string_pretty(state).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json).map_err(io_err)?;
    fs::rename(&tmp_path, path).map_err(io_err)?;
    Ok(())
}

/// Read-modify-write a state file under its lock
fn update_state<T, R>(path: &Path, f: impl FnOnce(&mut T) -> Result<R>) -> Result<R>
where
    T: Serialize + DeserializeOwned + Default,
{
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut lock = StateLock::open(path).map_err(io_err)?;
    lock.run(|| {
        let mut state: T = read_state(path)?;
        let result = f(&mut state)?;
        write_state(path, &state)?;
        Ok(result)
    })
    .map_err(io_err)?
}

/// Read a state file under its lock
fn snapshot_state<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut lock = StateLock::open(path).map_err(io_err)?;
    lock.run(|| read_state(path)).map_err(io_err)?
}
