use super::{
    snapshot_state, sort_newest_first, update_state, BackupRecord, HistoryStore,
    NewBackupRecord, Result,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk layout of `history.json`
#[derive(Debug, Serialize, Deserialize)]
struct HistoryFile {
    next_id: u64,
    records: Vec<BackupRecord>,
}

impl Default for HistoryFile {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }
}

/// Backup history kept in `history.json`
#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub const FILE_NAME: &'static str = "history.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<state_dir>/history.json`
    pub fn in_dir(state_dir: &Path) -> Self {
        Self::new(state_dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonHistoryStore {
    fn get(&self, id: u64) -> Result<Option<BackupRecord>> {
        let history: HistoryFile = snapshot_state(&self.path)?;
        Ok(history.records.into_iter().find(|r| r.id == id))
    }

    fn append(&self, record: NewBackupRecord) -> Result<BackupRecord> {
        update_state(&self.path, |history: &mut HistoryFile| {
            let record = record.into_record(history.next_id, Utc::now());
            history.next_id += 1;
            history.records.push(record.clone());
            debug!("Recorded backup {} ({})", record.id, record.status);
            Ok(record)
        })
    }

    fn list(&self) -> Result<Vec<BackupRecord>> {
        let history: HistoryFile = snapshot_state(&self.path)?;
        let mut records = history.records;
        sort_newest_first(&mut records);
        Ok(records)
    }
}
