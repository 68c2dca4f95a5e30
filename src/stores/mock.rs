//! In-memory stores for tests and embedding
//!
//! Available for use in external test crates.

use super::{
    sort_newest_first, BackupRecord, ConfigStore, HistoryStore, NewBackupRecord, Result,
    StoreError,
};
use crate::config::AdapterConfig;
use chrono::Utc;
use std::sync::Mutex;

/// History kept in a `Vec`, ids assigned from 1
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    records: Mutex<Vec<BackupRecord>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with pre-built records (ids are taken as given)
    pub fn with_records(records: Vec<BackupRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn get(&self, id: u64) -> Result<Option<BackupRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    fn append(&self, record: NewBackupRecord) -> Result<BackupRecord> {
        let mut records = self.records.lock().unwrap();
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let record = record.into_record(next_id, Utc::now());
        records.push(record.clone());
        Ok(record)
    }

    fn list(&self) -> Result<Vec<BackupRecord>> {
        let mut records = self.records.lock().unwrap().clone();
        sort_newest_first(&mut records);
        Ok(records)
    }
}

/// Adapter configs kept in a `Vec`
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    configs: Mutex<Vec<AdapterConfig>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_configs(configs: Vec<AdapterConfig>) -> Self {
        Self {
            configs: Mutex::new(configs),
        }
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn list(&self) -> Result<Vec<AdapterConfig>> {
        let mut configs = self.configs.lock().unwrap().clone();
        configs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(configs)
    }

    fn add(&self, config: AdapterConfig) -> Result<()> {
        let mut configs = self.configs.lock().unwrap();
        if configs.iter().any(|c| c.name == config.name) {
            return Err(StoreError::AlreadyExists(config.name));
        }
        configs.push(config);
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<bool> {
        let mut configs = self.configs.lock().unwrap();
        let before = configs.len();
        configs.retain(|c| c.name != name);
        Ok(configs.len() != before)
    }
}
