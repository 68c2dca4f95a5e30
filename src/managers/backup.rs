//! Backup manager - runs hub workflows and records every backup attempt

use crate::hub::{Hub, HubError};
use crate::stores::{BackupRecord, BackupStatus, HistoryStore, NewBackupRecord, StoreError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum BackupManagerError {
    #[error("Backup {} failed", record.id)]
    Backup {
        /// The `failed` record written for this attempt
        record: BackupRecord,
        #[source]
        source: HubError,
    },

    #[error("Backup {0} did not complete successfully and cannot be restored")]
    FailedBackup(u64),

    #[error(transparent)]
    Hub(#[from] HubError),

    #[error("Failed to record backup history")]
    History(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, BackupManagerError>;

pub struct BackupManager {
    hub: Hub,
    history: Arc<dyn HistoryStore>,
}

impl BackupManager {
    pub fn new(hub: Hub, history: Arc<dyn HistoryStore>) -> Self {
        Self { hub, history }
    }

    /// Run a backup and write its history record, success or failure
    pub fn backup(&self, source: &str, destination: &str) -> Result<BackupRecord> {
        let start_time = Instant::now();

        match self.hub.backup(source, destination) {
            Ok(stored) => {
                let record = self
                    .history
                    .append(NewBackupRecord::success(source, destination, &stored))?;
                info!(
                    "Backup {} ({} -> {}) completed in {:.2}s",
                    record.id,
                    source,
                    destination,
                    start_time.elapsed().as_secs_f64()
                );
                Ok(record)
            }
            Err(e) => {
                let message = e.chain_message();
                error!("Backup {} -> {} failed: {}", source, destination, message);

                let record = self
                    .history
                    .append(NewBackupRecord::failed(source, destination, &message))?;
                Err(BackupManagerError::Backup { record, source: e })
            }
        }
    }

    /// Restore a recorded backup; attempts recorded as failed are refused
    pub fn restore(&self, backup_id: u64) -> Result<()> {
        if let Some(record) = self.history.get(backup_id)? {
            if record.status == BackupStatus::Failed {
                warn!("Refusing to restore failed backup {}", backup_id);
                return Err(BackupManagerError::FailedBackup(backup_id));
            }
        }

        let start_time = Instant::now();
        self.hub.restore(backup_id, self.history.as_ref())?;
        info!(
            "Restore of backup {} completed in {:.2}s",
            backup_id,
            start_time.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Backup history, newest first
    pub fn history(&self) -> Result<Vec<BackupRecord>> {
        Ok(self.history.list()?)
    }
}
