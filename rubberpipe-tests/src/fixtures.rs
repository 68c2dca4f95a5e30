//! Test fixtures and sample data

use chrono::{TimeZone, Utc};
use rubberpipe::config::AdapterConfig;
use rubberpipe::stores::{BackupRecord, BackupStatus};
use serde_json::{json, Value};
use std::path::Path;

/// A successful backup record with a fixed timestamp
pub fn success_record(id: u64, source: &str, destination: &str, filename: &str) -> BackupRecord {
    BackupRecord {
        id,
        source: source.to_string(),
        destination: destination.to_string(),
        filename: filename.to_string(),
        timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 2, 0, id as u32 % 60).unwrap(),
        status: BackupStatus::Success,
        error_message: String::new(),
    }
}

/// A failed backup record with a fixed timestamp
pub fn failed_record(id: u64, source: &str, destination: &str, message: &str) -> BackupRecord {
    BackupRecord {
        filename: String::new(),
        status: BackupStatus::Failed,
        error_message: message.to_string(),
        ..success_record(id, source, destination, "")
    }
}

/// A complete `postgres` payload
pub fn postgres_payload() -> Value {
    json!({
        "host": "db.internal",
        "port": 5433,
        "user": "backup",
        "password": "s3cret",
        "dbname": "app"
    })
}

/// A `local` destination row
pub fn local_config(name: &str, base_dir: &Path) -> AdapterConfig {
    AdapterConfig::new(name, "local", json!({ "base_dir": base_dir }))
}

/// A `files` source row
pub fn files_config(
    name: &str,
    paths: &[&Path],
    backup_dir: &Path,
    restore_target: &Path,
) -> AdapterConfig {
    AdapterConfig::new(
        name,
        "files",
        json!({
            "paths": paths,
            "backup_dir": backup_dir,
            "restore_target": restore_target,
        }),
    )
}
