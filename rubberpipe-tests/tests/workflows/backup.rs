//! Backup workflow: validate -> backup -> store

use rstest::rstest;
use rubberpipe::{ErrorKind, Hub, HubError};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use test_utils::{CallLog, FakeDestination, FakeHubBuilder, FakeSource, FakeStep};

fn fakes(log: &CallLog) -> (FakeSource, FakeDestination) {
    (
        FakeSource::new("db", "/tmp/a.dump", log),
        FakeDestination::new("disk", "/backups", log),
    )
}

#[test]
fn test_backup_returns_stored_identifier() {
    let log = CallLog::new();
    let (db, disk) = fakes(&log);
    let hub = FakeHubBuilder::new().source(&db).destination(&disk).build();

    let stored = hub.backup("db", "disk").unwrap();

    assert_eq!(stored, "a.dump");
    assert_eq!(disk.stored(), vec![Path::new("/tmp/a.dump").to_path_buf()]);
}

#[test]
fn test_steps_run_in_order() {
    let log = CallLog::new();
    let (db, disk) = fakes(&log);
    let hub = FakeHubBuilder::new().source(&db).destination(&disk).build();

    hub.backup("db", "disk").unwrap();

    assert_eq!(
        log.entries(),
        vec!["db.validate", "db.backup", "disk.store"]
    );
}

#[rstest]
#[case::missing_source("missing", "disk")]
#[case::missing_destination("db", "missing")]
#[case::both_missing("nope", "nada")]
fn test_unknown_adapter_touches_nothing(#[case] source: &str, #[case] destination: &str) {
    let log = CallLog::new();
    let (db, disk) = fakes(&log);
    let hub = FakeHubBuilder::new().source(&db).destination(&disk).build();

    let err = hub.backup(source, destination).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AdapterNotFound);
    assert!(!err.is_fatal());
    assert!(log.is_empty(), "no adapter may be called: {:?}", log.entries());
}

#[test]
fn test_missing_source_reported_before_destination() {
    let hub = FakeHubBuilder::new().build();

    let err = hub.backup("missing", "gone").unwrap_err();
    assert_eq!(err.to_string(), "source adapter 'missing' not found");
}

#[test]
fn test_validation_failure_stops_before_backup() {
    let log = CallLog::new();
    let db = FakeSource::new("db", "/tmp/a.dump", &log).failing_at(FakeStep::Validate);
    let disk = FakeDestination::new("disk", "/backups", &log);
    let hub = FakeHubBuilder::new().source(&db).destination(&disk).build();

    let err = hub.backup("db", "disk").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(db.call_count(FakeStep::Backup), 0);
    assert!(log.calls_to("disk").is_empty());
    assert_eq!(log.entries(), vec!["db.validate"]);
    assert_eq!(
        err.chain_message(),
        "Source 'db' failed validation: db validate failed"
    );
}

#[test]
fn test_backup_failure_stops_before_store() {
    let log = CallLog::new();
    let db = FakeSource::new("db", "/tmp/a.dump", &log).failing_at(FakeStep::Backup);
    let disk = FakeDestination::new("disk", "/backups", &log);
    let hub = FakeHubBuilder::new().source(&db).destination(&disk).build();

    let err = hub.backup("db", "disk").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Backup);
    assert!(disk.stored().is_empty());
    assert_eq!(log.entries(), vec!["db.validate", "db.backup"]);
}

#[test]
fn test_store_failure_reports_orphaned_artifact() {
    let log = CallLog::new();
    let db = FakeSource::new("db", "/tmp/a.dump", &log);
    let disk = FakeDestination::new("disk", "/backups", &log).failing_at(FakeStep::Store);
    let hub = FakeHubBuilder::new().source(&db).destination(&disk).build();

    let err = hub.backup("db", "disk").unwrap_err();

    match err {
        HubError::Store {
            adapter, artifact, ..
        } => {
            assert_eq!(adapter, "disk");
            assert_eq!(artifact, Path::new("/tmp/a.dump"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(log.entries(), vec!["db.validate", "db.backup", "disk.store"]);
}

#[test]
fn test_validate_sources_reports_each_source() {
    let log = CallLog::new();
    let good = FakeSource::new("alpha", "/tmp/a.dump", &log);
    let bad = FakeSource::new("beta", "/tmp/b.dump", &log).failing_at(FakeStep::Validate);
    let hub = FakeHubBuilder::new().source(&bad).source(&good).build();

    let results = hub.validate_sources();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "alpha");
    assert!(results[0].1.is_ok());
    assert_eq!(results[1].0, "beta");
    assert_eq!(
        results[1].1.as_ref().unwrap_err().kind(),
        ErrorKind::Validation
    );
    assert_eq!(log.count("alpha", FakeStep::Backup), 0);
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_hub_is_send_and_sync() {
    assert_send_sync::<Hub>();
}

#[test]
fn test_concurrent_backups_share_one_hub() {
    let log = CallLog::new();
    let (db, disk) = fakes(&log);
    let hub = Arc::new(FakeHubBuilder::new().source(&db).destination(&disk).build());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let hub = Arc::clone(&hub);
            thread::spawn(move || hub.backup("db", "disk"))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), "a.dump");
    }

    assert_eq!(db.call_count(FakeStep::Validate), 8);
    assert_eq!(db.call_count(FakeStep::Backup), 8);
    assert_eq!(disk.call_count(FakeStep::Store), 8);
    assert_eq!(disk.stored().len(), 8);
}
