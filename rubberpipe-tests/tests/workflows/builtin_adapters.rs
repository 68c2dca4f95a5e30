//! End-to-end runs with the built-in adapters

use rstest::rstest;
use rubberpipe::adapters::destinations::LocalDestination;
use rubberpipe::adapters::sources::PostgresSource;
use rubberpipe::stores::ConfigStore;
use rubberpipe::{
    AdapterRegistry, BackupManager, DestinationAdapter, ErrorKind, Hub, SourceAdapter,
};
use std::fs;
use std::sync::Arc;
use test_utils::{
    files_config, local_config, postgres_payload, success_record, CallLog, FakeDestination,
    FakeSource, InMemoryHistoryStore, MockExecutor, MockResponse, TestContext,
};

#[rstest]
#[case::empty(Vec::new())]
#[case::text(b"pg_dump output\n".to_vec())]
#[case::binary((0..=255u8).cycle().take(64 * 1024).collect())]
fn test_local_destination_round_trip(#[case] content: Vec<u8>) {
    let ctx = TestContext::new();
    let log = CallLog::new();
    let artifact = ctx.create_dir("staging").join("a.dump");
    let source = FakeSource::new("db", &artifact, &log).writing(&content);
    let destination = LocalDestination::new(ctx.path().join("backups"));

    let produced = source.backup().unwrap();
    let identifier = destination.store(&produced).unwrap();
    let retrieved = destination.retrieve(&identifier).unwrap();

    assert_eq!(fs::read(retrieved).unwrap(), content);
}

#[test]
fn test_files_to_local_backup_and_restore() {
    let ctx = TestContext::new();
    ctx.create_file("data/app/config.yml", "port: 8080\n");
    ctx.create_file("data/app/uploads/logo.png", "not really a png");
    let notes = ctx.create_file("data/notes.txt", "remember the milk");

    let app = ctx.path().join("data/app");
    let restore_target = ctx.path().join("restored");
    let backups = ctx.path().join("backups");

    let store = ctx.config_store();
    store
        .add(files_config(
            "documents",
            &[app.as_path(), notes.as_path()],
            &ctx.staging_dir(),
            &restore_target,
        ))
        .unwrap();
    store.add(local_config("disk", &backups)).unwrap();

    let hub = Hub::new(&ctx.registry(), &store.list().unwrap()).unwrap();
    let manager = BackupManager::new(hub, Arc::new(ctx.history()));

    let record = manager.backup("documents", "disk").unwrap();
    assert!(record.filename.ends_with(".tar.gz"));

    let staged = ctx.staging_dir().join(&record.filename);
    let stored = backups.join(&record.filename);
    assert_eq!(fs::read(&staged).unwrap(), fs::read(&stored).unwrap());

    manager.restore(record.id).unwrap();

    assert_eq!(
        fs::read_to_string(restore_target.join("app/config.yml")).unwrap(),
        "port: 8080\n"
    );
    assert_eq!(
        fs::read_to_string(restore_target.join("app/uploads/logo.png")).unwrap(),
        "not really a png"
    );
    assert_eq!(
        fs::read_to_string(restore_target.join("notes.txt")).unwrap(),
        "remember the milk"
    );
}

#[test]
fn test_files_source_with_missing_path_fails_validation() {
    let ctx = TestContext::new();
    let missing = ctx.path().join("does-not-exist");
    let configs = vec![
        files_config(
            "documents",
            &[missing.as_path()],
            &ctx.staging_dir(),
            &ctx.path().join("restored"),
        ),
        local_config("disk", &ctx.path().join("backups")),
    ];
    let hub = Hub::new(&ctx.registry(), &configs).unwrap();

    let err = hub.backup("documents", "disk").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!ctx.path().join("backups").exists());
}

/// Registry whose `postgres` type runs commands through `executor`
fn mocked_postgres_registry(ctx: &TestContext, executor: &MockExecutor) -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();
    let staging = ctx.staging_dir();
    let executor = executor.clone();
    registry
        .register_source("postgres", move |payload| {
            let source = PostgresSource::with_executor(payload, &staging, Arc::new(executor.clone()))?;
            Ok(Box::new(source) as Box<dyn SourceAdapter>)
        })
        .unwrap();
    registry
}

fn postgres_hub(ctx: &TestContext, executor: &MockExecutor, disk: &FakeDestination) -> Hub {
    let mut registry = mocked_postgres_registry(ctx, executor);
    let destination = disk.clone();
    registry
        .register_destination("fake", move |_| {
            Ok(Box::new(destination.clone()) as Box<dyn DestinationAdapter>)
        })
        .unwrap();

    let configs = vec![
        rubberpipe::AdapterConfig::new("db", "postgres", postgres_payload()),
        rubberpipe::AdapterConfig::new("disk", "fake", serde_json::json!({})),
    ];
    Hub::new(&registry, &configs).unwrap()
}

#[test]
fn test_postgres_backup_runs_isready_then_dump() {
    let ctx = TestContext::new();
    let log = CallLog::new();
    let executor = MockExecutor::new();
    let disk = FakeDestination::new("disk", ctx.path().join("backups"), &log);
    let hub = postgres_hub(&ctx, &executor, &disk);

    let stored = hub.backup("db", "disk").unwrap();

    assert!(stored.ends_with(".dump"));
    let calls = executor.get_calls();
    let programs: Vec<_> = calls.iter().map(|c| c.program.as_str()).collect();
    assert_eq!(programs, vec!["pg_isready", "pg_dump"]);

    let dump = &calls[1];
    assert!(dump.args.contains(&"db.internal".to_string()));
    assert!(dump.args.contains(&"5433".to_string()));
    assert_eq!(dump.args.last().map(String::as_str), Some("app"));
    assert!(dump
        .env
        .contains(&("PGPASSWORD".to_string(), "s3cret".to_string())));
    // The password never reaches the command line
    assert!(!dump.args.iter().any(|a| a.contains("s3cret")));

    assert_eq!(disk.stored()[0], ctx.staging_dir().join(&stored));
}

#[test]
fn test_postgres_unreachable_skips_dump() {
    let ctx = TestContext::new();
    let log = CallLog::new();
    let executor = MockExecutor::new().expect(
        "pg_isready",
        MockResponse::Failure {
            stderr: "no response".to_string(),
            exit_code: 2,
        },
    );
    let disk = FakeDestination::new("disk", ctx.path().join("backups"), &log);
    let hub = postgres_hub(&ctx, &executor, &disk);

    let err = hub.backup("db", "disk").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.chain_message().contains("no response"));
    assert!(!executor.was_called("pg_dump"));
    assert!(log.is_empty());
}

#[test]
fn test_postgres_restore_from_history() {
    let ctx = TestContext::new();
    let log = CallLog::new();
    let executor = MockExecutor::new();
    let backups = ctx.create_dir("backups");
    ctx.create_file("backups/20250101-020000.dump", "PGDMP");
    let disk = FakeDestination::new("disk", &backups, &log);
    let hub = postgres_hub(&ctx, &executor, &disk);

    let history = InMemoryHistoryStore::with_records(vec![success_record(
        1,
        "db",
        "disk",
        "20250101-020000.dump",
    )]);

    hub.restore(1, &history).unwrap();

    assert_eq!(executor.call_count("pg_restore"), 1);
    assert!(!executor.was_called("pg_isready"));
    let restore = &executor.get_calls()[0];
    let expected = backups
        .join("20250101-020000.dump")
        .to_string_lossy()
        .to_string();
    assert!(restore.args.contains(&"--clean".to_string()));
    assert_eq!(restore.args.last(), Some(&expected));
}
