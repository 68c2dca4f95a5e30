//! Tests for building a hub from configuration rows

use rstest::rstest;
use rubberpipe::config::AdapterConfig;
use rubberpipe::{ErrorKind, Hub, HubError};
use serde_json::json;
use test_utils::{local_config, postgres_payload, CallLog, FakeHubBuilder, FakeSource, TestContext};

#[test]
fn test_builds_builtin_adapters() {
    let ctx = TestContext::new();
    let registry = ctx.registry();
    let configs = vec![
        AdapterConfig::new("db", "postgres", postgres_payload()),
        local_config("disk", &ctx.path().join("backups")),
    ];

    let hub = Hub::new(&registry, &configs).unwrap();

    assert_eq!(hub.source_names(), vec!["db"]);
    assert_eq!(hub.destination_names(), vec!["disk"]);
    assert!(hub.source("db").is_ok());
    assert!(hub.destination("disk").is_ok());
}

#[test]
fn test_empty_config_builds_empty_hub() {
    let ctx = TestContext::new();
    let hub = Hub::new(&ctx.registry(), &[]).unwrap();
    assert!(hub.source_names().is_empty());
    assert!(hub.destination_names().is_empty());
}

#[test]
fn test_unknown_type_fails_whole_construction() {
    let ctx = TestContext::new();
    let registry = ctx.registry();
    let configs = vec![
        local_config("disk", &ctx.path().join("backups")),
        AdapterConfig::new("bucket", "s3", json!({ "bucket": "b" })),
        AdapterConfig::new("db", "postgres", postgres_payload()),
    ];

    let err = Hub::new(&registry, &configs).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnknownAdapterType);
    assert!(err.is_fatal());
    match err {
        HubError::UnknownAdapterType { name, adapter_type } => {
            assert_eq!(name, "bucket");
            assert_eq!(adapter_type, "s3");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[rstest]
#[case::missing_user(json!({ "dbname": "app" }))]
#[case::missing_dbname(json!({ "user": "backup" }))]
#[case::unknown_field(json!({ "user": "backup", "dbname": "app", "sslmode": "require" }))]
#[case::not_an_object(json!("postgres://backup@localhost/app"))]
fn test_bad_payload_is_config_parse_error(#[case] payload: serde_json::Value) {
    let ctx = TestContext::new();
    let configs = vec![AdapterConfig::new("db", "postgres", payload)];

    let err = Hub::new(&ctx.registry(), &configs).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConfigParse);
    assert!(err.to_string().contains("'db'"));
}

#[test]
fn test_duplicate_name_across_roles_rejected() {
    let ctx = TestContext::new();
    let configs = vec![
        AdapterConfig::new("main", "postgres", postgres_payload()),
        local_config("main", &ctx.path().join("backups")),
    ];

    let err = Hub::new(&ctx.registry(), &configs).unwrap_err();
    assert!(matches!(err, HubError::DuplicateAdapterName(ref name) if name == "main"));
}

#[test]
fn test_factories_run_once_per_row() {
    let log = CallLog::new();
    let db = FakeSource::new("db", "/tmp/a.dump", &log);
    let builder = FakeHubBuilder::new().source(&db);

    let hub = Hub::new(builder.registry(), builder.configs()).unwrap();

    // Building adapters does not touch them
    assert!(log.is_empty());
    assert_eq!(hub.source_names(), vec!["db"]);
}
