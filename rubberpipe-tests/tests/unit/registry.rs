//! Tests for adapter type registration

use rubberpipe::{AdapterRegistry, AdapterRole, RegistryError, SourceAdapter};
use serde_json::json;
use std::path::Path;
use test_utils::{CallLog, FakeSource, FakeStep, TestContext};

#[test]
fn test_second_registration_fails_and_keeps_first() {
    let log = CallLog::new();
    let first = FakeSource::new("first", "/tmp/first.dump", &log);
    let second = FakeSource::new("second", "/tmp/second.dump", &log);

    let mut registry = AdapterRegistry::new();
    registry
        .register_source("fake", move |_| {
            Ok(Box::new(first.clone()) as Box<dyn SourceAdapter>)
        })
        .unwrap();

    let err = registry
        .register_source("fake", move |_| {
            Ok(Box::new(second.clone()) as Box<dyn SourceAdapter>)
        })
        .unwrap_err();

    assert!(matches!(
        err,
        RegistryError::DuplicateRegistration {
            ref adapter_type,
            existing_role: AdapterRole::Source,
        } if adapter_type == "fake"
    ));

    // The factory still builds the first fake
    let factory = registry.source_factory("fake").unwrap();
    let adapter = factory(&json!({})).unwrap();
    assert_eq!(adapter.backup().unwrap(), Path::new("/tmp/first.dump"));
    assert_eq!(log.count("first", FakeStep::Backup), 1);
    assert_eq!(log.count("second", FakeStep::Backup), 0);
}

#[test]
fn test_builtin_types_cannot_be_overridden() {
    let ctx = TestContext::new();
    let mut registry = ctx.registry();

    let log = CallLog::new();
    let fake = FakeSource::new("db", "/tmp/a.dump", &log);
    let result = registry.register_source("postgres", move |_| {
        Ok(Box::new(fake.clone()) as Box<dyn SourceAdapter>)
    });

    assert!(result.is_err());
    assert_eq!(registry.source_types(), vec!["files", "postgres"]);
}

#[test]
fn test_role_of_builtin_types() {
    let ctx = TestContext::new();
    let registry = ctx.registry();

    assert_eq!(registry.role_of("postgres"), Some(AdapterRole::Source));
    assert_eq!(registry.role_of("files"), Some(AdapterRole::Source));
    assert_eq!(registry.role_of("local"), Some(AdapterRole::Destination));
    assert_eq!(registry.role_of("s3"), None);
}
