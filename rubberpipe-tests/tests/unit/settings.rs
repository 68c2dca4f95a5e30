//! Tests for settings loading and secret masking

use rubberpipe::config::{load_settings, load_settings_or_default, masked_payload};
use serde_json::json;
use test_utils::{postgres_payload, TestContext};

#[test]
fn test_settings_file_round_trip() {
    let ctx = TestContext::new();
    let path = ctx.write_settings();

    let settings = load_settings(&path).unwrap();

    assert_eq!(settings.global.state_directory, ctx.state_dir());
    assert_eq!(settings.global.staging_directory, ctx.staging_dir());
    assert_eq!(settings.global.log_level, "debug");
    assert_eq!(settings.global.log_max_files, 3);
}

#[test]
fn test_explicit_missing_settings_file_is_error() {
    let ctx = TestContext::new();
    let missing = ctx.path().join("nope.toml");
    assert!(load_settings_or_default(Some(&missing)).is_err());
}

#[test]
fn test_invalid_log_level_rejected() {
    let ctx = TestContext::new();
    let path = ctx.create_file(
        "bad.toml",
        "[global]\nlog_level = \"chatty\"\n",
    );
    assert!(load_settings(&path).is_err());
}

#[test]
fn test_partial_settings_use_defaults() {
    let ctx = TestContext::new();
    let path = ctx.create_file("partial.toml", "[global]\nlog_level = \"warn\"\n");

    let settings = load_settings(&path).unwrap();
    assert_eq!(settings.global.log_level, "warn");
    assert_eq!(settings.global.log_max_files, 10);
    assert!(!settings.global.state_directory.as_os_str().is_empty());
}

#[test]
fn test_masked_payload_hides_password() {
    let masked = masked_payload(&postgres_payload());

    assert_eq!(masked["password"], json!("*****"));
    assert_eq!(masked["user"], json!("backup"));
    assert_eq!(masked["port"], json!(5433));
}
