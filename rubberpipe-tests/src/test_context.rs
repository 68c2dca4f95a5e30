//! Test context backed by a temporary directory
//!
//! Lays out a state directory, a staging directory and a settings file the
//! same way a real installation does.

use rubberpipe::stores::{JsonConfigStore, JsonHistoryStore};
use rubberpipe::AdapterRegistry;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test context that manages test resources and provides common utilities
pub struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    /// Create a new test context with a temporary directory
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Get the path to the temporary directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn state_dir(&self) -> PathBuf {
        self.path().join("state")
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.path().join("staging")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.path().join("logs")
    }

    /// Write a settings file pointing every directory into the temp dir
    pub fn write_settings(&self) -> PathBuf {
        let content = format!(
            r#"[global]
state_directory = "{}"
staging_directory = "{}"
log_directory = "{}"
log_level = "debug"
log_max_files = 3
"#,
            self.state_dir().display(),
            self.staging_dir().display(),
            self.log_dir().display(),
        );
        self.create_file("rubberpipe.toml", &content)
    }

    /// Create a file relative to the temp directory
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Create a directory relative to the temp directory
    pub fn create_dir(&self, relative_path: &str) -> PathBuf {
        let path = self.path().join(relative_path);
        fs::create_dir_all(&path).expect("Failed to create directory");
        path
    }

    pub fn registry(&self) -> AdapterRegistry {
        AdapterRegistry::with_builtin_adapters(&self.staging_dir())
            .expect("Built-in adapters should register")
    }

    pub fn config_store(&self) -> JsonConfigStore {
        JsonConfigStore::in_dir(&self.state_dir())
    }

    pub fn history(&self) -> JsonHistoryStore {
        JsonHistoryStore::in_dir(&self.state_dir())
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
