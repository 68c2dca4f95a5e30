//! Call-recording fake adapters
//!
//! Fakes share a [`CallLog`] so tests can assert on the exact order of
//! adapter calls across a whole workflow, e.g.
//! `["db.validate", "db.backup", "disk.store"]`.

use anyhow::{bail, Context, Result};
use parking_lot::Mutex;
use rubberpipe::config::AdapterConfig;
use rubberpipe::{AdapterRegistry, DestinationAdapter, Hub, SourceAdapter};
use serde_json::json;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An adapter operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeStep {
    Validate,
    Backup,
    Restore,
    Store,
    Retrieve,
}

impl fmt::Display for FakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FakeStep::Validate => "validate",
            FakeStep::Backup => "backup",
            FakeStep::Restore => "restore",
            FakeStep::Store => "store",
            FakeStep::Retrieve => "retrieve",
        };
        write!(f, "{}", name)
    }
}

/// Ordered `<adapter>.<step>` entries shared between fakes
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, adapter: &str, step: FakeStep) {
        self.entries.lock().push(format!("{}.{}", adapter, step));
    }

    /// Every call so far, in order
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Calls made on one adapter
    pub fn calls_to(&self, adapter: &str) -> Vec<String> {
        let prefix = format!("{}.", adapter);
        self.entries
            .lock()
            .iter()
            .filter(|e| e.starts_with(&prefix))
            .cloned()
            .collect()
    }

    pub fn count(&self, adapter: &str, step: FakeStep) -> usize {
        let entry = format!("{}.{}", adapter, step);
        self.entries.lock().iter().filter(|e| **e == entry).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Source that returns a fixed artifact path
///
/// With [`FakeSource::writing`] the artifact is written to disk on backup,
/// otherwise the path is only handed back.
#[derive(Debug, Clone)]
pub struct FakeSource {
    name: String,
    artifact: PathBuf,
    content: Option<Vec<u8>>,
    fail_at: Option<FakeStep>,
    log: CallLog,
    restored: Arc<Mutex<Vec<PathBuf>>>,
}

impl FakeSource {
    pub fn new(name: &str, artifact: impl Into<PathBuf>, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            artifact: artifact.into(),
            content: None,
            fail_at: None,
            log: log.clone(),
            restored: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Write `content` to the artifact path on every backup
    pub fn writing(mut self, content: &[u8]) -> Self {
        self.content = Some(content.to_vec());
        self
    }

    /// Fail the given step with an error naming the adapter
    pub fn failing_at(mut self, step: FakeStep) -> Self {
        self.fail_at = Some(step);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call_count(&self, step: FakeStep) -> usize {
        self.log.count(&self.name, step)
    }

    /// Artifact paths passed to `restore`
    pub fn restored(&self) -> Vec<PathBuf> {
        self.restored.lock().clone()
    }

    fn step(&self, step: FakeStep) -> Result<()> {
        self.log.record(&self.name, step);
        if self.fail_at == Some(step) {
            bail!("{} {} failed", self.name, step);
        }
        Ok(())
    }
}

impl SourceAdapter for FakeSource {
    fn validate(&self) -> Result<()> {
        self.step(FakeStep::Validate)
    }

    fn backup(&self) -> Result<PathBuf> {
        self.step(FakeStep::Backup)?;
        if let Some(content) = &self.content {
            fs::write(&self.artifact, content)
                .with_context(|| format!("Failed to write {:?}", self.artifact))?;
        }
        Ok(self.artifact.clone())
    }

    fn restore(&self, artifact: &Path) -> Result<()> {
        self.step(FakeStep::Restore)?;
        self.restored.lock().push(artifact.to_path_buf());
        Ok(())
    }
}

/// Destination that keeps nothing on disk
///
/// `store` returns the artifact's base name and `retrieve` answers with
/// `base_dir/<identifier>`, mirroring the local destination's naming.
#[derive(Debug, Clone)]
pub struct FakeDestination {
    name: String,
    base_dir: PathBuf,
    fail_at: Option<FakeStep>,
    log: CallLog,
    stored: Arc<Mutex<Vec<PathBuf>>>,
}

impl FakeDestination {
    pub fn new(name: &str, base_dir: impl Into<PathBuf>, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            base_dir: base_dir.into(),
            fail_at: None,
            log: log.clone(),
            stored: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_at(mut self, step: FakeStep) -> Self {
        self.fail_at = Some(step);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call_count(&self, step: FakeStep) -> usize {
        self.log.count(&self.name, step)
    }

    /// Artifact paths passed to `store`
    pub fn stored(&self) -> Vec<PathBuf> {
        self.stored.lock().clone()
    }

    fn step(&self, step: FakeStep) -> Result<()> {
        self.log.record(&self.name, step);
        if self.fail_at == Some(step) {
            bail!("{} {} failed", self.name, step);
        }
        Ok(())
    }
}

impl DestinationAdapter for FakeDestination {
    fn store(&self, artifact: &Path) -> Result<String> {
        self.step(FakeStep::Store)?;
        let filename = artifact
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Artifact has no file name: {:?}", artifact))?
            .to_string();
        self.stored.lock().push(artifact.to_path_buf());
        Ok(filename)
    }

    fn retrieve(&self, identifier: &str) -> Result<PathBuf> {
        self.step(FakeStep::Retrieve)?;
        Ok(self.base_dir.join(identifier))
    }
}

/// Registers each fake under its own type and collects matching config rows
#[derive(Debug, Default)]
pub struct FakeHubBuilder {
    registry: AdapterRegistry,
    configs: Vec<AdapterConfig>,
}

impl FakeHubBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, fake: &FakeSource) -> Self {
        let adapter_type = format!("fake-source-{}", fake.name());
        let adapter = fake.clone();
        self.registry
            .register_source(adapter_type.clone(), move |_| {
                Ok(Box::new(adapter.clone()) as Box<dyn SourceAdapter>)
            })
            .expect("fake source registered twice");
        self.configs
            .push(AdapterConfig::new(fake.name(), adapter_type, json!({})));
        self
    }

    pub fn destination(mut self, fake: &FakeDestination) -> Self {
        let adapter_type = format!("fake-destination-{}", fake.name());
        let adapter = fake.clone();
        self.registry
            .register_destination(adapter_type.clone(), move |_| {
                Ok(Box::new(adapter.clone()) as Box<dyn DestinationAdapter>)
            })
            .expect("fake destination registered twice");
        self.configs
            .push(AdapterConfig::new(fake.name(), adapter_type, json!({})));
        self
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn configs(&self) -> &[AdapterConfig] {
        &self.configs
    }

    pub fn build(self) -> Hub {
        Hub::new(&self.registry, &self.configs).expect("Failed to build hub from fakes")
    }
}
