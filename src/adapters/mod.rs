//! Adapter capability contracts
//!
//! Every backend plugs into the hub through one of two roles:
//! - [`SourceAdapter`]: a live system that can be dumped and restored
//! - [`DestinationAdapter`]: storage that keeps artifacts and hands them back
//!
//! Adapter failures are opaque to the hub, so both traits return
//! [`anyhow::Result`]. The hub wraps them with the step and adapter name.

pub mod destinations;
pub mod sources;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A system that produces backup artifacts and can apply them back
pub trait SourceAdapter: Send + Sync {
    /// Cheap connectivity/availability probe, run before any backup work
    fn validate(&self) -> Result<()>;

    /// Produce a backup artifact on local disk and return its path
    fn backup(&self) -> Result<PathBuf>;

    /// Apply a previously retrieved artifact onto the live system
    fn restore(&self, artifact: &Path) -> Result<()>;
}

/// Storage that durably keeps artifacts produced by a source
///
/// `retrieve(store(path)?)` must yield a byte-identical copy of `path`.
/// The identifier scheme is adapter-defined and only needs to be unique
/// within the adapter.
pub trait DestinationAdapter: Send + Sync {
    /// Persist the artifact and return an identifier to retrieve it later
    fn store(&self, artifact: &Path) -> Result<String>;

    /// Materialize the stored artifact at a local, readable path
    fn retrieve(&self, identifier: &str) -> Result<PathBuf>;
}

/// File name for a freshly produced artifact, e.g. `20250101-020000.dump`
pub(crate) fn timestamped_name(extension: &str) -> String {
    format!(
        "{}.{}",
        chrono::Local::now().format("%Y%m%d-%H%M%S"),
        extension
    )
}
