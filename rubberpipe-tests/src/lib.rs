//! Test utilities for rubberpipe
//!
//! This crate provides call-recording fake adapters, fixtures and a
//! temp-dir backed test context for exercising the hub workflows.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{CallLog, FakeDestination, FakeHubBuilder, FakeSource};
//!
//! #[test]
//! fn my_test() {
//!     let log = CallLog::new();
//!     let db = FakeSource::new("db", "/tmp/a.dump", &log);
//!     let disk = FakeDestination::new("disk", "/backups", &log);
//!     let hub = FakeHubBuilder::new().source(&db).destination(&disk).build();
//!     // ... test code
//! }
//! ```

pub mod fakes;
pub mod fixtures;
pub mod test_context;

// Re-export commonly used items
pub use fakes::{CallLog, FakeDestination, FakeHubBuilder, FakeSource, FakeStep};
pub use fixtures::*;
pub use test_context::TestContext;

// Re-export types from the main crate for convenience
pub use rubberpipe::config::AdapterConfig;
pub use rubberpipe::hub::{ErrorKind, Hub, HubError};
pub use rubberpipe::registry::{AdapterRegistry, AdapterRole, RegistryError};
pub use rubberpipe::stores::{BackupRecord, BackupStatus, HistoryStore, NewBackupRecord};

// Re-export mock implementations from the main crate
pub use rubberpipe::stores::mock::{InMemoryConfigStore, InMemoryHistoryStore};
pub use rubberpipe::utils::executor::mock::{MockExecutor, MockResponse};
pub use rubberpipe::utils::executor::CommandExecutor;
