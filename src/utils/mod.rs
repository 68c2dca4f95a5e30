pub mod command;
pub mod locker;

// Trait-based abstraction for testability
pub mod executor;

pub use executor::{CommandExecutor, RealExecutor};
