//! Built-in destination adapters

pub mod local;

pub use local::LocalDestination;
