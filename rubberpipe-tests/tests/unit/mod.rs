//! Unit tests for rubberpipe
//!
//! Registry setup, hub construction and the persisted stores.

mod hub_construction;
mod registry;
mod settings;
