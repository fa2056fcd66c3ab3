//! Storage abstraction and implementations for Swim Hub.
//!
//! This crate provides trait-based access to goal/milestone persistence
//! and to read-only training evidence, with a JSON-file backend, an
//! optional SQLite backend, and an in-memory store for tests and fixtures.

#![warn(missing_docs)]

pub mod trait_;

pub mod memory;

#[cfg(feature = "json")]
pub mod json_storage;

#[cfg(feature = "sqlite")]
pub mod sqlite_storage;

pub use trait_::{
    EvidenceRepository, MilestoneStore, PracticeFilter, Result, StorageError, WriteOutcome,
};

pub use memory::{EvidenceFault, MemoryStore};

#[cfg(feature = "json")]
pub use json_storage::JsonStorage;

#[cfg(feature = "sqlite")]
pub use sqlite_storage::SqliteStorage;
