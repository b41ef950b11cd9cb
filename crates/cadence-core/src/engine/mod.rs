//! High-level engine API for timeline progression.
//!
//! This module provides the main [`Engine`] interface for the Cadence
//! timeline system. The engine is the coordinator between interface
//! layers and the database, implementing the business rules for stage
//! progression: the auto-advancement consequence of `sent` transitions,
//! next-stage creation, settings bounds, and the deletion refusal.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   Interfaces    │    │     Engine      │    │    Database     │
//! │   (CLI, ...)    │───▶│ (stage_ops,     │───▶│    (via db/)    │
//! │                 │    │  connection_ops)│    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! All operations are async and execute their blocking rusqlite work on
//! `tokio::task::spawn_blocking`, opening a connection per operation.
//! Concurrent mutation of the same stage is serialized only by SQLite
//! itself; the engine adds no in-process locking.

use std::path::PathBuf;

// Module declarations
pub mod builder;
pub mod connection_ops;
pub mod stage_ops;

// Re-export the main types
pub use builder::EngineBuilder;

/// Main engine interface for timeline progression.
#[derive(Clone)]
pub struct Engine {
    pub(crate) db_path: PathBuf,
}

impl Engine {
    /// Creates a new engine with the specified database path.
    pub(crate) fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }
}
