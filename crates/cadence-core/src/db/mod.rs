//! Database operations and SQLite management for the timeline store.
//!
//! This module provides low-level database operations for the Cadence
//! timeline system: SQLite connection handling, schema management, and
//! query interfaces for connections, stages and settings. It is pure CRUD
//! plus the transactional bodies of the engine's consequential rules; no
//! scheduling or classification logic lives here.

use std::path::Path;

use jiff::Timestamp;
use rusqlite::{types::Type, Connection};

use crate::error::{DatabaseResultExt, Result};

pub mod connection_queries;
pub mod migrations;
pub mod settings_queries;
pub mod stage_queries;

/// Parse an optional RFC 3339 column into an optional timestamp.
pub(crate) fn parse_optional_timestamp(
    idx: usize,
    value: Option<String>,
) -> rusqlite::Result<Option<Timestamp>> {
    value
        .map(|s| {
            s.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
        })
        .transpose()
}

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
