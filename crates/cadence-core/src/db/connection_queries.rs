//! Connection lookup queries.
//!
//! The engine treats connection rows as read-only; `insert_connection`
//! exists so the CLI and tests can seed rows locally in place of the
//! owning application.

use std::str::FromStr;

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension};

use super::parse_optional_timestamp;
use crate::{
    error::{DatabaseResultExt, Result, TimelineError},
    models::{Connection, EmailStatus},
};

const CHECK_CONNECTION_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM connections WHERE id = ?1)";
const SELECT_CONNECTION_SQL: &str = "SELECT id, user_id, email_status, last_email_sent_date, last_email_draft, custom_connection_description, notes, created_at, updated_at FROM connections WHERE id = ?1";
const INSERT_CONNECTION_SQL: &str = "INSERT INTO connections (user_id, email_status, last_email_sent_date, last_email_draft, custom_connection_description, notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

impl super::Database {
    /// Helper function to construct a Connection from a database row
    pub(crate) fn build_connection_from_row(row: &rusqlite::Row) -> rusqlite::Result<Connection> {
        let status_str: String = row.get(2)?;
        let email_status = EmailStatus::from_str(&status_str).map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                Type::Text,
                format!("Invalid email status: {status_str}").into(),
            )
        })?;

        Ok(Connection {
            id: row.get::<_, i64>(0)? as u64,
            user_id: row.get(1)?,
            email_status,
            last_email_sent_date: parse_optional_timestamp(3, row.get(3)?)?,
            last_email_draft: row.get(4)?,
            custom_connection_description: row.get(5)?,
            notes: row.get(6)?,
            created_at: row.get::<_, String>(7)?.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e))
            })?,
            updated_at: row.get::<_, String>(8)?.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e))
            })?,
        })
    }

    /// Checks whether a connection row exists.
    pub fn connection_exists(&self, connection_id: u64) -> Result<bool> {
        self.connection
            .query_row(
                CHECK_CONNECTION_EXISTS_SQL,
                params![connection_id as i64],
                |row| row.get(0),
            )
            .db_context("Failed to check connection existence")
    }

    /// Retrieves a single connection by its ID.
    pub fn get_connection(&self, connection_id: u64) -> Result<Option<Connection>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_CONNECTION_SQL)
            .map_err(|e| TimelineError::database_error("Failed to prepare query", e))?;

        stmt.query_row(
            params![connection_id as i64],
            Self::build_connection_from_row,
        )
        .optional()
        .map_err(|e| TimelineError::database_error("Failed to get connection", e))
    }

    /// Inserts a connection row for local use.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_connection(
        &mut self,
        user_id: &str,
        email_status: EmailStatus,
        last_email_sent_date: Option<Timestamp>,
        last_email_draft: Option<&str>,
        custom_connection_description: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Connection> {
        let now = Timestamp::now();
        let now_str = now.to_string();

        self.connection
            .execute(
                INSERT_CONNECTION_SQL,
                params![
                    user_id,
                    email_status.as_str(),
                    last_email_sent_date.map(|t| t.to_string()),
                    last_email_draft,
                    custom_connection_description,
                    notes,
                    &now_str,
                    &now_str
                ],
            )
            .map_err(|e| TimelineError::database_error("Failed to insert connection", e))?;

        let id = self.connection.last_insert_rowid() as u64;

        Ok(Connection {
            id,
            user_id: user_id.into(),
            email_status,
            last_email_sent_date,
            last_email_draft: last_email_draft.map(String::from),
            custom_connection_description: custom_connection_description.map(String::from),
            notes: notes.map(String::from),
            created_at: now,
            updated_at: now,
        })
    }
}
