//! Timeline settings queries.

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension};

use crate::{
    error::{DatabaseResultExt, Result, TimelineError},
    models::TimelineSettings,
};

const SELECT_SETTINGS_SQL: &str = "SELECT connection_id, follow_up_wait_days, created_at, updated_at FROM timeline_settings WHERE connection_id = ?1";
const UPSERT_SETTINGS_SQL: &str = "INSERT INTO timeline_settings (connection_id, follow_up_wait_days, created_at, updated_at) VALUES (?1, ?2, ?3, ?3) ON CONFLICT(connection_id) DO UPDATE SET follow_up_wait_days = ?2, updated_at = ?3";

impl super::Database {
    /// Helper function to construct TimelineSettings from a database row
    fn build_settings_from_row(row: &rusqlite::Row) -> rusqlite::Result<TimelineSettings> {
        Ok(TimelineSettings {
            connection_id: row.get::<_, i64>(0)? as u64,
            follow_up_wait_days: row.get::<_, i64>(1)? as u32,
            created_at: row.get::<_, String>(2)?.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
            })?,
            updated_at: row.get::<_, String>(3)?.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
            })?,
        })
    }

    /// Retrieves the settings row for a connection, if one exists.
    pub fn get_settings(&self, connection_id: u64) -> Result<Option<TimelineSettings>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_SETTINGS_SQL)
            .map_err(|e| TimelineError::database_error("Failed to prepare query", e))?;

        stmt.query_row(params![connection_id as i64], Self::build_settings_from_row)
            .optional()
            .map_err(|e| TimelineError::database_error("Failed to get settings", e))
    }

    /// Sets the follow-up wait window for a connection. Settings are
    /// updatable independently of timeline initialization, so this
    /// upserts rather than requiring an existing row.
    pub fn update_settings(
        &mut self,
        connection_id: u64,
        follow_up_wait_days: u32,
    ) -> Result<TimelineSettings> {
        if !self.connection_exists(connection_id)? {
            return Err(TimelineError::ConnectionNotFound { id: connection_id });
        }

        let now_str = Timestamp::now().to_string();
        self.connection
            .execute(
                UPSERT_SETTINGS_SQL,
                params![
                    connection_id as i64,
                    i64::from(follow_up_wait_days),
                    &now_str
                ],
            )
            .db_context("Failed to update settings")?;

        self.get_settings(connection_id)?
            .ok_or_else(|| TimelineError::Configuration {
                message: format!("Settings row missing after upsert for connection {connection_id}"),
            })
    }
}
