//! Timeline stage CRUD operations and the status-transition body.

use jiff::{SignedDuration, Timestamp};
use rusqlite::{params, types::Type, OptionalExtension, Transaction};

use super::parse_optional_timestamp;
use crate::{
    error::{DatabaseResultExt, Result, TimelineError},
    models::{
        settings::DEFAULT_FOLLOW_UP_WAIT_DAYS, StageStatus, StageType, StageUpdate, Timeline,
        TimelineStage, UpdateStageRequest,
    },
    scheduler::ExpiredResponseStage,
};

// Optimized SQL queries as const strings for compile-time optimization
const COUNT_STAGES_SQL: &str = "SELECT COUNT(*) FROM timeline_stages WHERE connection_id = ?1";
const GET_NEXT_STAGE_ORDER_SQL: &str =
    "SELECT COALESCE(MAX(stage_order), 0) + 1 FROM timeline_stages WHERE connection_id = ?1";
const INSERT_STAGE_SQL: &str = "INSERT INTO timeline_stages (connection_id, stage_type, stage_order, stage_status, draft_content, email_content, sent_at, response_deadline, response_received_at, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";
const SELECT_STAGES_BY_CONNECTION_SQL: &str = "SELECT id, connection_id, stage_type, stage_order, stage_status, draft_content, email_content, sent_at, response_deadline, response_received_at, created_at, updated_at FROM timeline_stages WHERE connection_id = ?1 ORDER BY stage_order";
const SELECT_STAGE_SCOPED_SQL: &str = "SELECT id, connection_id, stage_type, stage_order, stage_status, draft_content, email_content, sent_at, response_deadline, response_received_at, created_at, updated_at FROM timeline_stages WHERE id = ?1 AND connection_id = ?2";
const UPDATE_STAGE_SQL: &str = "UPDATE timeline_stages SET stage_status = ?1, draft_content = ?2, email_content = ?3, sent_at = ?4, response_deadline = ?5, response_received_at = ?6, updated_at = ?7 WHERE id = ?8 AND connection_id = ?9";
const CHECK_STAGE_OWNED_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM timeline_stages WHERE id = ?1 AND connection_id = ?2)";
const INSERT_SETTINGS_SQL: &str = "INSERT OR IGNORE INTO timeline_settings (connection_id, follow_up_wait_days, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)";
const SELECT_WAIT_DAYS_SQL: &str =
    "SELECT follow_up_wait_days FROM timeline_settings WHERE connection_id = ?1";
const SELECT_WAITING_RESPONSE_STAGES_SQL: &str = "SELECT s.id, s.connection_id, c.user_id, s.response_deadline FROM timeline_stages s JOIN connections c ON c.id = s.connection_id WHERE s.stage_type = 'response' AND s.stage_status = 'waiting' AND s.response_deadline IS NOT NULL";

/// Computes the instant after which a response to an outbound stage sent
/// at `sent_at` is considered overdue.
pub(crate) fn response_deadline_after(sent_at: Timestamp, wait_days: u32) -> Result<Timestamp> {
    sent_at
        .checked_add(SignedDuration::from_hours(i64::from(wait_days) * 24))
        .map_err(|e| TimelineError::Configuration {
            message: format!("Failed to compute response deadline: {e}"),
        })
}

/// Wait window for a connection, falling back to the default when no
/// settings row exists yet.
fn wait_days(tx: &Transaction, connection_id: u64) -> Result<u32> {
    let days: Option<i64> = tx
        .query_row(SELECT_WAIT_DAYS_SQL, params![connection_id as i64], |row| {
            row.get(0)
        })
        .optional()
        .db_context("Failed to query follow-up wait days")?;

    Ok(days.map_or(DEFAULT_FOLLOW_UP_WAIT_DAYS, |d| d as u32))
}

/// Computes the next stage order for a connection within a transaction.
fn next_stage_order(tx: &Transaction, connection_id: u64) -> Result<u32> {
    let order: i64 = tx
        .query_row(
            GET_NEXT_STAGE_ORDER_SQL,
            params![connection_id as i64],
            |row| row.get(0),
        )
        .db_context("Failed to get next stage order")?;

    Ok(order as u32)
}

/// Inserts a stage row within a transaction and returns the model.
fn insert_stage(
    tx: &Transaction,
    connection_id: u64,
    stage_type: StageType,
    stage_order: u32,
    stage_status: StageStatus,
    now: Timestamp,
) -> Result<TimelineStage> {
    let now_str = now.to_string();

    tx.execute(
        INSERT_STAGE_SQL,
        params![
            connection_id as i64,
            stage_type.as_str(),
            stage_order as i64,
            stage_status.as_str(),
            None::<String>,
            None::<String>,
            None::<String>,
            None::<String>,
            None::<String>,
            &now_str,
            &now_str
        ],
    )
    .db_context("Failed to insert stage")?;

    Ok(TimelineStage {
        id: tx.last_insert_rowid() as u64,
        connection_id,
        stage_type,
        stage_order,
        stage_status,
        draft_content: None,
        email_content: None,
        sent_at: None,
        response_deadline: None,
        response_received_at: None,
        created_at: now,
        updated_at: now,
    })
}

impl super::Database {
    /// Helper function to construct a TimelineStage from a database row
    fn build_stage_from_row(row: &rusqlite::Row) -> rusqlite::Result<TimelineStage> {
        let type_str: String = row.get(2)?;
        let stage_type = type_str.parse::<StageType>().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                Type::Text,
                format!("Invalid stage type: {type_str}").into(),
            )
        })?;

        let status_str: String = row.get(4)?;
        let stage_status = status_str.parse::<StageStatus>().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                Type::Text,
                format!("Invalid stage status: {status_str}").into(),
            )
        })?;

        Ok(TimelineStage {
            id: row.get::<_, i64>(0)? as u64,
            connection_id: row.get::<_, i64>(1)? as u64,
            stage_type,
            stage_order: row.get::<_, i64>(3)? as u32,
            stage_status,
            draft_content: row.get(5)?,
            email_content: row.get(6)?,
            sent_at: parse_optional_timestamp(7, row.get(7)?)?,
            response_deadline: parse_optional_timestamp(8, row.get(8)?)?,
            response_received_at: parse_optional_timestamp(9, row.get(9)?)?,
            created_at: row
                .get::<_, String>(10)?
                .parse::<Timestamp>()
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(10, Type::Text, Box::new(e))
                })?,
            updated_at: row
                .get::<_, String>(11)?
                .parse::<Timestamp>()
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(e))
                })?,
        })
    }

    /// Creates the first stage of a connection's timeline plus its
    /// settings row.
    pub fn create_initial_timeline(&mut self, connection_id: u64) -> Result<TimelineStage> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let connection_exists: bool = tx
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM connections WHERE id = ?1)",
                params![connection_id as i64],
                |row| row.get(0),
            )
            .db_context("Failed to check connection existence")?;

        if !connection_exists {
            return Err(TimelineError::ConnectionNotFound { id: connection_id });
        }

        let stage_count: i64 = tx
            .query_row(COUNT_STAGES_SQL, params![connection_id as i64], |row| {
                row.get(0)
            })
            .db_context("Failed to count stages")?;

        if stage_count > 0 {
            return Err(TimelineError::invalid_input(
                "connection_id",
                format!("Timeline already initialized for connection {connection_id}"),
            ));
        }

        let now = Timestamp::now();
        let stage = insert_stage(
            &tx,
            connection_id,
            StageType::FirstImpression,
            1,
            StageStatus::Waiting,
            now,
        )?;

        let now_str = now.to_string();
        tx.execute(
            INSERT_SETTINGS_SQL,
            params![
                connection_id as i64,
                i64::from(DEFAULT_FOLLOW_UP_WAIT_DAYS),
                &now_str,
                &now_str
            ],
        )
        .db_context("Failed to insert timeline settings")?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(stage)
    }

    /// Retrieves all stages for a connection, ordered by stage_order
    /// ascending, plus the settings row.
    pub fn get_timeline(&self, connection_id: u64) -> Result<Timeline> {
        if !self.connection_exists(connection_id)? {
            return Err(TimelineError::ConnectionNotFound { id: connection_id });
        }

        let mut stmt = self
            .connection
            .prepare(SELECT_STAGES_BY_CONNECTION_SQL)
            .map_err(|e| TimelineError::database_error("Failed to prepare query", e))?;

        let stages = stmt
            .query_map(params![connection_id as i64], Self::build_stage_from_row)
            .map_err(|e| TimelineError::database_error("Failed to query stages", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| TimelineError::database_error("Failed to fetch stages", e))?;

        let settings = self.get_settings(connection_id)?;

        Ok(Timeline { stages, settings })
    }

    /// Retrieves a single stage scoped to its owning connection.
    pub fn get_stage(&self, connection_id: u64, stage_id: u64) -> Result<Option<TimelineStage>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_STAGE_SCOPED_SQL)
            .map_err(|e| TimelineError::database_error("Failed to prepare query", e))?;

        stmt.query_row(
            params![stage_id as i64, connection_id as i64],
            Self::build_stage_from_row,
        )
        .optional()
        .map_err(|e| TimelineError::database_error("Failed to get stage", e))
    }

    /// Inserts a stage at a caller-supplied order. No uniqueness re-check
    /// beyond the table constraint; callers are expected to have computed
    /// the next order correctly.
    pub fn create_stage(
        &mut self,
        connection_id: u64,
        stage_type: StageType,
        stage_order: u32,
        stage_status: StageStatus,
    ) -> Result<TimelineStage> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let stage = insert_stage(
            &tx,
            connection_id,
            stage_type,
            stage_order,
            stage_status,
            Timestamp::now(),
        )?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(stage)
    }

    /// Appends a stage of the given type after the current maximum order.
    /// The new stage always starts as `waiting`.
    pub fn create_next_stage(
        &mut self,
        connection_id: u64,
        current_stage_id: u64,
        stage_type: StageType,
    ) -> Result<TimelineStage> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let owned: bool = tx
            .query_row(
                CHECK_STAGE_OWNED_SQL,
                params![current_stage_id as i64, connection_id as i64],
                |row| row.get(0),
            )
            .db_context("Failed to check stage ownership")?;

        if !owned {
            return Err(TimelineError::StageNotFound {
                id: current_stage_id,
            });
        }

        let next_order = next_stage_order(&tx, connection_id)?;
        let stage = insert_stage(
            &tx,
            connection_id,
            stage_type,
            next_order,
            StageStatus::Waiting,
            Timestamp::now(),
        )?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(stage)
    }

    /// Merges the provided fields into a stage and returns the updated
    /// row. Rejects an empty field set and rows not owned by the given
    /// connection.
    pub fn update_stage(
        &mut self,
        connection_id: u64,
        stage_id: u64,
        request: UpdateStageRequest,
    ) -> Result<TimelineStage> {
        if request.is_empty() {
            return Err(TimelineError::invalid_input(
                "fields",
                "No valid fields to update",
            ));
        }

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let current = tx
            .query_row(
                SELECT_STAGE_SCOPED_SQL,
                params![stage_id as i64, connection_id as i64],
                Self::build_stage_from_row,
            )
            .map_err(|e| {
                if matches!(e, rusqlite::Error::QueryReturnedNoRows) {
                    TimelineError::StageNotFound { id: stage_id }
                } else {
                    TimelineError::database_error("Failed to get current stage", e)
                }
            })?;

        let now = Timestamp::now();
        let updated = TimelineStage {
            stage_status: request.stage_status.unwrap_or(current.stage_status),
            draft_content: request.draft_content.or(current.draft_content),
            email_content: request.email_content.or(current.email_content),
            sent_at: request.sent_at.or(current.sent_at),
            response_deadline: request.response_deadline.or(current.response_deadline),
            response_received_at: request
                .response_received_at
                .or(current.response_received_at),
            updated_at: now,
            ..current
        };

        write_stage_fields(&tx, &updated)?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(updated)
    }

    /// Applies a status transition with its consequential side effects in
    /// one transaction: timestamp stamping and, for a `sent` transition on
    /// an outbound stage, the deadline computation plus response-stage
    /// spawn.
    pub fn apply_status_transition(
        &mut self,
        connection_id: u64,
        stage_id: u64,
        new_status: StageStatus,
        draft_content: Option<String>,
        email_content: Option<String>,
    ) -> Result<StageUpdate> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let current = tx
            .query_row(
                SELECT_STAGE_SCOPED_SQL,
                params![stage_id as i64, connection_id as i64],
                Self::build_stage_from_row,
            )
            .map_err(|e| {
                if matches!(e, rusqlite::Error::QueryReturnedNoRows) {
                    TimelineError::StageNotFound { id: stage_id }
                } else {
                    TimelineError::database_error("Failed to get current stage", e)
                }
            })?;

        let now = Timestamp::now();
        let mut updated = TimelineStage {
            stage_status: new_status,
            draft_content: draft_content.or(current.draft_content.clone()),
            email_content: email_content.or(current.email_content.clone()),
            updated_at: now,
            ..current
        };

        let mut spawn_response = false;
        match new_status {
            StageStatus::Sent => {
                updated.sent_at = Some(now);
                if updated.stage_type.is_outbound() {
                    let days = wait_days(&tx, connection_id)?;
                    updated.response_deadline = Some(response_deadline_after(now, days)?);
                    spawn_response = true;
                }
            }
            StageStatus::Received => {
                updated.response_received_at = Some(now);
            }
            StageStatus::Waiting | StageStatus::Draft => {}
        }

        write_stage_fields(&tx, &updated)?;

        let spawned = if spawn_response {
            let next_order = next_stage_order(&tx, connection_id)?;
            Some(insert_stage(
                &tx,
                connection_id,
                StageType::Response,
                next_order,
                StageStatus::Waiting,
                now,
            )?)
        } else {
            None
        };

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(StageUpdate {
            stage: updated,
            spawned,
        })
    }

    /// Waiting response stages whose deadline has passed, joined to their
    /// owning connection.
    ///
    /// Deadline strings carry variable sub-second precision and do not
    /// collate lexicographically, so candidates are compared as parsed
    /// timestamps here rather than in SQL.
    pub fn expired_response_stages(&self, now: Timestamp) -> Result<Vec<ExpiredResponseStage>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_WAITING_RESPONSE_STAGES_SQL)
            .map_err(|e| TimelineError::database_error("Failed to prepare query", e))?;

        let candidates = stmt
            .query_map([], |row| {
                Ok(ExpiredResponseStage {
                    stage_id: row.get::<_, i64>(0)? as u64,
                    connection_id: row.get::<_, i64>(1)? as u64,
                    user_id: row.get(2)?,
                    response_deadline: row
                        .get::<_, String>(3)?
                        .parse::<Timestamp>()
                        .map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
                        })?,
                })
            })
            .map_err(|e| TimelineError::database_error("Failed to query response stages", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| TimelineError::database_error("Failed to fetch response stages", e))?;

        Ok(candidates
            .into_iter()
            .filter(|c| c.response_deadline <= now)
            .collect())
    }
}

/// Writes the mutable stage fields back within a transaction.
fn write_stage_fields(tx: &Transaction, stage: &TimelineStage) -> Result<()> {
    tx.execute(
        UPDATE_STAGE_SQL,
        params![
            stage.stage_status.as_str(),
            stage.draft_content.as_deref(),
            stage.email_content.as_deref(),
            stage.sent_at.map(|t| t.to_string()),
            stage.response_deadline.map(|t| t.to_string()),
            stage.response_received_at.map(|t| t.to_string()),
            stage.updated_at.to_string(),
            stage.id as i64,
            stage.connection_id as i64
        ],
    )
    .db_context("Failed to update stage")?;

    Ok(())
}
