//! Deadline-driven escalation: the sweep and its recurring timer.
//!
//! The sweep finds waiting response stages whose deadline has passed and
//! asks the engine to append a follow-up stage for each, isolating
//! per-item failures so one connection cannot block the rest.
//!
//! [`DeadlineScheduler`] is the process-wide timer owner, held by the
//! composition root rather than ambient global state. `start` and `stop`
//! are idempotent; dropping the scheduler stops the timer.
//!
//! The sweep does not mark matched stages as processed: a response stage
//! left `waiting` past its deadline is matched again by the next sweep
//! and spawns another follow-up (see DESIGN.md).

use std::time::Duration;

use jiff::Timestamp;
use serde::Serialize;
use tokio::{task, task::JoinHandle};

use crate::{
    db::Database,
    engine::Engine,
    error::{Result, TimelineError},
    params::CreateNextStage,
};

/// Fixed cadence of the recurring deadline sweep.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// A waiting response stage whose deadline has passed, joined to its
/// owning connection.
#[derive(Debug, Clone, Serialize)]
pub struct ExpiredResponseStage {
    pub stage_id: u64,
    pub connection_id: u64,
    pub user_id: String,
    pub response_deadline: Timestamp,
}

/// A follow-up stage created by a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct FollowUpRecord {
    /// Connection the follow-up belongs to
    pub connection_id: u64,
    /// The expired response stage that triggered it
    pub expired_stage_id: u64,
    /// The created follow-up stage
    pub stage_id: u64,
    pub stage_order: u32,
}

/// A per-item failure captured during a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepError {
    pub connection_id: u64,
    pub stage_id: u64,
    pub message: String,
}

/// Result of one deadline sweep.
#[derive(Debug, Serialize)]
pub struct DeadlineSweep {
    pub expired_stages_found: usize,
    pub follow_ups_created: usize,
    pub follow_ups: Vec<FollowUpRecord>,
    pub errors: Vec<SweepError>,
    pub checked_at: Timestamp,
}

impl Engine {
    /// Runs one deadline sweep: finds expired waiting response stages and
    /// creates a follow-up stage for each. Per-item failures land in
    /// [`DeadlineSweep::errors`] and do not abort the rest of the sweep.
    pub async fn check_response_deadlines(&self) -> Result<DeadlineSweep> {
        let now = Timestamp::now();
        let db_path = self.db_path.clone();

        let expired = task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.expired_response_stages(now)
        })
        .await
        .map_err(|e| TimelineError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        let mut sweep = DeadlineSweep {
            expired_stages_found: expired.len(),
            follow_ups_created: 0,
            follow_ups: Vec::new(),
            errors: Vec::new(),
            checked_at: now,
        };

        for item in expired {
            let params = CreateNextStage {
                connection_id: item.connection_id,
                stage_id: item.stage_id,
                stage_type: "follow_up".to_string(),
            };

            match self.create_next_stage(&params).await {
                Ok(stage) => {
                    sweep.follow_ups_created += 1;
                    sweep.follow_ups.push(FollowUpRecord {
                        connection_id: item.connection_id,
                        expired_stage_id: item.stage_id,
                        stage_id: stage.id,
                        stage_order: stage.stage_order,
                    });
                }
                Err(e) => {
                    log::warn!(
                        "follow-up creation failed for connection {} stage {}: {e}",
                        item.connection_id,
                        item.stage_id
                    );
                    sweep.errors.push(SweepError {
                        connection_id: item.connection_id,
                        stage_id: item.stage_id,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(sweep)
    }
}

/// Owner of the recurring deadline-sweep timer.
///
/// One instance per process, held by the composition root. The guard
/// flag and the abortable handle live here instead of in globals.
pub struct DeadlineScheduler {
    engine: Engine,
    handle: Option<JoinHandle<()>>,
}

impl DeadlineScheduler {
    /// Creates a scheduler for the given engine. Does not start it.
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            handle: None,
        }
    }

    /// Starts the recurring sweep. Calling this while a timer is already
    /// running is a logged no-op, as is calling it from a test build;
    /// tests drive [`Engine::check_response_deadlines`] directly.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            log::warn!("deadline scheduler already running; start ignored");
            return;
        }

        if cfg!(test) {
            log::info!("test build: deadline scheduler not started");
            return;
        }

        log::info!(
            "starting deadline scheduler (every {}s)",
            SWEEP_INTERVAL.as_secs()
        );

        let engine = self.engine.clone();
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                match engine.check_response_deadlines().await {
                    Ok(sweep) if sweep.expired_stages_found > 0 => {
                        log::info!(
                            "deadline sweep: {} expired, {} follow-ups created, {} errors",
                            sweep.expired_stages_found,
                            sweep.follow_ups_created,
                            sweep.errors.len()
                        );
                    }
                    Ok(_) => {
                        log::debug!("deadline sweep: nothing expired");
                    }
                    Err(e) => {
                        log::error!("deadline sweep failed: {e}");
                    }
                }
            }
        }));
    }

    /// Stops the recurring sweep. Safe to call when no timer is active.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            log::info!("deadline scheduler stopped");
        }
    }

    /// Whether the timer is currently running.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for DeadlineScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
