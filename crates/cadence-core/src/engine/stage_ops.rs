//! Stage progression operations for the Engine.

use tokio::task;

use super::Engine;
use crate::{
    db::Database,
    error::{Result, TimelineError},
    models::{StageUpdate, Timeline, TimelineSettings, TimelineStage},
    params::{CreateNextStage, Id, UpdateSettings, UpdateStageStatus},
};

impl Engine {
    /// Initializes a connection's timeline: one `first_impression` stage
    /// at order 1, status waiting, plus a settings row with the default
    /// wait window.
    pub async fn initialize_timeline(&self, params: &Id) -> Result<TimelineStage> {
        params.validate()?;
        let db_path = self.db_path.clone();
        let connection_id = params.id;

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.create_initial_timeline(connection_id)
        })
        .await
        .map_err(|e| TimelineError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Retrieves a connection's stages (ordered) and settings.
    pub async fn get_timeline(&self, params: &Id) -> Result<Timeline> {
        params.validate()?;
        let db_path = self.db_path.clone();
        let connection_id = params.id;

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_timeline(connection_id)
        })
        .await
        .map_err(|e| TimelineError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Updates a stage's status with its consequential side effects.
    ///
    /// A `sent` transition on a `first_impression` or `follow_up` stage
    /// stamps `sent_at`, computes the response deadline from the
    /// connection's wait window, and spawns the next `response` stage;
    /// the spawned stage is returned in [`StageUpdate::spawned`]. A
    /// `received` transition stamps `response_received_at`. Other
    /// statuses only merge the supplied content fields.
    pub async fn update_stage_status(&self, params: &UpdateStageStatus) -> Result<StageUpdate> {
        let new_status = params.validate()?;
        let db_path = self.db_path.clone();
        let connection_id = params.connection_id;
        let stage_id = params.stage_id;
        let draft_content = params.draft_content.clone();
        let email_content = params.email_content.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.apply_status_transition(
                connection_id,
                stage_id,
                new_status,
                draft_content,
                email_content,
            )
        })
        .await
        .map_err(|e| TimelineError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Creates the next stage of a timeline at max order + 1, status
    /// waiting. Only `response` and `follow_up` types may be appended.
    pub async fn create_next_stage(&self, params: &CreateNextStage) -> Result<TimelineStage> {
        let stage_type = params.validate()?;
        let db_path = self.db_path.clone();
        let connection_id = params.connection_id;
        let stage_id = params.stage_id;

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.create_next_stage(connection_id, stage_id, stage_type)
        })
        .await
        .map_err(|e| TimelineError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Updates a connection's follow-up wait window.
    pub async fn update_settings(&self, params: &UpdateSettings) -> Result<TimelineSettings> {
        params.validate()?;
        let db_path = self.db_path.clone();
        let connection_id = params.connection_id;
        let days = params.follow_up_wait_days;

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.update_settings(connection_id, days)
        })
        .await
        .map_err(|e| TimelineError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Stage deletion is deliberately unsupported: removing a row would
    /// break `stage_order` contiguity for the connection.
    pub async fn remove_stage(&self, _params: &Id) -> Result<()> {
        Err(TimelineError::Unsupported {
            operation: "stage deletion".to_string(),
        })
    }
}
