//! Connection operations for the Engine.
//!
//! Connection lifecycle belongs to the surrounding application; these
//! ops cover the read side the engine needs plus local seeding, and the
//! derivation of a connection's messaging context.

use tokio::task;

use super::Engine;
use crate::{
    classifier,
    context::{self, MessagingContext},
    db::Database,
    error::{Result, TimelineError},
    models::Connection,
    params::{CreateConnection, Id},
};

impl Engine {
    /// Seeds a connection row for local use.
    pub async fn add_connection(&self, params: &CreateConnection) -> Result<Connection> {
        let email_status = params.validate()?;
        let db_path = self.db_path.clone();
        let user_id = params.user_id.clone();
        let last_email_draft = params.last_email_draft.clone();
        let description = params.custom_connection_description.clone();
        let notes = params.notes.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.insert_connection(
                &user_id,
                email_status,
                None,
                last_email_draft.as_deref(),
                description.as_deref(),
                notes.as_deref(),
            )
        })
        .await
        .map_err(|e| TimelineError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Retrieves a single connection by its ID.
    pub async fn get_connection(&self, params: &Id) -> Result<Option<Connection>> {
        params.validate()?;
        let db_path = self.db_path.clone();
        let connection_id = params.id;

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_connection(connection_id)
        })
        .await
        .map_err(|e| TimelineError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Derives the messaging context for a connection: status template,
    /// progress sub-stage, and (for responses) detected sentiment, merged
    /// into the object consumed by content generation.
    pub async fn messaging_context(&self, params: &Id) -> Result<MessagingContext> {
        let connection = self
            .get_connection(params)
            .await?
            .ok_or(TimelineError::ConnectionNotFound { id: params.id })?;

        let current_stage = classifier::progress_stage(&connection);
        let template = context::status_template(connection.email_status);

        Ok(context::intelligent_status_context(
            template,
            connection.email_status,
            current_stage,
            &connection,
        ))
    }
}
