//! Parameter structures for Cadence operations
//!
//! Shared parameter structures usable across different interfaces (CLI,
//! future HTTP layer) without framework-specific derives. Interface layers
//! wrap these with their own derives (clap, etc.) and convert via `From`.
//!
//! Validation that belongs to the domain (status vocabulary, stage-type
//! restrictions, settings bounds) lives here so every interface rejects
//! the same inputs with the same errors.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    models::{
        settings::FOLLOW_UP_WAIT_DAYS_RANGE, EmailStatus, StageStatus, StageType,
    },
    Result, TimelineError,
};

/// Generic parameters for operations requiring just a connection ID.
///
/// Used for operations like initialize_timeline, get_timeline,
/// messaging_context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Id {
    /// The ID of the resource to operate on
    pub id: u64,
}

impl Id {
    /// Reject the zero id, the typed stand-in for an absent identifier.
    pub fn validate(&self) -> Result<()> {
        if self.id == 0 {
            return Err(TimelineError::invalid_input(
                "id",
                "Identifier is required and must be positive",
            ));
        }
        Ok(())
    }
}

/// Parameters for seeding a connection row.
///
/// Connection lifecycle is owned by the surrounding application; this
/// exists for local CLI use and tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateConnection {
    /// Owning application user (required)
    pub user_id: String,
    /// Relationship status; one of 'Not Contacted', 'First Impression',
    /// 'Follow-up', 'Response', 'Meeting Scheduled'
    pub email_status: Option<String>,
    /// Most recent unsent draft text
    pub last_email_draft: Option<String>,
    /// Free text describing the relationship
    pub custom_connection_description: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
}

impl CreateConnection {
    /// Validate and parse the email status, defaulting to Not Contacted.
    pub fn validate(&self) -> Result<EmailStatus> {
        match &self.email_status {
            Some(status_str) => {
                EmailStatus::from_str(status_str).map_err(|_| {
                    TimelineError::invalid_input(
                        "email_status",
                        format!(
                            "Invalid email status: {status_str}. Must be one of \
                             'Not Contacted', 'First Impression', 'Follow-up', \
                             'Response', or 'Meeting Scheduled'"
                        ),
                    )
                })
            }
            None => Ok(EmailStatus::NotContacted),
        }
    }
}

/// Parameters for updating a stage's status.
///
/// Any status value may be written to any stage; the consequential rule
/// (sent on an outbound stage spawns a response stage) is applied by the
/// engine, not chosen by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStageStatus {
    /// ID of the connection owning the stage
    pub connection_id: u64,
    /// ID of the stage to update
    pub stage_id: u64,
    /// New status ('waiting', 'draft', 'sent', or 'received')
    pub status: String,
    /// Draft text to store alongside the status change
    pub draft_content: Option<String>,
    /// Final email body to store alongside the status change
    pub email_content: Option<String>,
}

impl UpdateStageStatus {
    /// Validate the status against the stage-status vocabulary.
    pub fn validate(&self) -> Result<StageStatus> {
        StageStatus::from_str(&self.status).map_err(|_| {
            TimelineError::invalid_input(
                "status",
                format!(
                    "Invalid status: {}. Must be 'waiting', 'draft', 'sent', or 'received'",
                    self.status
                ),
            )
        })
    }
}

/// Parameters for explicitly creating the next stage of a timeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateNextStage {
    /// ID of the connection owning the timeline
    pub connection_id: u64,
    /// ID of the stage being advanced from
    pub stage_id: u64,
    /// Type of the new stage ('response' or 'follow_up')
    pub stage_type: String,
}

impl CreateNextStage {
    /// Validate the stage type. Only `response` and `follow_up` stages may
    /// be appended; a timeline has exactly one `first_impression`.
    pub fn validate(&self) -> Result<StageType> {
        match StageType::from_str(&self.stage_type) {
            Ok(StageType::Response) => Ok(StageType::Response),
            Ok(StageType::FollowUp) => Ok(StageType::FollowUp),
            _ => Err(TimelineError::invalid_input(
                "stage_type",
                format!(
                    "Invalid stage type: {}. Must be 'response' or 'follow_up'",
                    self.stage_type
                ),
            )),
        }
    }
}

/// Parameters for updating a connection's follow-up wait window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSettings {
    /// ID of the connection whose settings to update
    pub connection_id: u64,
    /// Days to wait for a response before a follow-up is due (1-30)
    pub follow_up_wait_days: u32,
}

impl UpdateSettings {
    /// Validate the wait window against its inclusive bounds.
    pub fn validate(&self) -> Result<()> {
        if !FOLLOW_UP_WAIT_DAYS_RANGE.contains(&self.follow_up_wait_days) {
            return Err(TimelineError::invalid_input(
                "follow_up_wait_days",
                format!(
                    "Value {} is out of range. Must be between {} and {} days",
                    self.follow_up_wait_days,
                    FOLLOW_UP_WAIT_DAYS_RANGE.start(),
                    FOLLOW_UP_WAIT_DAYS_RANGE.end()
                ),
            ));
        }
        Ok(())
    }
}
