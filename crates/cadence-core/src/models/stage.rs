//! Timeline stage model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{StageStatus, StageType, TimelineSettings};

/// Represents one step of outreach within a connection's timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineStage {
    /// Unique identifier for the stage
    pub id: u64,

    /// ID of the owning connection
    pub connection_id: u64,

    /// Kind of outreach step
    pub stage_type: StageType,

    /// Position within the timeline (1-indexed, unique per connection,
    /// strictly increasing in creation order)
    pub stage_order: u32,

    /// Current status of the stage
    pub stage_status: StageStatus,

    /// Draft text, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_content: Option<String>,

    /// Final email body, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_content: Option<String>,

    /// Set when the stage transitions to `sent`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<Timestamp>,

    /// Set alongside `sent_at` for outbound stage types; the instant after
    /// which the spawned response stage is considered overdue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_deadline: Option<Timestamp>,

    /// Set when a response stage transitions to `received`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_received_at: Option<Timestamp>,

    /// Timestamp when the stage was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the stage was last updated (UTC)
    pub updated_at: Timestamp,
}

/// A connection's full timeline: stages in ascending order plus settings.
///
/// Settings are `None` only for a connection whose timeline was never
/// initialized.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Timeline {
    /// Stages ordered by `stage_order` ascending
    pub stages: Vec<TimelineStage>,

    /// Per-connection settings, created alongside the first stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<TimelineSettings>,
}

/// Outcome of a status update, including any stage the transition spawned.
///
/// A `sent` transition on an outbound stage creates the next `response`
/// stage as an automatic consequence; callers observe it here.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StageUpdate {
    /// The stage as it reads after the update
    pub stage: TimelineStage,

    /// Response stage created by the auto-advancement rule, if it fired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spawned: Option<TimelineStage>,
}
