//! Status enumerations for timeline stages.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of stage types.
///
/// `first_impression` and `follow_up` are outbound: transitioning either
/// to `sent` spawns a `response` stage with a computed deadline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StageType {
    /// Opening outreach message of a timeline
    FirstImpression,

    /// Waiting period for the other party to reply
    Response,

    /// Renewed outreach after a response deadline lapsed
    FollowUp,
}

impl FromStr for StageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first_impression" => Ok(StageType::FirstImpression),
            "response" => Ok(StageType::Response),
            "follow_up" | "followup" => Ok(StageType::FollowUp),
            _ => Err(format!("Invalid stage type: {s}")),
        }
    }
}

impl StageType {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StageType::FirstImpression => "first_impression",
            StageType::Response => "response",
            StageType::FollowUp => "follow_up",
        }
    }

    /// Whether a `sent` transition on this stage type spawns a response
    /// stage with a deadline.
    pub fn is_outbound(&self) -> bool {
        matches!(self, StageType::FirstImpression | StageType::FollowUp)
    }
}

/// Type-safe enumeration of stage statuses.
///
/// The state machine is deliberately loose: any status may be written to
/// any stage. Only the `sent` transition carries consequences.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Stage has no content yet
    #[default]
    Waiting,

    /// A draft has been written but not sent
    Draft,

    /// The message left the building
    Sent,

    /// A reply came back
    Received,
}

impl FromStr for StageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "waiting" => Ok(StageStatus::Waiting),
            "draft" => Ok(StageStatus::Draft),
            "sent" => Ok(StageStatus::Sent),
            "received" => Ok(StageStatus::Received),
            _ => Err(format!("Invalid stage status: {s}")),
        }
    }
}

impl StageStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Waiting => "waiting",
            StageStatus::Draft => "draft",
            StageStatus::Sent => "sent",
            StageStatus::Received => "received",
        }
    }

    /// Get status with consistent icon formatting for display.
    pub fn with_icon(&self) -> &'static str {
        match self {
            StageStatus::Waiting => "○ Waiting",
            StageStatus::Draft => "✎ Draft",
            StageStatus::Sent => "➤ Sent",
            StageStatus::Received => "✓ Received",
        }
    }
}
