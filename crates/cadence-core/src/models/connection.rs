//! Connection model and the presentation-level classification vocabulary.
//!
//! Connection lifecycle is owned by the surrounding application; the
//! engine only reads these rows. [`ProgressStage`] and [`ResponseType`]
//! are derived from a connection record, never stored.

use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// An external party being courted for a professional relationship.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Connection {
    /// Unique identifier for the connection
    pub id: u64,

    /// Owning application user
    pub user_id: String,

    /// Relationship status driving template selection
    pub email_status: EmailStatus,

    /// When the most recent email went out, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_email_sent_date: Option<Timestamp>,

    /// Most recent unsent draft, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_email_draft: Option<String>,

    /// Free text describing the relationship; classified ahead of `notes`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_connection_description: Option<String>,

    /// Free-text notes, classified when no description is present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Timestamp when the connection was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the connection was last updated (UTC)
    pub updated_at: Timestamp,
}

impl Connection {
    /// The free text the response classifier reads: the custom description
    /// when present, otherwise the notes.
    pub fn classification_text(&self) -> &str {
        self.custom_connection_description
            .as_deref()
            .or(self.notes.as_deref())
            .unwrap_or("")
    }
}

/// Relationship status of a connection, keyed into the template table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EmailStatus {
    /// No outreach has happened yet
    #[default]
    #[serde(rename = "Not Contacted")]
    NotContacted,

    /// Working on or just sent the opening message
    #[serde(rename = "First Impression")]
    FirstImpression,

    /// Re-engaging after silence
    #[serde(rename = "Follow-up")]
    FollowUp,

    /// The other party replied
    #[serde(rename = "Response")]
    Response,

    /// A meeting is on the calendar
    #[serde(rename = "Meeting Scheduled")]
    MeetingScheduled,
}

impl FromStr for EmailStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "not contacted" => Ok(EmailStatus::NotContacted),
            "first impression" => Ok(EmailStatus::FirstImpression),
            "follow-up" | "follow up" => Ok(EmailStatus::FollowUp),
            "response" => Ok(EmailStatus::Response),
            "meeting scheduled" => Ok(EmailStatus::MeetingScheduled),
            _ => Err(format!("Invalid email status: {s}")),
        }
    }
}

impl EmailStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatus::NotContacted => "Not Contacted",
            EmailStatus::FirstImpression => "First Impression",
            EmailStatus::FollowUp => "Follow-up",
            EmailStatus::Response => "Response",
            EmailStatus::MeetingScheduled => "Meeting Scheduled",
        }
    }
}

/// Simplified progress sub-stage derived from a connection record.
///
/// Distinct from [`super::StageStatus`]: this is presentation-level and
/// reads only connection fields, not the stage table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProgressStage {
    #[serde(rename = "Not Started")]
    NotStarted,

    #[serde(rename = "Draft Made")]
    DraftMade,

    #[serde(rename = "Email Sent")]
    EmailSent,
}

impl ProgressStage {
    /// Convert to the wire string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStage::NotStarted => "Not Started",
            ProgressStage::DraftMade => "Draft Made",
            ProgressStage::EmailSent => "Email Sent",
        }
    }
}

/// Sentiment category of a connection's reply text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Positive,
    Negative,
    Neutral,
}

impl ResponseType {
    /// Convert to the wire string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Positive => "positive",
            ResponseType::Negative => "negative",
            ResponseType::Neutral => "neutral",
        }
    }
}
