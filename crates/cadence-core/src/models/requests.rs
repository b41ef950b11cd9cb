//! Request types for updating models.

use jiff::Timestamp;

use super::StageStatus;

/// Field set for a stage update, filtered to recognized columns.
///
/// An all-`None` request is the typed equivalent of an update payload
/// containing only unrecognized fields and is rejected by the store.
#[derive(Debug, Clone, Default)]
pub struct UpdateStageRequest {
    pub stage_status: Option<StageStatus>,
    pub draft_content: Option<String>,
    pub email_content: Option<String>,
    pub sent_at: Option<Timestamp>,
    pub response_deadline: Option<Timestamp>,
    pub response_received_at: Option<Timestamp>,
}

impl UpdateStageRequest {
    /// True when no recognized field is present.
    pub fn is_empty(&self) -> bool {
        self.stage_status.is_none()
            && self.draft_content.is_none()
            && self.email_content.is_none()
            && self.sent_at.is_none()
            && self.response_deadline.is_none()
            && self.response_received_at.is_none()
    }
}
