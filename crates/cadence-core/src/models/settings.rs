//! Per-connection timeline settings.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Default number of days to wait for a response before a follow-up is due.
pub const DEFAULT_FOLLOW_UP_WAIT_DAYS: u32 = 7;

/// Inclusive bounds for `follow_up_wait_days`.
pub const FOLLOW_UP_WAIT_DAYS_RANGE: std::ops::RangeInclusive<u32> = 1..=30;

/// One row per connection, created alongside the first stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineSettings {
    /// ID of the owning connection
    pub connection_id: u64,

    /// Days between sending an outbound stage and its response deadline
    pub follow_up_wait_days: u32,

    /// Timestamp when the settings row was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the settings row was last updated (UTC)
    pub updated_at: Timestamp,
}
