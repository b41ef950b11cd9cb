//! Bounded visible-window selection over a timeline.
//!
//! Pure projection for presentation: a timeline of any length maps to at
//! most three stages around the "current" one. Deterministic for a given
//! input, no side effects.

use crate::models::{StageStatus, TimelineStage};

/// Maximum number of stages surfaced to the UI at once.
pub const WINDOW_SIZE: usize = 3;

/// Selects the UI-relevant subset of a connection's stages.
///
/// Stages are sorted by `stage_order` ascending first, so callers may
/// pass the list in any order. Timelines of three stages or fewer are
/// returned whole. For longer timelines the current stage is the last
/// one whose status is not `waiting` (or the first stage when every
/// stage is waiting), and the window is the current stage with its
/// neighbors, clamped to the timeline ends.
pub fn visible_stages(stages: &[TimelineStage]) -> Vec<TimelineStage> {
    let mut sorted: Vec<TimelineStage> = stages.to_vec();
    sorted.sort_by_key(|s| s.stage_order);

    if sorted.len() <= WINDOW_SIZE {
        return sorted;
    }

    let current = sorted
        .iter()
        .rposition(|s| s.stage_status != StageStatus::Waiting)
        .unwrap_or(0);

    let range = if current == 0 {
        0..WINDOW_SIZE
    } else if current == sorted.len() - 1 {
        sorted.len() - WINDOW_SIZE..sorted.len()
    } else {
        current - 1..current + 2
    };

    sorted[range].to_vec()
}
