//! Display formatting for timeline output.
//!
//! Domain models implement [`std::fmt::Display`] directly; newtype
//! wrappers provide contextual formatting for collections and reports.
//! All formatters produce markdown for rich terminal rendering.

use std::fmt;

use crate::{
    models::{Connection, Timeline, TimelineStage},
    scheduler::DeadlineSweep,
};

impl fmt::Display for TimelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "**{}.** {} — {}",
            self.stage_order,
            self.stage_type.as_str(),
            self.stage_status.with_icon()
        )?;

        if let Some(sent_at) = self.sent_at {
            write!(f, "\n   - Sent: {sent_at}")?;
        }
        if let Some(deadline) = self.response_deadline {
            write!(f, "\n   - Response deadline: {deadline}")?;
        }
        if let Some(received_at) = self.response_received_at {
            write!(f, "\n   - Response received: {received_at}")?;
        }
        if let Some(draft) = &self.draft_content {
            write!(f, "\n   - Draft: {}", summarize(draft))?;
        }

        Ok(())
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Connection {}", self.id)?;
        writeln!(f, "- Status: {}", self.email_status.as_str())?;
        writeln!(f, "- User: {}", self.user_id)?;
        if let Some(sent) = self.last_email_sent_date {
            writeln!(f, "- Last email sent: {sent}")?;
        }
        if let Some(notes) = &self.notes {
            writeln!(f, "- Notes: {}", summarize(notes))?;
        }
        Ok(())
    }
}

/// Stage list wrapper with a heading, for both full and windowed views.
pub struct Stages<'a> {
    stages: &'a [TimelineStage],
    heading: &'a str,
}

impl<'a> Stages<'a> {
    pub fn new(stages: &'a [TimelineStage], heading: &'a str) -> Self {
        Self { stages, heading }
    }
}

impl fmt::Display for Stages<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.heading)?;
        if self.stages.is_empty() {
            writeln!(f, "No stages yet.")?;
            return Ok(());
        }
        for stage in self.stages {
            writeln!(f, "{stage}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Stages::new(&self.stages, "Timeline"))?;
        if let Some(settings) = &self.settings {
            writeln!(
                f,
                "\nFollow-up wait: {} days",
                settings.follow_up_wait_days
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for DeadlineSweep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Deadline Sweep")?;
        writeln!(f, "- Checked at: {}", self.checked_at)?;
        writeln!(f, "- Expired stages found: {}", self.expired_stages_found)?;
        writeln!(f, "- Follow-ups created: {}", self.follow_ups_created)?;

        for follow_up in &self.follow_ups {
            writeln!(
                f,
                "  - Connection {}: stage {} (order {}) after expired stage {}",
                follow_up.connection_id,
                follow_up.stage_id,
                follow_up.stage_order,
                follow_up.expired_stage_id
            )?;
        }

        if !self.errors.is_empty() {
            writeln!(f, "- Errors: {}", self.errors.len())?;
            for error in &self.errors {
                writeln!(
                    f,
                    "  - Connection {} stage {}: {}",
                    error.connection_id, error.stage_id, error.message
                )?;
            }
        }

        Ok(())
    }
}

/// First line of a text block, truncated for one-line summaries.
fn summarize(text: &str) -> String {
    const MAX: usize = 60;
    let first_line = text.lines().next().unwrap_or("");
    if first_line.chars().count() > MAX {
        let truncated: String = first_line.chars().take(MAX).collect();
        format!("{truncated}…")
    } else {
        first_line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_truncates_long_lines() {
        let long = "x".repeat(80);
        let summary = summarize(&long);
        assert!(summary.ends_with('…'));
        assert_eq!(summary.chars().count(), 61);
    }

    #[test]
    fn test_summarize_keeps_first_line() {
        assert_eq!(summarize("hello\nworld"), "hello");
    }
}
