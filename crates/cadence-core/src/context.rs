//! Status-keyed messaging templates and the context merge.
//!
//! Each relationship status maps to a base template. Deriving a
//! [`MessagingContext`] overlays up to two partial overrides on the base:
//! the override for the connection's progress sub-stage, then (for the
//! `Response` status only) the override for the detected response
//! sentiment. Overlays are shallow and field-by-field; later overlays
//! win.

use serde::Serialize;

use crate::{
    classifier,
    models::{Connection, EmailStatus, ProgressStage, ResponseType},
};

/// Base messaging template for one relationship status.
#[derive(Debug, Clone, Copy)]
pub struct StatusTemplate {
    pub approach: &'static str,
    pub tone: &'static str,
    pub context: &'static str,
    pub call_to_action: &'static str,
    pub description: &'static str,
    /// Progress sub-stages that apply while a connection holds this status
    pub progress_stages: &'static [ProgressStage],
    /// Per-sub-stage partial overrides
    pub stage_contexts: &'static [(ProgressStage, TemplateOverride)],
    /// Per-sentiment partial overrides; populated only for `Response`
    pub response_types: &'static [(ResponseType, TemplateOverride)],
}

/// Partial template overlay; `None` fields leave the base value alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateOverride {
    pub approach: Option<&'static str>,
    pub tone: Option<&'static str>,
    pub context: Option<&'static str>,
    pub call_to_action: Option<&'static str>,
}

/// The merged context object consumed by the content generator.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessagingContext {
    pub approach: String,
    pub tone: String,
    pub context: String,
    pub call_to_action: String,
    pub current_stage: ProgressStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseType>,
}

impl MessagingContext {
    fn from_base(template: &StatusTemplate) -> Self {
        Self {
            approach: template.approach.to_string(),
            tone: template.tone.to_string(),
            context: template.context.to_string(),
            call_to_action: template.call_to_action.to_string(),
            current_stage: ProgressStage::NotStarted,
            response_type: None,
        }
    }

    fn apply(&mut self, overlay: &TemplateOverride) {
        if let Some(approach) = overlay.approach {
            self.approach = approach.to_string();
        }
        if let Some(tone) = overlay.tone {
            self.tone = tone.to_string();
        }
        if let Some(context) = overlay.context {
            self.context = context.to_string();
        }
        if let Some(call_to_action) = overlay.call_to_action {
            self.call_to_action = call_to_action.to_string();
        }
    }
}

const ALL_PROGRESS_STAGES: &[ProgressStage] = &[
    ProgressStage::NotStarted,
    ProgressStage::DraftMade,
    ProgressStage::EmailSent,
];

const NOT_CONTACTED: StatusTemplate = StatusTemplate {
    approach: "Introduce yourself and establish common ground",
    tone: "Warm, professional, and curious",
    context: "No prior contact exists; the recipient does not know you yet",
    call_to_action: "Ask for a brief introductory conversation",
    description: "Outreach has not started for this connection",
    progress_stages: ALL_PROGRESS_STAGES,
    stage_contexts: &[
        (
            ProgressStage::DraftMade,
            TemplateOverride {
                context: Some("A first draft exists; refine it rather than starting over"),
                ..EMPTY_OVERRIDE
            },
        ),
        (
            ProgressStage::EmailSent,
            TemplateOverride {
                context: Some("The introduction already went out; avoid repeating it"),
                call_to_action: Some("Reference the earlier note and invite a reply"),
                ..EMPTY_OVERRIDE
            },
        ),
    ],
    response_types: &[],
};

const FIRST_IMPRESSION: StatusTemplate = StatusTemplate {
    approach: "Make a memorable first impression built on genuine interest",
    tone: "Confident but not presumptuous",
    context: "This is the opening message of the relationship",
    call_to_action: "Suggest a short call or coffee chat",
    description: "The opening outreach message is in flight",
    progress_stages: ALL_PROGRESS_STAGES,
    stage_contexts: &[
        (
            ProgressStage::NotStarted,
            TemplateOverride {
                context: Some("Nothing has been written yet; lead with the strongest hook"),
                ..EMPTY_OVERRIDE
            },
        ),
        (
            ProgressStage::EmailSent,
            TemplateOverride {
                tone: Some("Patient and unhurried"),
                call_to_action: Some("Wait for the response window before following up"),
                ..EMPTY_OVERRIDE
            },
        ),
    ],
    response_types: &[],
};

const FOLLOW_UP: StatusTemplate = StatusTemplate {
    approach: "Re-engage without pressure, adding new value",
    tone: "Light, understanding, and brief",
    context: "The previous message went unanswered past its deadline",
    call_to_action: "Offer an easy, low-commitment next step",
    description: "Renewing outreach after a lapsed response deadline",
    progress_stages: ALL_PROGRESS_STAGES,
    stage_contexts: &[(
        ProgressStage::EmailSent,
        TemplateOverride {
            context: Some("A follow-up already went out; further nudges should be sparse"),
            ..EMPTY_OVERRIDE
        },
    )],
    response_types: &[],
};

const RESPONSE: StatusTemplate = StatusTemplate {
    approach: "Respond promptly and match the other party's energy",
    tone: "Appreciative and attentive",
    context: "The connection replied; the relationship is now two-way",
    call_to_action: "Move the conversation toward a concrete meeting",
    description: "A reply from the connection needs handling",
    progress_stages: ALL_PROGRESS_STAGES,
    stage_contexts: &[(
        ProgressStage::DraftMade,
        TemplateOverride {
            context: Some("A reply draft exists; polish and send it while momentum lasts"),
            ..EMPTY_OVERRIDE
        },
    )],
    response_types: &[
        (
            ResponseType::Positive,
            TemplateOverride {
                approach: Some("Lock in the interest they expressed"),
                tone: Some("Enthusiastic and concrete"),
                call_to_action: Some("Propose two specific times to meet"),
                ..EMPTY_OVERRIDE
            },
        ),
        (
            ResponseType::Negative,
            TemplateOverride {
                approach: Some("Accept gracefully and keep the door open"),
                tone: Some("Gracious and unbothered"),
                context: Some("They declined; pushing now would burn the bridge"),
                call_to_action: Some("Thank them and suggest reconnecting later"),
            },
        ),
        (
            ResponseType::Neutral,
            TemplateOverride {
                approach: Some("Answer their questions and build clarity"),
                call_to_action: Some("Provide the requested details and restate the ask"),
                ..EMPTY_OVERRIDE
            },
        ),
    ],
};

const MEETING_SCHEDULED: StatusTemplate = StatusTemplate {
    approach: "Confirm logistics and prepare talking points",
    tone: "Organized and appreciative",
    context: "A meeting is on the calendar",
    call_to_action: "Confirm the time and share anything needed beforehand",
    description: "The outreach succeeded; a meeting is scheduled",
    progress_stages: ALL_PROGRESS_STAGES,
    stage_contexts: &[],
    response_types: &[],
};

const EMPTY_OVERRIDE: TemplateOverride = TemplateOverride {
    approach: None,
    tone: None,
    context: None,
    call_to_action: None,
};

/// The static status template table.
pub fn status_template(status: EmailStatus) -> &'static StatusTemplate {
    match status {
        EmailStatus::NotContacted => &NOT_CONTACTED,
        EmailStatus::FirstImpression => &FIRST_IMPRESSION,
        EmailStatus::FollowUp => &FOLLOW_UP,
        EmailStatus::Response => &RESPONSE,
        EmailStatus::MeetingScheduled => &MEETING_SCHEDULED,
    }
}

/// Merges a base template with its applicable overlays into the context
/// consumed by content generation.
///
/// Overlay order: progress sub-stage override first, then (for the
/// `Response` status with response overrides present) the override for
/// the detected sentiment. Later overlays take precedence field by
/// field. The detected response type is recorded explicitly whenever the
/// response overlay path runs.
pub fn intelligent_status_context(
    template: &StatusTemplate,
    email_status: EmailStatus,
    current_stage: ProgressStage,
    connection: &Connection,
) -> MessagingContext {
    let mut merged = MessagingContext::from_base(template);

    if let Some((_, overlay)) = template
        .stage_contexts
        .iter()
        .find(|(stage, _)| *stage == current_stage)
    {
        merged.apply(overlay);
    }

    if email_status == EmailStatus::Response && !template.response_types.is_empty() {
        let detected = classifier::detect_response_type(connection);
        if let Some((_, overlay)) = template
            .response_types
            .iter()
            .find(|(response, _)| *response == detected)
        {
            merged.apply(overlay);
        }
        merged.response_type = Some(detected);
    }

    merged.current_stage = current_stage;
    merged
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;

    fn connection(status: EmailStatus, notes: Option<&str>) -> Connection {
        let now = Timestamp::now();
        Connection {
            id: 1,
            user_id: "u1".to_string(),
            email_status: status,
            last_email_sent_date: None,
            last_email_draft: None,
            custom_connection_description: None,
            notes: notes.map(String::from),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_base_template_passes_through() {
        let conn = connection(EmailStatus::MeetingScheduled, None);
        let template = status_template(EmailStatus::MeetingScheduled);
        let ctx = intelligent_status_context(
            template,
            EmailStatus::MeetingScheduled,
            ProgressStage::NotStarted,
            &conn,
        );

        assert_eq!(ctx.approach, template.approach);
        assert_eq!(ctx.tone, template.tone);
        assert_eq!(ctx.current_stage, ProgressStage::NotStarted);
        assert_eq!(ctx.response_type, None);
    }

    #[test]
    fn test_stage_override_applies() {
        let conn = connection(EmailStatus::FirstImpression, None);
        let template = status_template(EmailStatus::FirstImpression);
        let ctx = intelligent_status_context(
            template,
            EmailStatus::FirstImpression,
            ProgressStage::EmailSent,
            &conn,
        );

        // Overridden fields change, the rest stay base.
        assert_eq!(ctx.tone, "Patient and unhurried");
        assert_eq!(
            ctx.call_to_action,
            "Wait for the response window before following up"
        );
        assert_eq!(ctx.approach, template.approach);
        assert_eq!(ctx.current_stage, ProgressStage::EmailSent);
    }

    #[test]
    fn test_response_overlay_wins_over_stage_overlay() {
        // Response + DraftMade has a stage overlay on `context` and a
        // sentiment overlay on `context` for negative replies; the
        // sentiment overlay is applied later and must win.
        let conn = connection(EmailStatus::Response, Some("unfortunately I'm too busy"));
        let template = status_template(EmailStatus::Response);
        let ctx = intelligent_status_context(
            template,
            EmailStatus::Response,
            ProgressStage::DraftMade,
            &conn,
        );

        assert_eq!(ctx.response_type, Some(ResponseType::Negative));
        assert_eq!(ctx.context, "They declined; pushing now would burn the bridge");
        assert_eq!(ctx.tone, "Gracious and unbothered");
    }

    #[test]
    fn test_response_type_recorded_even_without_field_changes() {
        let conn = connection(EmailStatus::Response, Some("can you tell me more?"));
        let template = status_template(EmailStatus::Response);
        let ctx = intelligent_status_context(
            template,
            EmailStatus::Response,
            ProgressStage::NotStarted,
            &conn,
        );

        assert_eq!(ctx.response_type, Some(ResponseType::Neutral));
        assert_eq!(
            ctx.approach,
            "Answer their questions and build clarity"
        );
        // Neutral overlay leaves tone at base.
        assert_eq!(ctx.tone, template.tone);
    }

    #[test]
    fn test_non_response_status_ignores_sentiment() {
        let conn = connection(EmailStatus::FollowUp, Some("sounds great"));
        let template = status_template(EmailStatus::FollowUp);
        let ctx = intelligent_status_context(
            template,
            EmailStatus::FollowUp,
            ProgressStage::NotStarted,
            &conn,
        );

        assert_eq!(ctx.response_type, None);
        assert_eq!(ctx.approach, template.approach);
    }

    #[test]
    fn test_context_serializes_with_wire_keys() {
        let conn = connection(EmailStatus::Response, Some("yes"));
        let template = status_template(EmailStatus::Response);
        let ctx = intelligent_status_context(
            template,
            EmailStatus::Response,
            ProgressStage::EmailSent,
            &conn,
        );

        let json = serde_json::to_value(&ctx).unwrap();
        assert!(json.get("callToAction").is_some());
        assert_eq!(json["currentStage"], "Email Sent");
        assert_eq!(json["responseType"], "positive");
    }
}
