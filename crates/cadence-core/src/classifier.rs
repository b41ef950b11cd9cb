//! Heuristic classification of connection records.
//!
//! Two derivations feed the messaging context: the progress sub-stage
//! (read from draft/sent fields) and the response sentiment (read from
//! free text). Sentiment matching is a data-driven rule table evaluated
//! in fixed priority order: exact negative phrases, then negative
//! keywords, then positive keywords, then neutral. Negative rules come
//! first so polite rejections containing superficially positive words
//! ("available" inside "not available") classify correctly.

use crate::models::{Connection, ProgressStage, ResponseType};

/// Exact phrases that open a polite rejection.
const NEGATIVE_PHRASES: &[&str] = &[
    "thanks for reaching out, but",
    "appreciate your interest, but",
    "thank you for thinking of me, but",
    "i'm flattered, but",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "not available",
    "not interested",
    "not a good fit",
    "not the right time",
    "not at this time",
    "busy",
    "can't",
    "cannot",
    "unable",
    "decline",
    "pass",
    "thanks but",
    "appreciate but",
    "unfortunately",
    "no thank you",
    "not looking",
    "not currently",
    "not right now",
    "too busy",
    "can't make",
    "won't be able",
    "have to pass",
    "will have to decline",
];

const POSITIVE_KEYWORDS: &[&str] = &[
    "yes",
    "absolutely",
    "definitely",
    "interested",
    "would love",
    "sounds great",
    "happy to",
    "excited",
    "looking forward",
    "let's schedule",
    "let's meet",
    "coffee",
    "lunch",
    "call me",
    "meeting",
    "available for",
    "free to",
    "works for me",
    "perfect",
    "great idea",
    "love to chat",
];

/// The ordered rule table: first matching pattern wins.
fn rules() -> impl Iterator<Item = (&'static str, ResponseType)> {
    let negatives = NEGATIVE_PHRASES
        .iter()
        .chain(NEGATIVE_KEYWORDS)
        .map(|p| (*p, ResponseType::Negative));
    let positives = POSITIVE_KEYWORDS
        .iter()
        .map(|p| (*p, ResponseType::Positive));
    negatives.chain(positives)
}

/// Derives the presentation-level progress sub-stage from a connection
/// record: email sent beats draft beats nothing. Reads only the
/// connection, never the stage table.
pub fn progress_stage(connection: &Connection) -> ProgressStage {
    if connection.last_email_sent_date.is_some() {
        ProgressStage::EmailSent
    } else if connection
        .last_email_draft
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty())
    {
        ProgressStage::DraftMade
    } else {
        ProgressStage::NotStarted
    }
}

/// Classifies a connection's reply text into a sentiment category.
pub fn detect_response_type(connection: &Connection) -> ResponseType {
    classify_text(connection.classification_text())
}

/// The matching loop over the rule table; case-insensitive substring
/// matching, first hit wins, neutral by default.
pub fn classify_text(text: &str) -> ResponseType {
    let lowered = text.to_lowercase();

    for (pattern, category) in rules() {
        if lowered.contains(pattern) {
            return category;
        }
    }

    ResponseType::Neutral
}
