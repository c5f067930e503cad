//! Keyword routing of assistant questions.
//!
//! Decides whether a question asks to check a proposed date for conflicts,
//! asks for a listing of scheduled or completed changes, or is something this
//! crate does not answer.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// "Can I schedule the upgrade on March 3?"
    ScheduleConflict,
    /// "Show me changes planned for next week."
    ScheduledChanges,
    Unrouted,
}

const SCHEDULING_PHRASES: &[&str] = &["schedule", "plan for", "implement on", "can i", "available"];
const LISTING_WORDS: &[&str] = &["planned", "scheduled", "upcoming", "completed", "closed"];
const PERIOD_WORDS: &[&str] = &["today", "tomorrow", "weekend", "week", "month"];
const DAY_WORDS: &[&str] = &[
    "weekend",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

fn date_reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\d{4}-\d{1,2}-\d{1,2}|\b(?:january|february|march|april|may|june|july|august|september|october|november|december)\b",
        )
        .expect("date reference pattern is valid")
    })
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Whether the question mentions something that looks like a date.
fn has_date_reference(question: &str, lower: &str) -> bool {
    date_reference_regex().is_match(question) || contains_any(lower, DAY_WORDS)
}

/// Classify a free-text question.
///
/// Conflict checks take priority: "is the change scheduled for May 5
/// available?" is a conflict check even though it also mentions "scheduled".
pub fn classify(question: &str) -> Intent {
    let lower = question.to_lowercase();

    if contains_any(&lower, SCHEDULING_PHRASES) && has_date_reference(question, &lower) {
        return Intent::ScheduleConflict;
    }

    let mentions_change = lower.contains("change");
    let listing_cue = contains_any(&lower, LISTING_WORDS)
        || (mentions_change && contains_any(&lower, PERIOD_WORDS));
    if listing_cue && mentions_change {
        return Intent::ScheduledChanges;
    }

    Intent::Unrouted
}
