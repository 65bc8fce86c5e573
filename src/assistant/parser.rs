//! Keyword-driven extraction of a task draft from a sentence.
//!
//! This is pattern matching, not language understanding: a lead-in phrase
//! marks the title, and fixed keyword tables pick the category, priority and
//! deadline.

use crate::dates;
use crate::tasks::{Category, Priority, TaskDraft};
use chrono::{DateTime, Days, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Lead-in phrase, then the title up to a comma, a date word or the end.
static TITLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:remind me to|add task|create task)\s+([^,]+?)(?:\s+(?:tomorrow|today|on|at|by)\b|\s*$)",
    )
    .unwrap()
});

/// Checked in order; the first category with a keyword in the sentence wins.
const CATEGORY_KEYWORDS: [(Category, &[&str]); 5] = [
    (Category::Work, &["meeting", "presentation", "report", "email", "client", "project"]),
    (Category::Health, &["doctor", "appointment", "exercise", "gym", "medicine", "checkup"]),
    (Category::Personal, &["call", "family", "friend", "home", "personal"]),
    (Category::Shopping, &["buy", "purchase", "store", "groceries", "shopping"]),
    (Category::Learning, &["study", "course", "learn", "read", "practice"]),
];

const HIGH_PRIORITY_WORDS: [&str; 3] = ["urgent", "important", "asap"];
const LOW_PRIORITY_WORDS: [&str; 2] = ["eventually", "sometime"];

/// Extract a draft from `utterance`, or `None` when no lead-in phrase (or
/// no title after it) is present.
///
/// The draft always carries a deadline; see [`infer_deadline`].
///
/// ```
/// use chrono::Utc;
/// use taskmaster::assistant::parser::parse_task;
/// use taskmaster::tasks::Category;
///
/// let draft = parse_task("Remind me to call mom tomorrow at 3pm", Utc::now()).unwrap();
/// assert_eq!(draft.title, "call mom");
/// assert_eq!(draft.category, Some(Category::Personal));
/// ```
#[must_use]
pub fn parse_task(utterance: &str, now: DateTime<Utc>) -> Option<TaskDraft> {
    let title = extract_title(utterance)?;
    Some(
        TaskDraft::new(title)
            .category(infer_category(utterance))
            .priority(infer_priority(utterance))
            .deadline(Some(infer_deadline(utterance, now))),
    )
}

/// The text between the lead-in phrase and the first date word.
#[must_use]
pub fn extract_title(utterance: &str) -> Option<String> {
    let captures = TITLE_PATTERN.captures(utterance)?;
    let title = captures.get(1)?.as_str().trim();
    if title.is_empty() {
        return None;
    }
    Some(title.to_string())
}

/// First category whose keywords appear anywhere in the sentence;
/// [`Category::Personal`] otherwise.
#[must_use]
pub fn infer_category(utterance: &str) -> Category {
    let lower = utterance.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| lower.contains(keyword)))
        .map_or(Category::Personal, |(category, _)| category.clone())
}

/// High for urgency words, low for "eventually"/"sometime", else medium.
#[must_use]
pub fn infer_priority(utterance: &str) -> Priority {
    let lower = utterance.to_lowercase();
    if HIGH_PRIORITY_WORDS.iter().any(|word| lower.contains(word)) {
        Priority::High
    } else if LOW_PRIORITY_WORDS.iter().any(|word| lower.contains(word)) {
        Priority::Low
    } else {
        Priority::Medium
    }
}

/// 23:59 local on the day named by "today", "tomorrow" or "next week"
/// (checked in that order). Without any of them, tomorrow.
///
/// Times of day in the sentence are ignored.
#[must_use]
pub fn infer_deadline(utterance: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let lower = utterance.to_lowercase();
    let days_ahead = if lower.contains("today") {
        0
    } else if lower.contains("tomorrow") {
        1
    } else if lower.contains("next week") {
        7
    } else {
        1
    };
    let today = dates::local_date(now);
    let target = today.checked_add_days(Days::new(days_ahead)).unwrap_or(today);
    dates::end_of_local_day(target)
}
