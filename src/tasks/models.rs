//! Task model types for the task tracker.

use crate::dates;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task category.
///
/// The six named categories are the ones the tracker knows how to count and
/// display. Any other text is kept verbatim in [`Category::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// Job-related work.
    Work,
    /// Personal errands (the parser's fallback).
    Personal,
    /// Needs attention now.
    Urgent,
    /// Things to buy.
    Shopping,
    /// Appointments, exercise, medicine.
    Health,
    /// Courses, reading, practice.
    Learning,
    /// Free-text category outside the known set.
    Other(String),
}

impl Category {
    /// The known categories, in display order.
    pub const KNOWN: [Self; 6] =
        [Self::Work, Self::Personal, Self::Urgent, Self::Shopping, Self::Health, Self::Learning];

    /// Parse a category name case-insensitively. Unknown names become
    /// [`Category::Other`] with the trimmed input preserved.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        Self::KNOWN
            .into_iter()
            .find(|known| known.name().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| Self::Other(trimmed.to_string()))
    }

    /// The display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Work => "Work",
            Self::Personal => "Personal",
            Self::Urgent => "Urgent",
            Self::Shopping => "Shopping",
            Self::Health => "Health",
            Self::Learning => "Learning",
            Self::Other(name) => name,
        }
    }

    /// Whether this is one of the six known categories.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(name) => name,
            known => known.name().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Do first.
    High,
    /// Normal work (default).
    #[default]
    Medium,
    /// Whenever there is time.
    Low,
}

impl Priority {
    /// All priorities, most important first.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Sort weight: high 3, medium 2, low 1.
    #[must_use]
    pub const fn weight(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    /// Lowercase name, as persisted.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Capitalized name for titles.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(Error::InvalidValue { kind: "priority", value: s.to_string() }),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task in the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, assigned at creation.
    pub id: String,
    /// Short title.
    pub title: String,
    /// Longer description; empty when not given.
    #[serde(default)]
    pub description: String,
    /// Category.
    pub category: Category,
    /// Priority.
    pub priority: Priority,
    /// When the task is due, if ever.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub deadline: Option<DateTime<Utc>>,
    /// Whether the task is done.
    #[serde(default)]
    pub completed: bool,
    /// Creation time. Never changes.
    pub created_at: DateTime<Utc>,
    /// When the task was completed. Set iff `completed`.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Incomplete with a deadline strictly before `now`.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.deadline.is_some_and(|deadline| deadline < now)
    }

    /// Has a deadline on the same local calendar date as `now`, regardless of
    /// completion.
    #[must_use]
    pub fn is_due_today(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| dates::same_local_day(deadline, now))
    }

    /// Completed on the same local calendar date as `day`.
    #[must_use]
    pub fn completed_on_day_of(&self, day: DateTime<Utc>) -> bool {
        self.completed && self.completed_at.is_some_and(|at| dates::same_local_day(at, day))
    }

    /// Mark complete, stamping `completed_at`. Already-completed tasks keep
    /// their original stamp.
    pub fn mark_complete(&mut self, now: DateTime<Utc>) {
        if !self.completed {
            self.completed = true;
            self.completed_at = Some(now);
        }
    }

    /// Mark incomplete, clearing `completed_at`.
    pub fn mark_incomplete(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }

    /// Flip completion state.
    pub fn toggle_complete(&mut self, now: DateTime<Utc>) {
        if self.completed {
            self.mark_incomplete();
        } else {
            self.mark_complete(now);
        }
    }

    /// Case-insensitive substring match over title or description.
    /// An empty needle matches everything.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// Accept RFC 3339 timestamps as well as naive local `YYYY-MM-DDTHH:MM[:SS]`.
fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => dates::parse_deadline(&text)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {text}"))),
    }
}

/// A task that has not been created yet: no id, no completion state, no
/// audit timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Category.
    pub category: Option<Category>,
    /// Priority.
    pub priority: Priority,
    /// Deadline, if any.
    pub deadline: Option<DateTime<Utc>>,
}

impl TaskDraft {
    /// A draft with the given title and defaults elsewhere.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    /// Set the category.
    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the deadline.
    #[must_use]
    pub const fn deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check required fields as manual entry does: title and category must be
    /// non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when a required field is missing.
    pub fn validate(&self) -> Result<()> {
        let category_missing = self.category.as_ref().map_or(true, |c| c.name().trim().is_empty());
        if self.title.trim().is_empty() || category_missing {
            return Err(Error::Validation("Please fill in all required fields".to_string()));
        }
        Ok(())
    }
}

/// Fields that can be updated on a task.
///
/// `id`, `created_at` and the completion fields are deliberately absent;
/// completion changes go through toggle/bulk-complete.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    /// New title (if Some).
    pub title: Option<String>,
    /// New description (if Some).
    pub description: Option<String>,
    /// New category (if Some).
    pub category: Option<Category>,
    /// New priority (if Some).
    pub priority: Option<Priority>,
    /// New deadline (if Some); `Some(None)` clears it.
    pub deadline: Option<Option<DateTime<Utc>>>,
}

impl TaskUpdate {
    /// Check if any fields are set for update.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.deadline.is_none()
    }

    /// Merge the set fields into `task`.
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
    }
}
