//! Filtered and sorted views over the task list.
//!
//! Views are recomputed on demand from the full collection; nothing here
//! keeps an index.

use crate::error::{Error, Result};
use crate::tasks::{Category, Priority, Task};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Which category the view is limited to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    /// No category restriction.
    #[default]
    All,
    /// Only tasks in this category (compared case-insensitively).
    Only(Category),
}

impl CategoryFilter {
    fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => task.category.name().eq_ignore_ascii_case(category.name()),
        }
    }
}

impl From<String> for CategoryFilter {
    fn from(value: String) -> Self {
        if value.trim().is_empty() || value.trim().eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(Category::parse(&value))
        }
    }
}

impl From<CategoryFilter> for String {
    fn from(value: CategoryFilter) -> Self {
        match value {
            CategoryFilter::All => "all".to_string(),
            CategoryFilter::Only(category) => category.name().to_lowercase(),
        }
    }
}

/// Status restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Not completed.
    Pending,
    /// Completed.
    Completed,
    /// Not completed and past the deadline.
    Overdue,
    /// Deadline falls on today's local date, completed or not.
    Today,
}

impl StatusFilter {
    /// All status filters in display order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Completed, Self::Overdue, Self::Today];

    fn matches(self, task: &Task, now: DateTime<Utc>) -> bool {
        match self {
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
            Self::Overdue => task.is_overdue(now),
            Self::Today => task.is_due_today(now),
        }
    }

    /// Lowercase name, as persisted.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
            Self::Today => "today",
        }
    }

    /// Capitalized name for titles.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Overdue => "Overdue",
            Self::Today => "Today",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidValue { kind: "status", value: s.to_string() })
    }
}

/// The active filters.
///
/// All four predicates combine with AND. Persisted as
/// `{"category": "all", "status": null, "priority": null, "search": ""}`;
/// missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    /// Category restriction.
    pub category: CategoryFilter,
    /// Status restriction.
    pub status: Option<StatusFilter>,
    /// Priority restriction.
    pub priority: Option<Priority>,
    /// Case-insensitive substring over title or description.
    pub search: String,
}

/// A single filter selection, as made by clicking a filter button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    /// Select a category (or "all").
    Category(CategoryFilter),
    /// Select a status.
    Status(StatusFilter),
    /// Select a priority.
    Priority(Priority),
}

impl FilterState {
    /// Apply a selection. Selecting the value that is already active turns it
    /// off: category falls back to "all", status and priority to none.
    pub fn toggle(&mut self, change: FilterChange) {
        match change {
            FilterChange::Category(category) => {
                self.category =
                    if self.category == category { CategoryFilter::All } else { category };
            }
            FilterChange::Status(status) => {
                self.status = if self.status == Some(status) { None } else { Some(status) };
            }
            FilterChange::Priority(priority) => {
                self.priority = if self.priority == Some(priority) { None } else { Some(priority) };
            }
        }
    }

    /// Whether `task` passes every active filter.
    #[must_use]
    pub fn matches(&self, task: &Task, now: DateTime<Utc>) -> bool {
        self.category.matches(task)
            && self.status.map_or(true, |status| status.matches(task, now))
            && self.priority.map_or(true, |priority| task.priority == priority)
            && task.matches_search(&self.search)
    }

    /// Heading for the list: priority beats status beats category.
    #[must_use]
    pub fn title(&self) -> String {
        if let Some(priority) = self.priority {
            return format!("{} Priority Tasks", priority.title());
        }
        if let Some(status) = self.status {
            return format!("{} Tasks", status.title());
        }
        match &self.category {
            CategoryFilter::All => "All Tasks".to_string(),
            CategoryFilter::Only(category) if category.is_known() => {
                format!("{} Tasks", category.name())
            }
            CategoryFilter::Only(_) => "Category Tasks".to_string(),
        }
    }
}

/// Sort order for the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Earliest deadline first; undated tasks last.
    #[default]
    Deadline,
    /// High, then medium, then low.
    Priority,
    /// Category name, alphabetical.
    Category,
    /// Newest first.
    Created,
}

impl SortKey {
    /// All sort keys.
    pub const ALL: [Self; 4] = [Self::Deadline, Self::Priority, Self::Category, Self::Created];

    /// Lowercase name, as persisted.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deadline => "deadline",
            Self::Priority => "priority",
            Self::Category => "category",
            Self::Created => "created",
        }
    }

    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Deadline => match (a.deadline, b.deadline) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::Priority => b.priority.weight().cmp(&a.priority.weight()),
            Self::Category => compare_names(a.category.name(), b.category.name()),
            Self::Created => b.created_at.cmp(&a.created_at),
        }
    }
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidValue { kind: "sort key", value: s.to_string() })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dictionary-style comparison: case folded first, exact text as tie-break.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Tasks passing `state`, in their original order.
#[must_use]
pub fn filter<'a>(tasks: &'a [Task], state: &FilterState, now: DateTime<Utc>) -> Vec<&'a Task> {
    tasks.iter().filter(|task| state.matches(task, now)).collect()
}

/// Stable sort by `key`; ties keep their relative order.
pub fn sort(tasks: &mut [&Task], key: SortKey) {
    tasks.sort_by(|a, b| key.compare(a, b));
}

/// Filter then sort: the list as it should be shown.
#[must_use]
pub fn view<'a>(
    tasks: &'a [Task],
    state: &FilterState,
    key: SortKey,
    now: DateTime<Utc>,
) -> Vec<&'a Task> {
    let mut visible = filter(tasks, state, now);
    sort(&mut visible, key);
    visible
}
