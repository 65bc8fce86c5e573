//! Aggregate counters over the full task collection.
//!
//! Every function takes the complete, unfiltered list and the current
//! instant; nothing is cached between calls.

use crate::dates;
use crate::query::StatusFilter;
use crate::tasks::{Category, Priority, Task};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// How many days back the streak scan looks, today included.
pub const STREAK_WINDOW_DAYS: u64 = 30;

/// Incomplete tasks whose deadline is strictly before `now`.
#[must_use]
pub fn overdue_tasks(tasks: &[Task], now: DateTime<Utc>) -> Vec<&Task> {
    tasks.iter().filter(|task| task.is_overdue(now)).collect()
}

/// Tasks whose deadline falls on today's local date, completed or not.
#[must_use]
pub fn due_today(tasks: &[Task], now: DateTime<Utc>) -> Vec<&Task> {
    tasks.iter().filter(|task| task.is_due_today(now)).collect()
}

/// Tasks per known category. Free-text categories are not counted here;
/// see [`uncategorized_count`].
#[must_use]
pub fn category_counts(tasks: &[Task]) -> BTreeMap<String, usize> {
    Category::KNOWN
        .iter()
        .map(|category| {
            let count = tasks.iter().filter(|task| &task.category == category).count();
            (category.name().to_string(), count)
        })
        .collect()
}

/// Tasks whose category is outside the known set.
#[must_use]
pub fn uncategorized_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| !task.category.is_known()).count()
}

/// Counts per status filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Not completed.
    pub pending: usize,
    /// Completed.
    pub completed: usize,
    /// Incomplete and past the deadline.
    pub overdue: usize,
    /// Deadline today, completed or not.
    pub today: usize,
}

impl StatusCounts {
    /// The count shown next to a status filter.
    #[must_use]
    pub const fn get(&self, status: StatusFilter) -> usize {
        match status {
            StatusFilter::Pending => self.pending,
            StatusFilter::Completed => self.completed,
            StatusFilter::Overdue => self.overdue,
            StatusFilter::Today => self.today,
        }
    }
}

/// Tally the four status filters.
#[must_use]
pub fn status_counts(tasks: &[Task], now: DateTime<Utc>) -> StatusCounts {
    let completed = tasks.iter().filter(|task| task.completed).count();
    StatusCounts {
        pending: tasks.len() - completed,
        completed,
        overdue: overdue_tasks(tasks, now).len(),
        today: due_today(tasks, now).len(),
    }
}

/// Counts per priority over incomplete tasks only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    /// Open high-priority tasks.
    pub high: usize,
    /// Open medium-priority tasks.
    pub medium: usize,
    /// Open low-priority tasks.
    pub low: usize,
}

impl PriorityCounts {
    /// The count for one priority.
    #[must_use]
    pub const fn get(&self, priority: Priority) -> usize {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }
}

/// Tally open tasks by priority.
#[must_use]
pub fn priority_counts(tasks: &[Task]) -> PriorityCounts {
    tasks.iter().filter(|task| !task.completed).fold(PriorityCounts::default(), |mut acc, task| {
        match task.priority {
            Priority::High => acc.high += 1,
            Priority::Medium => acc.medium += 1,
            Priority::Low => acc.low += 1,
        }
        acc
    })
}

/// Percentage of completed tasks, rounded half up. Zero for an empty list.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn completion_rate(tasks: &[Task]) -> u32 {
    if tasks.is_empty() {
        return 0;
    }
    let completed = tasks.iter().filter(|task| task.completed).count();
    // Result is within 0..=100.
    (100.0 * completed as f64 / tasks.len() as f64).round() as u32
}

/// Tasks completed on today's local date.
#[must_use]
pub fn completed_today(tasks: &[Task], now: DateTime<Utc>) -> usize {
    tasks.iter().filter(|task| task.completed_on_day_of(now)).count()
}

/// Consecutive days with at least one completion, counting back from today.
///
/// Today without a completion does not break the run; the first empty day
/// before today does. Capped at [`STREAK_WINDOW_DAYS`].
#[must_use]
pub fn streak(tasks: &[Task], now: DateTime<Utc>) -> u32 {
    let completion_days: BTreeSet<NaiveDate> = tasks
        .iter()
        .filter(|task| task.completed)
        .filter_map(|task| task.completed_at.map(dates::local_date))
        .collect();
    streak_from(&completion_days, dates::local_date(now))
}

/// Streak over local calendar dates, stepping back one date at a time from
/// `today`.
#[must_use]
pub fn streak_from(completion_days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    for offset in 0..STREAK_WINDOW_DAYS {
        let Some(day) = today.checked_sub_days(Days::new(offset)) else {
            break;
        };
        if completion_days.contains(&day) {
            streak += 1;
        } else if offset > 0 {
            break;
        }
    }
    streak
}

/// Everything the dashboard shows, computed in one pass over the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// All tasks.
    pub total: usize,
    /// Completed tasks.
    pub completed: usize,
    /// Incomplete tasks.
    pub pending: usize,
    /// Completed on today's date.
    pub completed_today: usize,
    /// Rounded completion percentage.
    pub completion_rate: u32,
    /// Day streak.
    pub streak: u32,
    /// Per known category.
    pub categories: BTreeMap<String, usize>,
    /// Tasks with a free-text category.
    pub uncategorized: usize,
    /// Per status filter.
    pub statuses: StatusCounts,
    /// Per priority, open tasks only.
    pub priorities: PriorityCounts,
}

impl StatsSnapshot {
    /// Compute a snapshot of `tasks` as of `now`.
    #[must_use]
    pub fn compute(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let statuses = status_counts(tasks, now);
        Self {
            total: tasks.len(),
            completed: statuses.completed,
            pending: statuses.pending,
            completed_today: completed_today(tasks, now),
            completion_rate: completion_rate(tasks),
            streak: streak(tasks, now),
            categories: category_counts(tasks),
            uncategorized: uncategorized_count(tasks),
            statuses,
            priorities: priority_counts(tasks),
        }
    }

    /// "3/5 tasks completed": today's completions over today's workload.
    #[must_use]
    pub fn progress_line(&self) -> String {
        format!(
            "{}/{} tasks completed",
            self.completed_today,
            self.pending + self.completed_today
        )
    }

    /// "4 days".
    #[must_use]
    pub fn streak_line(&self) -> String {
        format!("{} days", self.streak)
    }
}
