//! Human-readable deadline text.

use crate::tasks::Task;
use chrono::{DateTime, Local, Utc};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// How pressing a task's deadline is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    /// Past the deadline.
    Overdue,
    /// Due within a day.
    Soon,
    /// Further out.
    Normal,
}

/// Whole days from `now` until `deadline`, rounded up. Slightly past
/// deadlines round to zero.
#[must_use]
pub fn days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (deadline - now).num_milliseconds();
    ms.div_euclid(DAY_MS) + i64::from(ms.rem_euclid(DAY_MS) != 0)
}

/// Describe a deadline relative to `now` in local time.
///
/// ```
/// use chrono::{Duration, Utc};
/// use taskmaster::display::describe_deadline;
///
/// let now = Utc::now();
/// assert_eq!(describe_deadline(now - Duration::days(3), now), "3 days overdue");
/// ```
#[must_use]
pub fn describe_deadline(deadline: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = days_until(deadline, now);
    let local = deadline.with_timezone(&Local);
    let time = local.format("%H:%M");
    match days {
        d if d < 0 => format!("{} days overdue", d.unsigned_abs()),
        0 => format!("Due today at {time}"),
        1 => format!("Due tomorrow at {time}"),
        _ => format!("Due {} at {time}", local.format("%Y-%m-%d")),
    }
}

/// Urgency of an open task with a deadline; `None` otherwise.
#[must_use]
pub fn deadline_urgency(task: &Task, now: DateTime<Utc>) -> Option<Urgency> {
    let deadline = task.deadline.filter(|_| !task.completed)?;
    if deadline < now {
        Some(Urgency::Overdue)
    } else if days_until(deadline, now) <= 1 {
        Some(Urgency::Soon)
    } else {
        Some(Urgency::Normal)
    }
}
