//! Sample tasks inserted into a fresh store.

use crate::dates;
use crate::tasks::models::{Category, Priority, Task};
use chrono::{DateTime, Duration, Utc};

/// Build the four sample tasks, stamped relative to `now`.
///
/// Sample deadlines are fixed local wall-clock times. The last task is already
/// completed (at `now`) so a new user sees a non-zero streak.
#[must_use]
pub fn sample_tasks(now: DateTime<Utc>) -> Vec<Task> {
    let deadline = |text: &str| dates::parse_local_naive(text);

    vec![
        Task {
            id: "task_1".to_string(),
            title: "Prepare quarterly presentation".to_string(),
            description: "Create slides for Q3 business review meeting".to_string(),
            category: Category::Work,
            priority: Priority::High,
            deadline: deadline("2025-01-15T10:00:00"),
            completed: false,
            created_at: now,
            completed_at: None,
        },
        Task {
            id: "task_2".to_string(),
            title: "Buy groceries".to_string(),
            description: "Milk, bread, vegetables, and fruits for the week".to_string(),
            category: Category::Personal,
            priority: Priority::Medium,
            deadline: deadline("2025-01-13T18:00:00"),
            completed: false,
            created_at: now,
            completed_at: None,
        },
        Task {
            id: "task_3".to_string(),
            title: "Complete JavaScript course".to_string(),
            description: "Finish remaining modules on advanced JavaScript concepts".to_string(),
            category: Category::Learning,
            priority: Priority::Medium,
            deadline: deadline("2025-01-20T23:59:00"),
            completed: false,
            created_at: now,
            completed_at: None,
        },
        Task {
            id: "task_4".to_string(),
            title: "Book annual health checkup".to_string(),
            description: "Schedule appointment with Dr. Smith for yearly physical".to_string(),
            category: Category::Health,
            priority: Priority::High,
            deadline: deadline("2024-12-16T16:00:00"),
            completed: true,
            created_at: now - Duration::days(7),
            completed_at: Some(now),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sample_tasks_literal_content() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let tasks = sample_tasks(now);

        let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["task_1", "task_2", "task_3", "task_4"]);
        assert_eq!(tasks[0].category, Category::Work);
        assert_eq!(tasks[1].priority, Priority::Medium);
        assert_eq!(tasks[2].category, Category::Learning);
        assert!(tasks.iter().all(|t| t.deadline.is_some()));
    }

    #[test]
    fn test_sample_tasks_completion_invariant() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        for task in sample_tasks(now) {
            assert_eq!(task.completed, task.completed_at.is_some(), "{}", task.id);
        }
    }

    #[test]
    fn test_completed_sample_created_a_week_earlier() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let tasks = sample_tasks(now);
        assert_eq!(tasks[3].created_at, now - Duration::days(7));
        assert_eq!(tasks[3].completed_at, Some(now));
    }
}
