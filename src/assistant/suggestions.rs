//! Suggestions shown beside the assistant.

use crate::assistant::responses::{pick, PRODUCTIVITY_TIPS};
use crate::tasks::Task;
use crate::traits::RandomSource;

/// Descriptions longer than this mark a task worth breaking down.
pub const LONG_DESCRIPTION_CHARS: usize = 50;

/// Build the suggestion list for the current tasks. Always ends with a tip.
pub fn suggestions(tasks: &[Task], random: &mut dyn RandomSource) -> Vec<String> {
    let mut out = Vec::new();
    let open = || tasks.iter().filter(|task| !task.completed);

    if let Some(large) =
        open().find(|task| task.description.chars().count() > LONG_DESCRIPTION_CHARS)
    {
        out.push(format!("Break down \"{}\" into smaller subtasks", large.title));
    }

    if open().any(|task| task.deadline.is_none()) {
        out.push("Add deadlines to help prioritize your tasks".to_string());
    }

    out.push(pick(&PRODUCTIVITY_TIPS, random).to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{Category, Priority};
    use crate::testing::SequenceRandom;
    use chrono::{TimeZone, Utc};

    fn task(title: &str, description: &str) -> Task {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        Task {
            id: title.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category: Category::Work,
            priority: Priority::Medium,
            deadline: Some(now),
            completed: false,
            created_at: now,
            completed_at: None,
        }
    }

    #[test]
    fn test_only_tip_when_nothing_to_suggest() {
        let mut random = SequenceRandom::constant(1);
        let out = suggestions(&[task("Short", "tiny")], &mut random);
        assert_eq!(out, vec![PRODUCTIVITY_TIPS[1].to_string()]);
    }

    #[test]
    fn test_breakdown_and_deadline_suggestions() {
        let long = "x".repeat(51);
        let mut done_big = task("Done big", &long);
        done_big.mark_complete(done_big.created_at);
        let mut undated = task("Undated", "");
        undated.deadline = None;

        let tasks = vec![done_big, task("Big one", &long), task("Big two", &long), undated];
        let out = suggestions(&tasks, &mut SequenceRandom::constant(0));
        assert_eq!(
            out,
            vec![
                "Break down \"Big one\" into smaller subtasks".to_string(),
                "Add deadlines to help prioritize your tasks".to_string(),
                PRODUCTIVITY_TIPS[0].to_string(),
            ]
        );
    }

    #[test]
    fn test_exactly_fifty_chars_is_not_large() {
        let out = suggestions(&[task("Edge", &"y".repeat(50))], &mut SequenceRandom::constant(0));
        assert_eq!(out.len(), 1);
    }
}
