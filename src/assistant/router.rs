//! Intent classification and dispatch for assistant messages.

use crate::assistant::parser::parse_task;
use crate::assistant::responses::{
    pick, CREATE_EXAMPLE, GREETINGS, PRODUCTIVITY_TIPS, SUMMARY_EXAMPLE, TASK_CREATED,
};
use crate::assistant::suggestions::suggestions;
use crate::error::Result;
use crate::stats;
use crate::tasks::{Priority, Task, TaskStore};
use crate::templates;
use crate::traits::RandomSource;
use chrono::{DateTime, Utc};
use std::fmt;
use tera::Context;

const CREATE_PHRASES: [&str; 3] = ["remind me", "add task", "create task"];
const SUMMARY_PHRASES: [&str; 3] = ["plan for today", "today's tasks", "what's my day"];
const TIP_PHRASES: [&str; 3] = ["tips", "help", "productive"];

/// What the assistant did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// A task was parsed and created.
    CreateTask,
    /// Summary of today's workload.
    DailySummary,
    /// A productivity tip.
    Tips,
    /// Nothing matched; usage guidance.
    Fallback,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreateTask => "create-task",
            Self::DailySummary => "daily-summary",
            Self::Tips => "tips",
            Self::Fallback => "fallback",
        })
    }
}

/// The assistant's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Text shown to the user.
    pub text: String,
    /// How the message was handled.
    pub intent: Intent,
    /// The task created, for [`Intent::CreateTask`].
    pub created: Option<Task>,
}

impl Reply {
    fn plain(intent: Intent, text: impl Into<String>) -> Self {
        Self { text: text.into(), intent, created: None }
    }
}

fn mentions_any(lower: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| lower.contains(phrase))
}

/// Routes messages to the parser, the summary, or canned replies.
///
/// Phrase tests are case-insensitive substring checks, applied in order:
/// task creation, daily summary, tips, fallback. A creation phrase whose
/// sentence does not parse falls through to the later checks.
pub struct ConversationRouter {
    random: Box<dyn RandomSource>,
}

impl fmt::Debug for ConversationRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationRouter").finish_non_exhaustive()
    }
}

impl ConversationRouter {
    /// Create a router drawing canned replies from `random`.
    #[must_use]
    pub fn new(random: Box<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Answer `utterance`, creating a task in `store` when asked to.
    ///
    /// # Errors
    ///
    /// Returns an error if a reply template fails to render.
    pub fn route(&mut self, utterance: &str, store: &mut TaskStore) -> Result<Reply> {
        let lower = utterance.to_lowercase();

        if mentions_any(&lower, &CREATE_PHRASES) {
            if let Some(draft) = parse_task(utterance, store.now()) {
                let task = store.create(draft);
                tracing::debug!(target: "assistant", id = %task.id, "created task from message");
                let text = pick(&TASK_CREATED, self.random.as_mut());
                return Ok(Reply {
                    text: text.to_string(),
                    intent: Intent::CreateTask,
                    created: Some(task),
                });
            }
            tracing::debug!(target: "assistant", "no task found in message, falling through");
        }

        let reply = if mentions_any(&lower, &SUMMARY_PHRASES) {
            Reply::plain(Intent::DailySummary, daily_summary(store.tasks(), store.now())?)
        } else if mentions_any(&lower, &TIP_PHRASES) {
            Reply::plain(Intent::Tips, pick(&PRODUCTIVITY_TIPS, self.random.as_mut()))
        } else {
            Reply::plain(Intent::Fallback, fallback()?)
        };
        tracing::debug!(target: "assistant", intent = %reply.intent, "routed message");
        Ok(reply)
    }

    /// An opening line.
    pub fn greeting(&mut self) -> &'static str {
        pick(&GREETINGS, self.random.as_mut())
    }

    /// Suggestions for the current tasks.
    pub fn suggestions(&mut self, tasks: &[Task]) -> Vec<String> {
        suggestions(tasks, self.random.as_mut())
    }
}

/// Today's workload as a sentence: open tasks due today, open high-priority
/// tasks, and overdue tasks. All zero yields the all-clear message.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn daily_summary(tasks: &[Task], now: DateTime<Utc>) -> Result<String> {
    let due_today = stats::due_today(tasks, now).iter().filter(|task| !task.completed).count();
    let high_priority =
        tasks.iter().filter(|task| !task.completed && task.priority == Priority::High).count();
    let overdue = stats::overdue_tasks(tasks, now).len();

    let mut ctx = Context::new();
    ctx.insert("due_today", &due_today);
    ctx.insert("high_priority", &high_priority);
    ctx.insert("overdue", &overdue);
    Ok(templates::render(templates::DAILY_SUMMARY, &ctx)?.trim().to_string())
}

fn fallback() -> Result<String> {
    let mut ctx = Context::new();
    ctx.insert("create_example", CREATE_EXAMPLE);
    ctx.insert("summary_example", SUMMARY_EXAMPLE);
    Ok(templates::render(templates::FALLBACK, &ctx)?.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{Category, TaskDraft};
    use crate::testing::{FixedClock, MemoryKvStore, SequenceRandom};
    use chrono::{Duration, TimeZone};

    const ALL_CLEAR: &str = "Here's your day ahead: Looking great! No urgent tasks for today. \
                             Perfect time to work on long-term goals! 🎯";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn store() -> TaskStore {
        TaskStore::open(
            Box::new(MemoryKvStore::new()),
            Box::new(FixedClock::new(now())),
            Box::new(SequenceRandom::counting()),
            false,
        )
    }

    fn router(pick: u64) -> ConversationRouter {
        ConversationRouter::new(Box::new(SequenceRandom::constant(pick)))
    }

    #[test]
    fn test_create_task_from_message() {
        let mut store = store();
        let reply = router(0).route("Remind me to call mom tomorrow at 3pm", &mut store).unwrap();

        assert_eq!(reply.intent, Intent::CreateTask);
        assert_eq!(reply.text, TASK_CREATED[0]);
        let created = reply.created.unwrap();
        assert_eq!(created.title, "call mom");
        assert_eq!(store.get(&created.id), Some(&created));
    }

    #[test]
    fn test_success_message_uses_random_source() {
        let mut store = store();
        let reply = router(2).route("add task buy milk", &mut store).unwrap();
        assert_eq!(reply.text, TASK_CREATED[2]);
    }

    #[test]
    fn test_unparseable_creation_falls_through() {
        let mut store = store();
        let reply = router(1).route("remind me, tips please", &mut store).unwrap();
        assert_eq!(reply.intent, Intent::Tips);
        assert_eq!(reply.text, PRODUCTIVITY_TIPS[1]);
        assert!(store.is_empty());

        let reply = router(0).route("remind me", &mut store).unwrap();
        assert_eq!(reply.intent, Intent::Fallback);
    }

    #[test]
    fn test_daily_summary_all_clear() {
        let mut store = store();
        store.create(TaskDraft::new("Someday").category(Category::Work));
        let reply = router(0).route("What's my plan for today?", &mut store).unwrap();
        assert_eq!(reply.intent, Intent::DailySummary);
        assert_eq!(reply.text, ALL_CLEAR);
    }

    #[test]
    fn test_daily_summary_one_overdue() {
        let mut store = store();
        store.create(
            TaskDraft::new("Late")
                .category(Category::Work)
                .deadline(Some(now() - Duration::days(2))),
        );
        let reply = router(0).route("what's my plan for today", &mut store).unwrap();
        assert_eq!(reply.text, "Here's your day ahead: ⚠️ 1 overdue task requires immediate action.");
    }

    #[test]
    fn test_daily_summary_counts_open_tasks_only() {
        let mut store = store();
        let soon = now() + Duration::minutes(30);
        let done = store.create(
            TaskDraft::new("Done").priority(Priority::High).deadline(Some(soon)),
        );
        store.toggle_complete(&done.id);
        store.create(TaskDraft::new("Open").priority(Priority::High).deadline(Some(soon)));

        let text = daily_summary(store.tasks(), now()).unwrap();
        assert_eq!(
            text,
            "Here's your day ahead: You have 1 task due today. \
             1 high-priority item needs attention."
        );
    }

    #[test]
    fn test_tips_and_fallback() {
        let mut store = store();
        let tip = router(2).route("Any HELP?", &mut store).unwrap();
        assert_eq!(tip.intent, Intent::Tips);
        assert_eq!(tip.text, PRODUCTIVITY_TIPS[2]);

        let fallback = router(0).route("hello there", &mut store).unwrap();
        assert_eq!(fallback.intent, Intent::Fallback);
        assert_eq!(
            fallback.text,
            "I understand you'd like help with task management. Try asking me to create a task \
             like 'Remind me to call mom tomorrow at 3 PM' or ask 'What's my plan for today?'"
        );
        assert!(fallback.created.is_none());
    }

    #[test]
    fn test_summary_checked_before_tips() {
        let mut store = store();
        let reply = router(0).route("help me with today's tasks", &mut store).unwrap();
        assert_eq!(reply.intent, Intent::DailySummary);
    }

    #[test]
    fn test_greeting_and_suggestions() {
        let mut r = router(1);
        assert_eq!(r.greeting(), GREETINGS[1]);
        assert_eq!(r.suggestions(&[]), vec![PRODUCTIVITY_TIPS[1].to_string()]);
    }
}
