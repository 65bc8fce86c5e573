//! Canned assistant replies.

use crate::traits::RandomSource;

/// Opening lines.
pub const GREETINGS: [&str; 3] = [
    "Hi! I'm your AI task assistant. I can help you create tasks, break down complex projects, and boost your productivity. What would you like to work on today?",
    "Hello! Ready to tackle your to-do list? I can understand natural language like 'Remind me to call mom tomorrow at 3 PM' and create organized tasks for you.",
    "Welcome back! I'm here to help you stay organized and productive. Try telling me about any task or project you need to manage.",
];

/// Replies after a task was created from a sentence.
pub const TASK_CREATED: [&str; 3] = [
    "Perfect! I've created that task for you. Would you like me to break it down into smaller, manageable subtasks?",
    "Task created successfully! Based on the deadline, I've set this as high priority. Does that look right?",
    "Got it! Your task is now organized and ready. I notice you have similar tasks - would you like some productivity tips?",
];

/// Productivity tips.
pub const PRODUCTIVITY_TIPS: [&str; 3] = [
    "💡 Tip: Try batching similar tasks together to maintain focus and reduce context switching.",
    "💡 Tip: Break large projects into smaller, actionable tasks. It makes them less overwhelming and easier to complete.",
    "💡 Tip: Consider using the 2-minute rule - if a task takes less than 2 minutes, do it immediately rather than adding it to your list.",
];

/// Example request quoted in the fallback reply.
pub const CREATE_EXAMPLE: &str = "Remind me to call mom tomorrow at 3 PM";
/// Example question quoted in the fallback reply.
pub const SUMMARY_EXAMPLE: &str = "What's my plan for today?";

/// Pick one entry of `set`.
pub fn pick(set: &[&'static str], random: &mut dyn RandomSource) -> &'static str {
    set.get(random.pick_index(set.len())).copied().unwrap_or_default()
}
