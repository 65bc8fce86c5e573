//! The assistant transcript and its delayed replies.

use crate::assistant::router::{ConversationRouter, Reply};
use crate::error::Result;
use crate::tasks::TaskStore;
use std::time::{Duration, Instant};

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// The person using the tracker.
    User,
    /// The assistant.
    Assistant,
}

/// One transcript line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Author.
    pub sender: Sender,
    /// Text.
    pub text: String,
}

/// A submitted message whose reply has not been delivered yet.
#[derive(Debug)]
#[must_use = "a pending reply does nothing until completed"]
pub struct PendingReply {
    utterance: String,
    due: Instant,
}

impl PendingReply {
    /// The user's message.
    #[must_use]
    pub fn utterance(&self) -> &str {
        &self.utterance
    }

    /// Time left before the reply is due.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.due.saturating_duration_since(Instant::now())
    }
}

/// Transcript of user and assistant messages.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    reply_delay: Duration,
}

impl Conversation {
    /// An empty transcript whose replies arrive after `reply_delay`.
    #[must_use]
    pub const fn new(reply_delay: Duration) -> Self {
        Self { messages: Vec::new(), reply_delay }
    }

    /// All messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Record an assistant message directly, e.g. a greeting.
    pub fn say(&mut self, text: impl Into<String>) {
        self.messages.push(Message { sender: Sender::Assistant, text: text.into() });
    }

    /// Record the user's message and schedule the reply.
    ///
    /// Blank input is ignored and returns `None`.
    pub fn submit(&mut self, utterance: &str) -> Option<PendingReply> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return None;
        }
        self.messages.push(Message { sender: Sender::User, text: utterance.to_string() });
        Some(PendingReply { utterance: utterance.to_string(), due: Instant::now() + self.reply_delay })
    }

    /// Wait out the rest of the delay, then route the message and record the
    /// reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the router fails to render its reply.
    pub fn complete(
        &mut self,
        pending: PendingReply,
        router: &mut ConversationRouter,
        store: &mut TaskStore,
    ) -> Result<Reply> {
        let remaining = pending.remaining();
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
        let reply = router.route(&pending.utterance, store)?;
        self.say(reply.text.clone());
        Ok(reply)
    }
}
