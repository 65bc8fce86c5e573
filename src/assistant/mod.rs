//! The rule-based task assistant.
//!
//! This module provides:
//! - A keyword parser that turns "remind me to ..." sentences into task drafts
//! - A router that picks between creating a task, summarizing the day, a
//!   productivity tip, and usage guidance
//! - The conversation transcript with its simulated reply delay
//! - Suggestions derived from the current tasks

pub mod conversation;
pub mod parser;
pub mod responses;
pub mod router;
pub mod suggestions;

pub use conversation::{Conversation, Message, PendingReply, Sender};
pub use parser::parse_task;
pub use router::{daily_summary, ConversationRouter, Intent, Reply};
pub use suggestions::suggestions;
