//! Command-line interface for taskmaster.
//!
//! Each invocation is one session: the binary opens the store, runs a
//! single command against an [`App`](crate::app::App), and exits.

mod run;


pub use run::{run, CliOutput};

use clap::{Parser, Subcommand, ValueEnum};

/// Taskmaster - a personal task tracker with a rule-based assistant.
///
/// Data lives in ~/.taskmaster (override with TASKMASTER_HOME).
/// Set TASKMASTER_LOG=debug to see what the store and assistant are doing.
#[derive(Parser, Debug)]
#[command(name = "taskmaster")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Which filter a `filter` command selects.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Category name, or "all".
    Category,
    /// pending, completed, overdue, or today.
    Status,
    /// high, medium, or low.
    Priority,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Add a task with explicit fields.
    Add {
        /// Task title
        title: String,

        /// Category (Work, Personal, Urgent, Shopping, Health, Learning, or free text)
        #[arg(short, long)]
        category: String,

        /// Priority: high, medium, or low
        #[arg(short, long, default_value = "medium")]
        priority: String,

        /// Longer description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Deadline: YYYY-MM-DD, YYYY-MM-DDTHH:MM, or RFC 3339
        #[arg(long)]
        deadline: Option<String>,
    },

    /// Add a task from a short sentence, e.g. `quick buy milk tomorrow`.
    Quick {
        /// The sentence
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Change a task's fields. Only the given fields change.
    Edit {
        /// Task ID
        id: String,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,

        /// New priority
        #[arg(short, long)]
        priority: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New deadline
        #[arg(long, conflicts_with = "clear_deadline")]
        deadline: Option<String>,

        /// Remove the deadline
        #[arg(long)]
        clear_deadline: bool,
    },

    /// Mark a task complete, or incomplete if it already is.
    Toggle {
        /// Task ID
        id: String,
    },

    /// Delete a task.
    Delete {
        /// Task ID
        id: String,
    },

    /// Complete several tasks at once.
    Complete {
        /// Task IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete several tasks at once.
    Remove {
        /// Task IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show the tasks matching the saved filters, in the saved order.
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Select a filter. Selecting the active value again clears it.
    Filter {
        /// Which filter
        #[arg(value_enum)]
        kind: FilterKind,

        /// The value to select
        value: String,
    },

    /// Set the search text. Without text, clears the search.
    Search {
        /// Text to look for in titles and descriptions
        text: Vec<String>,
    },

    /// Set the sort order: deadline, priority, category, or created.
    Sort {
        /// Sort key
        key: String,
    },

    /// Show counters and progress.
    Stats {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Talk to the assistant, e.g. `ask what's my plan for today`.
    Ask {
        /// The message
        #[arg(required = true, trailing_var_arg = true)]
        utterance: Vec<String>,
    },

    /// Show suggestions for the current tasks.
    Suggest,

    /// Show version information.
    Version,
}
