//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::app::App;
use crate::cli::{Command, FilterKind};
use crate::dates;
use crate::display::{deadline_urgency, describe_deadline, Urgency};
use crate::error::{Error, Result};
use crate::query::{CategoryFilter, FilterChange, SortKey, StatusFilter};
use crate::stats::StatsSnapshot;
use crate::tasks::{Category, Priority, Task, TaskDraft, TaskUpdate};
use crate::templates;
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::process::ExitCode;
use tera::Context;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

impl CliOutput {
    /// Append a warning if the last store write failed.
    fn with_persist_warning(mut self, app: &mut App) -> Self {
        if let Some(e) = app.store_mut().take_persist_error() {
            self.stderr.push(format!("warning: changes were not saved: {e}"));
        }
        self
    }
}

/// Run a CLI command against an open session.
pub fn run(command: Command, app: &mut App) -> CliOutput {
    let output = match command {
        Command::Version => run_version(),
        Command::Add { title, category, priority, description, deadline } => {
            run_add(app, title, &category, &priority, description, deadline.as_deref())
        }
        Command::Quick { text } => run_quick(app, &text.join(" ")),
        Command::Edit { id, title, category, priority, description, deadline, clear_deadline } => {
            let fields = EditFields { title, category, priority, description, deadline };
            run_edit(app, &id, fields, clear_deadline)
        }
        Command::Toggle { id } => run_toggle(app, &id),
        Command::Delete { id } => run_delete(app, &id),
        Command::Complete { ids } => run_bulk(app, &ids, BulkAction::Complete),
        Command::Remove { ids } => run_bulk(app, &ids, BulkAction::Delete),
        Command::List { json } => run_list(app, json),
        Command::Filter { kind, value } => run_filter(app, kind, &value),
        Command::Search { text } => run_search(app, &text.join(" ")),
        Command::Sort { key } => run_sort(app, &key),
        Command::Stats { json } => run_stats(app, json),
        Command::Ask { utterance } => run_ask(app, &utterance.join(" ")),
        Command::Suggest => run_suggest(app),
    };
    output.with_persist_warning(app)
}

fn run_version() -> CliOutput {
    success_output(format!("taskmaster v{}", crate::VERSION))
}

fn run_add(
    app: &mut App,
    title: String,
    category: &str,
    priority: &str,
    description: String,
    deadline: Option<&str>,
) -> CliOutput {
    let draft = match build_draft(title, category, priority, description, deadline) {
        Ok(draft) => draft,
        Err(e) => return error_output(e.to_string()),
    };
    match app.add_task(draft) {
        Ok(task) => added_output(&task),
        Err(e) => error_output(e.to_string()),
    }
}

fn build_draft(
    title: String,
    category: &str,
    priority: &str,
    description: String,
    deadline: Option<&str>,
) -> Result<TaskDraft> {
    Ok(TaskDraft::new(title)
        .category(Category::parse(category))
        .priority(priority.parse()?)
        .description(description)
        .deadline(deadline.map(parse_deadline_arg).transpose()?))
}

fn run_quick(app: &mut App, text: &str) -> CliOutput {
    match app.quick_add(text) {
        Ok(task) => added_output(&task),
        Err(e) => error_output(e.to_string()),
    }
}

struct EditFields {
    title: Option<String>,
    category: Option<String>,
    priority: Option<String>,
    description: Option<String>,
    deadline: Option<String>,
}

fn build_update(fields: EditFields, clear_deadline: bool) -> Result<TaskUpdate> {
    let deadline = if clear_deadline {
        Some(None)
    } else {
        fields.deadline.as_deref().map(parse_deadline_arg).transpose()?.map(Some)
    };
    Ok(TaskUpdate {
        title: fields.title,
        description: fields.description,
        category: fields.category.as_deref().map(Category::parse),
        priority: fields.priority.as_deref().map(str::parse::<Priority>).transpose()?,
        deadline,
    })
}

fn run_edit(app: &mut App, id: &str, fields: EditFields, clear_deadline: bool) -> CliOutput {
    let update = match build_update(fields, clear_deadline) {
        Ok(update) if update.is_empty() => return error_output("Nothing to update".to_string()),
        Ok(update) => update,
        Err(e) => return error_output(e.to_string()),
    };
    match app.edit_task(id, update) {
        Ok(Some(task)) => success_output(format!("Updated {}", task.title)),
        Ok(None) => not_found(id),
        Err(e) => error_output(e.to_string()),
    }
}

fn run_toggle(app: &mut App, id: &str) -> CliOutput {
    match app.toggle_task(id) {
        Some(task) if task.completed => success_output(format!("Completed {}", task.title)),
        Some(task) => success_output(format!("Reopened {}", task.title)),
        None => not_found(id),
    }
}

fn run_delete(app: &mut App, id: &str) -> CliOutput {
    if app.delete_task(id) {
        success_output(format!("Deleted {id}"))
    } else {
        success_output(format!("No task with ID {id}"))
    }
}

#[derive(Clone, Copy)]
enum BulkAction {
    Complete,
    Delete,
}

fn run_bulk(app: &mut App, ids: &[String], action: BulkAction) -> CliOutput {
    let mut output = success_output(String::new());
    for id in ids {
        if !app.select(id) {
            output.stderr.push(format!("No task with ID {id}"));
        }
    }
    let (count, verb) = match action {
        BulkAction::Complete => (app.bulk_complete_selected(), "Completed"),
        BulkAction::Delete => (app.bulk_delete_selected(), "Deleted"),
    };
    output.stdout = vec![format!("{verb} {count} {}", plural(count, "task", "tasks"))];
    output
}

fn run_list(app: &App, json: bool) -> CliOutput {
    let tasks = app.visible_tasks();
    if json {
        return json_output(&tasks);
    }

    let now = app.store().now();
    let mut lines = vec![format!("{} ({})", app.list_title(), tasks.len())];
    if tasks.is_empty() {
        lines.push("No tasks found".to_string());
    }
    lines.extend(tasks.iter().map(|task| task_line(task, now)));
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: lines, stderr: vec![] }
}

fn task_line(task: &Task, now: DateTime<Utc>) -> String {
    let mark = if task.completed { "[x]" } else { "[ ]" };
    let mut line =
        format!("{mark} {}  ({}, {})  {}", task.title, task.category, task.priority, task.id);
    if let Some(deadline) = task.deadline {
        line.push_str("  ");
        line.push_str(&describe_deadline(deadline, now));
    }
    match deadline_urgency(task, now) {
        Some(Urgency::Overdue) => line.push_str(" !!"),
        Some(Urgency::Soon) => line.push_str(" !"),
        Some(Urgency::Normal) | None => {}
    }
    line
}

fn run_filter(app: &mut App, kind: FilterKind, value: &str) -> CliOutput {
    let change = match kind {
        FilterKind::Category => Ok(FilterChange::Category(CategoryFilter::from(value.to_string()))),
        FilterKind::Status => value.parse::<StatusFilter>().map(FilterChange::Status),
        FilterKind::Priority => value.parse::<Priority>().map(FilterChange::Priority),
    };
    match change {
        Ok(change) => {
            app.set_filter(change);
            success_output(format!("Showing {}", app.list_title()))
        }
        Err(e) => error_output(e.to_string()),
    }
}

fn run_search(app: &mut App, text: &str) -> CliOutput {
    let text = text.trim();
    app.set_search(text);
    if text.is_empty() {
        success_output("Search cleared".to_string())
    } else {
        success_output(format!("Searching for \"{text}\""))
    }
}

fn run_sort(app: &mut App, key: &str) -> CliOutput {
    match key.parse::<SortKey>() {
        Ok(key) => {
            app.set_sort(key);
            success_output(format!("Sorted by {key}"))
        }
        Err(e) => error_output(e.to_string()),
    }
}

fn run_stats(app: &App, json: bool) -> CliOutput {
    let stats = app.stats();
    if json {
        return json_output(&stats);
    }
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: stats_lines(&stats), stderr: vec![] }
}

fn stats_lines(stats: &StatsSnapshot) -> Vec<String> {
    let categories: Vec<String> = Category::KNOWN
        .iter()
        .map(|c| format!("{} {}", c.name(), stats.categories.get(c.name()).copied().unwrap_or(0)))
        .collect();

    let mut lines = vec![
        format!(
            "Total: {}  Completed today: {}  Productivity: {}%",
            stats.total, stats.completed_today, stats.completion_rate
        ),
        format!("Progress: {}", stats.progress_line()),
        format!("Streak: {}", stats.streak_line()),
        format!("Categories: {}", categories.join(", ")),
    ];
    if stats.uncategorized > 0 {
        lines.push(format!("Uncategorized: {}", stats.uncategorized));
    }
    lines.push(format!(
        "Status: pending {}, completed {}, overdue {}, today {}",
        stats.statuses.pending,
        stats.statuses.completed,
        stats.statuses.overdue,
        stats.statuses.today
    ));
    lines.push(format!(
        "Open by priority: high {}, medium {}, low {}",
        stats.priorities.high, stats.priorities.medium, stats.priorities.low
    ));
    lines
}

fn run_ask(app: &mut App, utterance: &str) -> CliOutput {
    match app.ask(utterance) {
        Ok(Some(reply)) => {
            let mut lines = vec![reply.text];
            if let Some(task) = reply.created {
                lines.push(format!("ID: {}", task.id));
            }
            CliOutput { exit_code: ExitCode::SUCCESS, stdout: lines, stderr: vec![] }
        }
        Ok(None) => error_output("Nothing to send".to_string()),
        Err(e) => error_output(e.to_string()),
    }
}

fn run_suggest(app: &mut App) -> CliOutput {
    let lines = app.suggestions().into_iter().map(|s| format!("- {s}")).collect();
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: lines, stderr: vec![] }
}

// === Helpers ===

fn parse_deadline_arg(text: &str) -> Result<DateTime<Utc>> {
    dates::parse_deadline(text)
        .ok_or_else(|| Error::InvalidValue { kind: "deadline", value: text.to_string() })
}

fn added_output(task: &Task) -> CliOutput {
    let mut ctx = Context::new();
    ctx.insert("title", &task.title);
    ctx.insert("category", task.category.name());
    ctx.insert("priority", task.priority.as_str());
    let deadline =
        task.deadline.map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string());
    ctx.insert("deadline", &deadline);

    match templates::render(templates::TASK_ADDED, &ctx) {
        Ok(message) => CliOutput {
            exit_code: ExitCode::SUCCESS,
            stdout: vec![message.trim().to_string(), format!("ID: {}", task.id)],
            stderr: vec![],
        },
        Err(e) => error_output(e.to_string()),
    }
}

const fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

fn not_found(id: &str) -> CliOutput {
    error_output(format!("Task not found: {id}"))
}

fn json_output<T: Serialize>(value: &T) -> CliOutput {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![json], stderr: vec![] },
        Err(e) => error_output(e.to_string()),
    }
}

fn success_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![message], stderr: vec![] }
}

fn error_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![message] }
}
