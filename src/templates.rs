//! Template loading and rendering using Tera.
//!
//! Assistant replies that interpolate counts or task fields live in
//! `templates/messages/*.tera`. They are embedded in the binary and can be
//! overridden by a directory of same-named files.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use tera::{Context, Tera};

/// Daily summary reply.
pub const DAILY_SUMMARY: &str = "messages/daily_summary.tera";
/// Fallback guidance reply.
pub const FALLBACK: &str = "messages/fallback.tera";
/// Confirmation printed after adding a task.
pub const TASK_ADDED: &str = "messages/task_added.tera";

/// Embedded default templates.
static EMBEDDED_TEMPLATES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(DAILY_SUMMARY, include_str!("../templates/messages/daily_summary.tera"));
    m.insert(FALLBACK, include_str!("../templates/messages/fallback.tera"));
    m.insert(TASK_ADDED, include_str!("../templates/messages/task_added.tera"));
    m
});

/// Global template engine with caching.
static TERA: Lazy<RwLock<Option<Tera>>> = Lazy::new(|| RwLock::new(None));

fn lock_error<E: std::fmt::Display>(e: E) -> Error {
    Error::Template(e.to_string())
}

fn build(templates_dir: Option<&Path>) -> Result<Tera> {
    let mut tera = Tera::default();

    if let Some(dir) = templates_dir.filter(|dir| dir.exists()) {
        let glob_pattern = format!("{}/**/*.tera", dir.display());
        tera = Tera::new(&glob_pattern).map_err(|e| {
            Error::Template(format!("Failed to load templates from {}: {e}", dir.display()))
        })?;
        tracing::debug!(target: "config", "loaded templates from {}", dir.display());
    }

    for (name, content) in EMBEDDED_TEMPLATES.iter() {
        if tera.get_template(name).is_err() {
            tera.add_raw_template(name, content).map_err(|e| {
                Error::Template(format!("Embedded template {name} is invalid: {e}"))
            })?;
        }
    }

    Ok(tera)
}

/// Initialize the template engine.
///
/// Files under `templates_dir` (when given and present) take precedence over
/// the embedded defaults.
///
/// # Errors
///
/// Returns an error if the directory contains invalid templates.
pub fn init_templates(templates_dir: Option<&Path>) -> Result<()> {
    let tera = build(templates_dir)?;
    *TERA.write().map_err(lock_error)? = Some(tera);
    Ok(())
}

/// Render a template with the given context.
///
/// The engine is initialized from the embedded defaults on first use.
///
/// # Errors
///
/// Returns an error if the template doesn't exist or rendering fails.
pub fn render(name: &str, context: &Context) -> Result<String> {
    let render_with = |tera: &Tera| {
        tera.render(name, context)
            .map_err(|e| Error::Template(format!("Failed to render template {name}: {e}")))
    };

    {
        let guard = TERA.read().map_err(lock_error)?;
        if let Some(tera) = guard.as_ref() {
            return render_with(tera);
        }
    }

    let mut guard = TERA.write().map_err(lock_error)?;
    if guard.is_none() {
        *guard = Some(build(None)?);
    }
    let tera = guard.as_ref().ok_or_else(|| Error::Template("Templates not initialized".into()))?;
    render_with(tera)
}

/// Reset the template cache, forcing re-initialization on next use.
///
/// # Errors
///
/// Returns an error if the write lock cannot be acquired.
pub fn reset_cache() -> Result<()> {
    *TERA.write().map_err(lock_error)? = None;
    Ok(())
}

/// Names of all embedded templates.
#[must_use]
pub fn embedded_template_names() -> Vec<&'static str> {
    EMBEDDED_TEMPLATES.keys().copied().collect()
}

/// Render every embedded template with sample data.
///
/// # Errors
///
/// Returns an error if any template fails to render.
pub fn verify_all_templates() -> Result<()> {
    let tera = build(None)?;
    let ctx = sample_context();
    for name in embedded_template_names() {
        tera.render(name, &ctx)
            .map_err(|e| Error::Template(format!("Template {name} failed to render: {e}")))?;
    }
    Ok(())
}

fn sample_context() -> Context {
    let mut ctx = Context::new();
    ctx.insert("due_today", &2_usize);
    ctx.insert("high_priority", &1_usize);
    ctx.insert("overdue", &0_usize);
    ctx.insert("create_example", "Remind me to call mom tomorrow at 3 PM");
    ctx.insert("summary_example", "What's my plan for today?");
    ctx.insert("title", "Buy groceries");
    ctx.insert("category", "Shopping");
    ctx.insert("priority", "medium");
    ctx.insert("deadline", "2025-01-13 18:00");
    ctx
}
