//! Session state: the task store plus the view the user has chosen.
//!
//! [`App`] owns everything one session needs (the store, the active filters
//! and sort order, the selection, and the assistant) and is passed by
//! reference to whatever drives it.

use crate::assistant::{parse_task, Conversation, ConversationRouter, Reply};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::query::{self, FilterChange, FilterState, SortKey};
use crate::random::SystemRandom;
use crate::stats::StatsSnapshot;
use crate::storage::SqliteKvStore;
use crate::tasks::{Category, Priority, Task, TaskDraft, TaskStore, TaskUpdate};
use crate::templates;
use crate::traits::{KeyValueStore, SystemClock};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/// Key holding the JSON filter state.
pub const FILTERS_KEY: &str = "taskmaster_filters";
/// Key holding the sort key as a plain string.
pub const SORT_KEY: &str = "taskmaster_sort";

/// One session of the tracker.
#[derive(Debug)]
pub struct App {
    store: TaskStore,
    filters: FilterState,
    sort: SortKey,
    selected: BTreeSet<String>,
    router: ConversationRouter,
    conversation: Conversation,
}

impl App {
    /// Build a session around an opened store, restoring the saved filters
    /// and sort order from the store's backend.
    #[must_use]
    pub fn new(store: TaskStore, router: ConversationRouter, reply_delay: Duration) -> Self {
        let filters = load_filters(store.backend());
        let sort = load_sort(store.backend());
        Self {
            store,
            filters,
            sort,
            selected: BTreeSet::new(),
            router,
            conversation: Conversation::new(reply_delay),
        }
    }

    /// Open a session on the data directory with the system clock and
    /// randomness.
    ///
    /// Reads `config.yaml`, loads template overrides, and opens the
    /// `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the template
    /// overrides are invalid.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let config = AppConfig::load_or_default(data_dir);
        if let Some(dir) = config.templates_dir.as_deref() {
            templates::init_templates(Some(dir))?;
        }

        let db_path = config.db_path(data_dir);
        tracing::debug!(target: "store", "opening {}", db_path.display());
        let backend = SqliteKvStore::with_path(db_path)?;
        let store = TaskStore::open(
            Box::new(backend),
            Box::new(SystemClock),
            Box::new(SystemRandom::new()),
            config.seed_sample_tasks,
        );
        let router = ConversationRouter::new(Box::new(SystemRandom::new()));
        Ok(Self::new(store, router, config.reply_delay()))
    }

    /// The task store.
    #[must_use]
    pub const fn store(&self) -> &TaskStore {
        &self.store
    }

    /// The task store, mutably.
    pub fn store_mut(&mut self) -> &mut TaskStore {
        &mut self.store
    }

    /// Active filters.
    #[must_use]
    pub const fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Active sort order.
    #[must_use]
    pub const fn sort_key(&self) -> SortKey {
        self.sort
    }

    /// Apply a filter selection with toggle semantics and save it.
    pub fn set_filter(&mut self, change: FilterChange) {
        self.filters.toggle(change);
        self.save_filters();
    }

    /// Set the search text and save it.
    pub fn set_search(&mut self, search: &str) {
        self.filters.search = search.to_string();
        self.save_filters();
    }

    /// Set the sort order and save it.
    pub fn set_sort(&mut self, key: SortKey) {
        self.sort = key;
        save(self.store.backend(), SORT_KEY, key.as_str());
    }

    /// The filtered, sorted list.
    #[must_use]
    pub fn visible_tasks(&self) -> Vec<&Task> {
        query::view(self.store.tasks(), &self.filters, self.sort, self.store.now())
    }

    /// Heading for the list.
    #[must_use]
    pub fn list_title(&self) -> String {
        self.filters.title()
    }

    /// Counters over the whole store.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot::compute(self.store.tasks(), self.store.now())
    }

    /// Create a task from a one-line entry.
    ///
    /// The text is read as if prefixed with "add task"; when that does not
    /// parse, the whole text becomes the title of a Personal, medium task
    /// with no deadline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for blank input.
    pub fn quick_add(&mut self, text: &str) -> Result<Task> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Validation("Please enter a task".to_string()));
        }
        let draft = parse_task(&format!("add task {text}"), self.store.now()).unwrap_or_else(|| {
            TaskDraft::new(text).category(Category::Personal).priority(Priority::Medium)
        });
        Ok(self.store.create(draft))
    }

    /// Create a task from a manually entered draft.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the title or category is blank.
    pub fn add_task(&mut self, mut draft: TaskDraft) -> Result<Task> {
        draft.title = draft.title.trim().to_string();
        draft.description = draft.description.trim().to_string();
        draft.validate()?;
        Ok(self.store.create(draft))
    }

    /// Update a task. Returns `Ok(None)` for an unknown id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the update blanks the title or
    /// category.
    pub fn edit_task(&mut self, id: &str, mut update: TaskUpdate) -> Result<Option<&Task>> {
        if let Some(title) = update.title.as_mut() {
            *title = title.trim().to_string();
        }
        if let Some(description) = update.description.as_mut() {
            *description = description.trim().to_string();
        }
        let blank_title = update.title.as_deref().is_some_and(str::is_empty);
        let blank_category = update.category.as_ref().is_some_and(|c| c.name().trim().is_empty());
        if blank_title || blank_category {
            return Err(Error::Validation("Please fill in all required fields".to_string()));
        }
        Ok(self.store.update(id, update))
    }

    /// Flip a task's completion.
    pub fn toggle_task(&mut self, id: &str) -> Option<&Task> {
        self.store.toggle_complete(id)
    }

    /// Delete a task and drop it from the selection.
    pub fn delete_task(&mut self, id: &str) -> bool {
        self.selected.remove(id);
        self.store.delete(id)
    }

    /// Add an existing task to the selection. Unknown ids are ignored.
    pub fn select(&mut self, id: &str) -> bool {
        if self.store.get(id).is_none() {
            return false;
        }
        self.selected.insert(id.to_string())
    }

    /// Remove a task from the selection.
    pub fn deselect(&mut self, id: &str) -> bool {
        self.selected.remove(id)
    }

    /// Whether a task is selected.
    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Selected task ids.
    #[must_use]
    pub fn selected(&self) -> Vec<&str> {
        self.selected.iter().map(String::as_str).collect()
    }

    /// Select every visible task, or deselect them all when they already are.
    pub fn toggle_select_all(&mut self) {
        let visible: Vec<String> = self.visible_tasks().iter().map(|t| t.id.clone()).collect();
        if visible.iter().all(|id| self.selected.contains(id)) {
            for id in &visible {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(visible);
        }
    }

    /// Complete all selected tasks and clear the selection.
    pub fn bulk_complete_selected(&mut self) -> usize {
        let ids: Vec<String> = std::mem::take(&mut self.selected).into_iter().collect();
        self.store.bulk_complete(&ids)
    }

    /// Delete all selected tasks and clear the selection.
    pub fn bulk_delete_selected(&mut self) -> usize {
        let ids: Vec<String> = std::mem::take(&mut self.selected).into_iter().collect();
        self.store.bulk_delete(&ids)
    }

    /// Open the transcript with a greeting.
    pub fn greet(&mut self) -> &'static str {
        let greeting = self.router.greeting();
        self.conversation.say(greeting);
        greeting
    }

    /// Send a message to the assistant and wait for its reply.
    ///
    /// Returns `Ok(None)` for blank input.
    ///
    /// # Errors
    ///
    /// Returns an error if the reply cannot be rendered.
    pub fn ask(&mut self, utterance: &str) -> Result<Option<Reply>> {
        let Some(pending) = self.conversation.submit(utterance) else {
            return Ok(None);
        };
        self.conversation.complete(pending, &mut self.router, &mut self.store).map(Some)
    }

    /// The assistant transcript.
    #[must_use]
    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Suggestions for the current tasks.
    pub fn suggestions(&mut self) -> Vec<String> {
        self.router.suggestions(self.store.tasks())
    }

    fn save_filters(&self) {
        match serde_json::to_string(&self.filters) {
            Ok(json) => save(self.store.backend(), FILTERS_KEY, &json),
            Err(e) => tracing::warn!(target: "store", "could not encode filters: {e}"),
        }
    }
}

fn save(backend: &dyn KeyValueStore, key: &str, value: &str) {
    if let Err(e) = backend.set(key, value) {
        tracing::warn!(target: "store", "could not save {key}: {e}");
    }
}

fn load_filters(backend: &dyn KeyValueStore) -> FilterState {
    match backend.get(FILTERS_KEY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(target: "store", "discarding malformed filters: {e}");
            FilterState::default()
        }),
        Ok(None) => FilterState::default(),
        Err(e) => {
            tracing::warn!(target: "store", "could not read filters: {e}");
            FilterState::default()
        }
    }
}

fn load_sort(backend: &dyn KeyValueStore) -> SortKey {
    match backend.get(SORT_KEY) {
        Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(target: "store", "unknown sort key {raw:?}, using deadline");
            SortKey::default()
        }),
        Ok(None) => SortKey::default(),
        Err(e) => {
            tracing::warn!(target: "store", "could not read sort key: {e}");
            SortKey::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{CategoryFilter, StatusFilter};
    use crate::testing::{FixedClock, MemoryKvStore, SequenceRandom};
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
    use std::rc::Rc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn app_with(kv: &Rc<MemoryKvStore>) -> App {
        let store = TaskStore::open(
            Box::new(Rc::clone(kv)),
            Box::new(FixedClock::new(now())),
            Box::new(SequenceRandom::counting()),
            false,
        );
        let router = ConversationRouter::new(Box::new(SequenceRandom::constant(0)));
        App::new(store, router, Duration::ZERO)
    }

    fn app() -> (Rc<MemoryKvStore>, App) {
        let kv = Rc::new(MemoryKvStore::new());
        let app = app_with(&kv);
        (kv, app)
    }

    fn add(app: &mut App, title: &str, category: Category, priority: Priority) -> Task {
        app.add_task(TaskDraft::new(title).category(category).priority(priority)).unwrap()
    }

    #[test]
    fn test_filters_and_sort_persist_across_sessions() {
        let (kv, mut app) = app();
        app.set_filter(FilterChange::Status(StatusFilter::Pending));
        app.set_search("report");
        app.set_sort(SortKey::Priority);
        drop(app);

        let restored = app_with(&kv);
        assert_eq!(restored.filters().status, Some(StatusFilter::Pending));
        assert_eq!(restored.filters().search, "report");
        assert_eq!(restored.sort_key(), SortKey::Priority);
        assert_eq!(kv.get(SORT_KEY).unwrap().as_deref(), Some("priority"));
    }

    #[test]
    fn test_malformed_view_state_falls_back() {
        let kv = Rc::new(MemoryKvStore::new());
        kv.set(FILTERS_KEY, "{broken").unwrap();
        kv.set(SORT_KEY, "alphabetical").unwrap();

        let app = app_with(&kv);
        assert_eq!(app.filters(), &FilterState::default());
        assert_eq!(app.sort_key(), SortKey::Deadline);
    }

    #[test]
    fn test_partial_filters_merge_over_defaults() {
        let kv = Rc::new(MemoryKvStore::new());
        kv.set(FILTERS_KEY, r#"{"priority":"high"}"#).unwrap();
        let app = app_with(&kv);
        assert_eq!(app.filters().priority, Some(Priority::High));
        assert_eq!(app.filters().category, CategoryFilter::All);
        assert_eq!(app.list_title(), "High Priority Tasks");
    }

    #[test]
    fn test_visible_tasks_and_title() {
        let (_kv, mut app) = app();
        add(&mut app, "Report", Category::Work, Priority::Low);
        add(&mut app, "Gym", Category::Health, Priority::High);
        add(&mut app, "Slides", Category::Work, Priority::High);

        app.set_filter(FilterChange::Category(CategoryFilter::Only(Category::Work)));
        app.set_sort(SortKey::Priority);
        let titles: Vec<_> = app.visible_tasks().iter().map(|t| t.title.clone()).collect();
        assert_eq!(titles, ["Slides", "Report"]);
        assert_eq!(app.list_title(), "Work Tasks");

        app.set_filter(FilterChange::Category(CategoryFilter::Only(Category::Work)));
        assert_eq!(app.visible_tasks().len(), 3);
        assert_eq!(app.list_title(), "All Tasks");
    }

    #[test]
    fn test_quick_add_parses_or_falls_back() {
        let (_kv, mut app) = app();

        let parsed = app.quick_add("buy milk tomorrow").unwrap();
        assert_eq!(parsed.title, "buy milk");
        assert_eq!(parsed.category, Category::Shopping);
        assert!(parsed.deadline.is_some());

        let literal = app.quick_add(", odd entry").unwrap();
        assert_eq!(literal.title, ", odd entry");
        assert_eq!(literal.category, Category::Personal);
        assert_eq!(literal.priority, Priority::Medium);
        assert!(literal.deadline.is_none());

        assert!(matches!(app.quick_add("   "), Err(Error::Validation(_))));
        assert_eq!(app.store().len(), 2);
    }

    #[test]
    fn test_add_task_validates() {
        let (_kv, mut app) = app();
        let err = app.add_task(TaskDraft::new("  ").category(Category::Work)).unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all required fields");
        assert!(app.add_task(TaskDraft::new("No category")).is_err());
        assert!(app.store().is_empty());

        let task = app
            .add_task(TaskDraft::new("  Trim me  ").category(Category::Work).description(" d "))
            .unwrap();
        assert_eq!(task.title, "Trim me");
        assert_eq!(task.description, "d");
    }

    #[test]
    fn test_edit_task() {
        let (_kv, mut app) = app();
        let task = add(&mut app, "Draft", Category::Work, Priority::Low);

        let blank = TaskUpdate { title: Some("   ".to_string()), ..TaskUpdate::default() };
        assert!(app.edit_task(&task.id, blank).is_err());

        let rename = TaskUpdate { title: Some("Final".to_string()), ..TaskUpdate::default() };
        assert_eq!(app.edit_task(&task.id, rename).unwrap().unwrap().title, "Final");
        assert!(app.edit_task("missing", TaskUpdate::default()).unwrap().is_none());
    }

    #[test]
    fn test_toggle_select_all_over_visible() {
        let (_kv, mut app) = app();
        let work = add(&mut app, "Report", Category::Work, Priority::Low);
        let gym = add(&mut app, "Gym", Category::Health, Priority::Low);

        app.set_filter(FilterChange::Category(CategoryFilter::Only(Category::Work)));
        app.toggle_select_all();
        assert_eq!(app.selected(), vec![work.id.as_str()]);

        app.select(&gym.id);
        app.toggle_select_all();
        assert_eq!(app.selected(), vec![gym.id.as_str()]);
    }

    #[test]
    fn test_bulk_actions_clear_selection() {
        let (_kv, mut app) = app();
        let a = add(&mut app, "a", Category::Work, Priority::Low);
        let b = add(&mut app, "b", Category::Work, Priority::Low);
        let c = add(&mut app, "c", Category::Work, Priority::Low);

        assert!(!app.select("missing"));
        app.select(&a.id);
        app.select(&b.id);
        assert_eq!(app.bulk_complete_selected(), 2);
        assert!(app.selected().is_empty());
        assert!(app.store().get(&a.id).unwrap().completed);

        app.select(&b.id);
        app.select(&c.id);
        assert_eq!(app.bulk_delete_selected(), 2);
        assert!(app.selected().is_empty());
        assert_eq!(app.store().len(), 1);
    }

    #[test]
    fn test_delete_drops_selection() {
        let (_kv, mut app) = app();
        let a = add(&mut app, "a", Category::Work, Priority::Low);
        app.select(&a.id);
        assert!(app.delete_task(&a.id));
        assert!(!app.is_selected(&a.id));
        assert!(!app.delete_task(&a.id));
    }

    #[test]
    fn test_ask_records_transcript() {
        let (_kv, mut app) = app();
        let greeting = app.greet();
        assert!(!greeting.is_empty());

        assert!(app.ask("  ").unwrap().is_none());
        let reply = app.ask("Remind me to call mom tomorrow").unwrap().unwrap();
        assert!(reply.created.is_some());
        assert_eq!(app.conversation().messages().len(), 3);
        assert_eq!(app.stats().total, 1);
    }

    #[test]
    fn test_stats_snapshot() {
        let (_kv, mut app) = app();
        let a = add(&mut app, "a", Category::Work, Priority::Low);
        add(&mut app, "b", Category::Work, Priority::Low);
        app.toggle_task(&a.id);

        let stats = app.stats();
        assert_eq!(stats.completion_rate, 50);
        assert_eq!(stats.progress_line(), "1/2 tasks completed");
        assert_eq!(stats.streak, 1);
    }

    #[test]
    fn test_view_state_write_failure_is_non_fatal() {
        let (kv, mut app) = app();
        kv.fail_writes(true);
        app.set_sort(SortKey::Created);
        assert_eq!(app.sort_key(), SortKey::Created);
    }

    #[test]
    fn test_overdue_filter_uses_store_clock() {
        let (_kv, mut app) = app();
        app.add_task(
            TaskDraft::new("Late")
                .category(Category::Work)
                .deadline(Some(now() - ChronoDuration::hours(1))),
        )
        .unwrap();
        add(&mut app, "Undated", Category::Work, Priority::Low);

        app.set_filter(FilterChange::Status(StatusFilter::Overdue));
        assert_eq!(app.visible_tasks().len(), 1);
        assert_eq!(app.list_title(), "Overdue Tasks");
    }
}
