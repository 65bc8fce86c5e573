//! In-memory task store with write-through persistence.

use crate::tasks::id::generate_task_id;
use crate::tasks::models::{Category, Task, TaskDraft, TaskUpdate};
use crate::tasks::seed::sample_tasks;
use crate::traits::{Clock, KeyValueStore, RandomSource};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;

/// Key holding the JSON array of tasks.
pub const TASKS_KEY: &str = "taskmaster_tasks";

/// What `open` found under [`TASKS_KEY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A valid task list was restored (possibly empty).
    Loaded(usize),
    /// Nothing was stored yet.
    Missing,
    /// The stored value (or the backend) was unusable and was discarded.
    Discarded(String),
}

/// Ordered collection of tasks, owned for the length of a session.
///
/// Every mutation rewrites the whole collection to the backend. A failed
/// write is logged and remembered in [`TaskStore::last_persist_error`]; the
/// in-memory change stands.
pub struct TaskStore {
    tasks: Vec<Task>,
    backend: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    random: Box<dyn RandomSource>,
    load_outcome: LoadOutcome,
    last_persist_error: Option<String>,
}

impl fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskStore")
            .field("tasks", &self.tasks.len())
            .field("load_outcome", &self.load_outcome)
            .field("last_persist_error", &self.last_persist_error)
            .finish_non_exhaustive()
    }
}

impl TaskStore {
    /// Restore the store from `backend`.
    ///
    /// When no usable task list is stored and `seed_samples` is set, the
    /// sample tasks are inserted and persisted immediately. A stored empty
    /// list is respected.
    pub fn open(
        backend: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
        random: Box<dyn RandomSource>,
        seed_samples: bool,
    ) -> Self {
        let (tasks, load_outcome, repaired) = load_tasks(backend.as_ref());
        let mut store =
            Self { tasks, backend, clock, random, load_outcome, last_persist_error: None };
        if repaired > 0 {
            store.persist();
        }

        if seed_samples && !matches!(store.load_outcome, LoadOutcome::Loaded(_)) {
            store.tasks = sample_tasks(store.clock.now());
            tracing::info!(target: "store", "seeded {} sample tasks", store.tasks.len());
            store.persist();
        }

        store
    }

    /// What was found in the backend at startup.
    #[must_use]
    pub const fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    /// All tasks in insertion order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the store holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Look up a task by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// The current time according to the store's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The persistence backend, for callers that store their own keys.
    #[must_use]
    pub fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }

    /// The most recent persistence failure, if any.
    #[must_use]
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// Take and clear the most recent persistence failure.
    pub fn take_persist_error(&mut self) -> Option<String> {
        self.last_persist_error.take()
    }

    /// Create a task from a draft and append it.
    ///
    /// A draft without a category lands in [`Category::Personal`].
    pub fn create(&mut self, draft: TaskDraft) -> Task {
        let now = self.clock.now();
        let id = self.unique_id(now);
        let task = Task {
            id,
            title: draft.title,
            description: draft.description,
            category: draft.category.unwrap_or(Category::Personal),
            priority: draft.priority,
            deadline: draft.deadline,
            completed: false,
            created_at: now,
            completed_at: None,
        };
        tracing::debug!(target: "store", id = %task.id, "created task");
        self.tasks.push(task.clone());
        self.persist();
        task
    }

    /// Merge `update` into the task with `id`.
    ///
    /// Returns `None` (and writes nothing) when the ID is unknown.
    pub fn update(&mut self, id: &str, update: TaskUpdate) -> Option<&Task> {
        let index = self.index_of(id)?;
        update.apply_to(&mut self.tasks[index]);
        self.persist();
        self.tasks.get(index)
    }

    /// Flip completion of the task with `id`, maintaining `completed_at`.
    ///
    /// Returns `None` (and writes nothing) when the ID is unknown.
    pub fn toggle_complete(&mut self, id: &str) -> Option<&Task> {
        let index = self.index_of(id)?;
        let now = self.clock.now();
        self.tasks[index].toggle_complete(now);
        self.persist();
        self.tasks.get(index)
    }

    /// Remove the task with `id`. Deleting an absent ID is a no-op.
    ///
    /// Returns whether a task was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.tasks.remove(index);
        self.persist();
        true
    }

    /// Complete every listed task that exists and is still open.
    /// Already-completed tasks keep their original `completed_at`.
    ///
    /// Returns how many tasks changed.
    pub fn bulk_complete<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        let wanted: HashSet<&str> = ids.iter().map(AsRef::as_ref).collect();
        let now = self.clock.now();
        let mut changed = 0;
        for task in &mut self.tasks {
            if wanted.contains(task.id.as_str()) && !task.completed {
                task.mark_complete(now);
                changed += 1;
            }
        }
        if changed > 0 {
            self.persist();
        }
        changed
    }

    /// Remove every listed task in one persisted step.
    ///
    /// Returns how many tasks were removed.
    pub fn bulk_delete<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        let wanted: HashSet<&str> = ids.iter().map(AsRef::as_ref).collect();
        let before = self.tasks.len();
        self.tasks.retain(|task| !wanted.contains(task.id.as_str()));
        let removed = before - self.tasks.len();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn unique_id(&mut self, now: DateTime<Utc>) -> String {
        loop {
            let id = generate_task_id(now, self.random.as_mut());
            if self.index_of(&id).is_none() {
                return id;
            }
        }
    }

    /// Write the whole collection to the backend.
    fn persist(&mut self) {
        let result = serde_json::to_string(&self.tasks)
            .map_err(crate::error::Error::from)
            .and_then(|json| self.backend.set(TASKS_KEY, &json));
        match result {
            Ok(()) => self.last_persist_error = None,
            Err(e) => {
                tracing::warn!(target: "store", "could not save tasks: {e}");
                self.last_persist_error = Some(e.to_string());
            }
        }
    }
}

fn load_tasks(backend: &dyn KeyValueStore) -> (Vec<Task>, LoadOutcome, usize) {
    let raw = match backend.get(TASKS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return (Vec::new(), LoadOutcome::Missing, 0),
        Err(e) => {
            tracing::warn!(target: "store", "could not read tasks: {e}");
            return (Vec::new(), LoadOutcome::Discarded(e.to_string()), 0);
        }
    };

    match serde_json::from_str::<Vec<Task>>(&raw) {
        Ok(tasks) => {
            let (tasks, repaired) = repair_tasks(tasks);
            tracing::info!(target: "store", "loaded {} tasks", tasks.len());
            let count = tasks.len();
            (tasks, LoadOutcome::Loaded(count), repaired)
        }
        Err(e) => {
            tracing::warn!(target: "store", "discarding malformed task list: {e}");
            (Vec::new(), LoadOutcome::Discarded(e.to_string()), 0)
        }
    }
}

/// Restore the store invariants on a freshly loaded list.
///
/// `completed` and `completed_at` must agree, and IDs must be unique. A
/// completed task without a stamp is stamped with its creation time; the
/// first task with a given ID wins. Returns the repaired list and how many
/// tasks were changed or dropped.
fn repair_tasks(tasks: Vec<Task>) -> (Vec<Task>, usize) {
    let mut seen = HashSet::new();
    let mut repaired = 0;
    let mut kept = Vec::with_capacity(tasks.len());

    for mut task in tasks {
        if !seen.insert(task.id.clone()) {
            tracing::warn!(target: "store", id = %task.id, "dropping task with duplicate id");
            repaired += 1;
            continue;
        }
        match (task.completed, task.completed_at) {
            (true, None) => {
                tracing::warn!(target: "store", id = %task.id, "completed task had no completion time");
                task.completed_at = Some(task.created_at);
                repaired += 1;
            }
            (false, Some(_)) => {
                tracing::warn!(target: "store", id = %task.id, "open task had a completion time");
                task.completed_at = None;
                repaired += 1;
            }
            _ => {}
        }
        kept.push(task);
    }

    (kept, repaired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::models::Priority;
    use crate::testing::{FixedClock, MemoryKvStore, SequenceRandom};
    use chrono::{Duration, TimeZone};
    use std::rc::Rc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn empty_store() -> (Rc<MemoryKvStore>, FixedClock, TaskStore) {
        let kv = Rc::new(MemoryKvStore::new());
        let clock = FixedClock::new(now());
        let store = TaskStore::open(
            Box::new(Rc::clone(&kv)),
            Box::new(clock.clone()),
            Box::new(SequenceRandom::counting()),
            false,
        );
        (kv, clock, store)
    }

    fn stored_tasks(kv: &MemoryKvStore) -> Vec<Task> {
        serde_json::from_str(&kv.get(TASKS_KEY).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn test_create_assigns_identity_and_persists() {
        let (kv, _clock, mut store) = empty_store();
        let task = store.create(TaskDraft::new("Call mom").priority(Priority::Low));

        assert!(task.id.starts_with("task_"));
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
        assert_eq!(task.created_at, now());
        assert_eq!(task.category, Category::Personal);
        assert_eq!(stored_tasks(&kv), vec![task]);
    }

    #[test]
    fn test_create_preserves_insertion_order() {
        let (_kv, _clock, mut store) = empty_store();
        let a = store.create(TaskDraft::new("a"));
        let b = store.create(TaskDraft::new("b"));
        let c = store.create(TaskDraft::new("c"));
        let ids: Vec<_> = store.tasks().iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let kv = Rc::new(MemoryKvStore::new());
        // A random source that repeats itself forces the collision retry.
        let mut store = TaskStore::open(
            Box::new(Rc::clone(&kv)),
            Box::new(FixedClock::new(now())),
            Box::new(SequenceRandom::new(vec![7, 7, 8])),
            false,
        );
        let a = store.create(TaskDraft::new("a"));
        let b = store.create(TaskDraft::new("b"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_update_merges_fields() {
        let (kv, _clock, mut store) = empty_store();
        let task = store.create(TaskDraft::new("Draft").category(Category::Work));

        let updated = store
            .update(
                &task.id,
                TaskUpdate { title: Some("Final".to_string()), ..TaskUpdate::default() },
            )
            .unwrap()
            .clone();

        assert_eq!(updated.title, "Final");
        assert_eq!(updated.id, task.id);
        assert_eq!(updated.created_at, task.created_at);
        assert_eq!(updated.category, Category::Work);
        assert_eq!(stored_tasks(&kv)[0].title, "Final");
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let (kv, _clock, mut store) = empty_store();
        assert!(store.update("missing", TaskUpdate::default()).is_none());
        assert!(kv.get(TASKS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_toggle_complete_sets_and_clears_completed_at() {
        let (_kv, clock, mut store) = empty_store();
        let task = store.create(TaskDraft::new("Gym"));

        clock.advance(Duration::hours(2));
        let done = store.toggle_complete(&task.id).unwrap();
        assert!(done.completed);
        assert_eq!(done.completed_at, Some(now() + Duration::hours(2)));

        let undone = store.toggle_complete(&task.id).unwrap();
        assert!(!undone.completed);
        assert!(undone.completed_at.is_none());

        assert!(store.toggle_complete("missing").is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_kv, _clock, mut store) = empty_store();
        let task = store.create(TaskDraft::new("Temp"));
        assert!(store.delete(&task.id));
        assert!(!store.delete(&task.id));
        assert!(store.is_empty());
    }

    #[test]
    fn test_bulk_complete_leaves_completed_untouched() {
        let (_kv, clock, mut store) = empty_store();
        let a = store.create(TaskDraft::new("a"));
        let b = store.create(TaskDraft::new("b"));
        store.toggle_complete(&a.id);
        let first_stamp = store.get(&a.id).unwrap().completed_at;

        clock.advance(Duration::days(1));
        let changed = store.bulk_complete(&[a.id.as_str(), b.id.as_str(), "missing"]);

        assert_eq!(changed, 1);
        assert_eq!(store.get(&a.id).unwrap().completed_at, first_stamp);
        assert_eq!(store.get(&b.id).unwrap().completed_at, Some(now() + Duration::days(1)));
    }

    #[test]
    fn test_bulk_delete() {
        let (kv, _clock, mut store) = empty_store();
        let a = store.create(TaskDraft::new("a"));
        let b = store.create(TaskDraft::new("b"));
        let c = store.create(TaskDraft::new("c"));

        let removed = store.bulk_delete(&[a.id.clone(), c.id.clone(), "missing".to_string()]);
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert_eq!(stored_tasks(&kv)[0].id, b.id);
    }

    #[test]
    fn test_persist_failure_is_non_fatal() {
        let (kv, _clock, mut store) = empty_store();
        kv.fail_writes(true);

        let task = store.create(TaskDraft::new("Still here"));
        assert_eq!(store.len(), 1);
        assert!(store.get(&task.id).is_some());
        assert!(store.last_persist_error().unwrap().contains("quota"));

        kv.fail_writes(false);
        store.toggle_complete(&task.id);
        assert!(store.last_persist_error().is_none());
    }

    #[test]
    fn test_seed_on_fresh_backend() {
        let kv = Rc::new(MemoryKvStore::new());
        let store = TaskStore::open(
            Box::new(Rc::clone(&kv)),
            Box::new(FixedClock::new(now())),
            Box::new(SequenceRandom::counting()),
            true,
        );
        assert_eq!(store.len(), 4);
        assert_eq!(store.load_outcome(), &LoadOutcome::Missing);
        assert_eq!(stored_tasks(&kv).len(), 4);
    }

    #[test]
    fn test_seed_replaces_malformed_value() {
        let kv = Rc::new(MemoryKvStore::new());
        kv.set(TASKS_KEY, "{not json").unwrap();
        let store = TaskStore::open(
            Box::new(Rc::clone(&kv)),
            Box::new(FixedClock::new(now())),
            Box::new(SequenceRandom::counting()),
            true,
        );
        assert!(matches!(store.load_outcome(), LoadOutcome::Discarded(_)));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_no_reseed_of_persisted_empty_list() {
        let kv = Rc::new(MemoryKvStore::new());
        kv.set(TASKS_KEY, "[]").unwrap();
        let store = TaskStore::open(
            Box::new(Rc::clone(&kv)),
            Box::new(FixedClock::new(now())),
            Box::new(SequenceRandom::counting()),
            true,
        );
        assert_eq!(store.load_outcome(), &LoadOutcome::Loaded(0));
        assert!(store.is_empty());
    }

    #[test]
    fn test_reopen_restores_tasks() {
        let (kv, clock, mut store) = empty_store();
        let task = store.create(TaskDraft::new("Persist me").category(Category::Learning));
        drop(store);

        let reopened = TaskStore::open(
            Box::new(Rc::clone(&kv)),
            Box::new(clock),
            Box::new(SequenceRandom::counting()),
            true,
        );
        assert_eq!(reopened.tasks(), &[task]);
    }

    #[test]
    fn test_unreadable_backend_starts_empty() {
        let kv = Rc::new(MemoryKvStore::new());
        kv.fail_reads(true);
        let store = TaskStore::open(
            Box::new(Rc::clone(&kv)),
            Box::new(FixedClock::new(now())),
            Box::new(SequenceRandom::counting()),
            false,
        );
        assert!(store.is_empty());
        assert!(matches!(store.load_outcome(), LoadOutcome::Discarded(_)));
    }

    fn open_with(kv: &Rc<MemoryKvStore>) -> TaskStore {
        TaskStore::open(
            Box::new(Rc::clone(kv)),
            Box::new(FixedClock::new(now())),
            Box::new(SequenceRandom::counting()),
            false,
        )
    }

    fn raw_task(id: &str, completed: bool, completed_at: Option<DateTime<Utc>>) -> Task {
        Task {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            category: Category::Work,
            priority: Priority::Medium,
            deadline: None,
            completed,
            created_at: now() - Duration::days(2),
            completed_at,
        }
    }

    fn seed_raw(kv: &MemoryKvStore, tasks: &[Task]) {
        kv.set(TASKS_KEY, &serde_json::to_string(tasks).unwrap()).unwrap();
    }

    #[test]
    fn test_load_stamps_completed_task_without_time() {
        let kv = Rc::new(MemoryKvStore::new());
        seed_raw(&kv, &[raw_task("a", true, None)]);

        let store = open_with(&kv);
        let task = store.get("a").unwrap();
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(task.created_at));
        assert_eq!(stored_tasks(&kv)[0].completed_at, Some(task.created_at));
    }

    #[test]
    fn test_load_clears_completion_time_on_open_task() {
        let kv = Rc::new(MemoryKvStore::new());
        seed_raw(&kv, &[raw_task("a", false, Some(now() - Duration::hours(1)))]);

        let store = open_with(&kv);
        let task = store.get("a").unwrap();
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
        assert_eq!(stored_tasks(&kv)[0].completed_at, None);
    }

    #[test]
    fn test_load_drops_duplicate_ids() {
        let kv = Rc::new(MemoryKvStore::new());
        let mut second = raw_task("x", false, None);
        second.title = "second".to_string();
        seed_raw(&kv, &[raw_task("x", true, None), second, raw_task("y", false, None)]);

        let mut store = open_with(&kv);
        assert_eq!(store.len(), 2);
        assert_eq!(store.load_outcome(), &LoadOutcome::Loaded(2));
        assert_eq!(store.get("x").unwrap().title, "x");
        assert!(store.tasks().iter().all(|t| t.completed == t.completed_at.is_some()));

        assert!(store.delete("x"));
        assert!(store.get("x").is_none());
        assert_eq!(stored_tasks(&kv).len(), 1);
    }

    #[test]
    fn test_load_of_consistent_list_does_not_rewrite() {
        let kv = Rc::new(MemoryKvStore::new());
        seed_raw(&kv, &[raw_task("a", true, Some(now())), raw_task("b", false, None)]);
        let writes = kv.write_count();

        let store = open_with(&kv);
        assert_eq!(store.len(), 2);
        assert_eq!(kv.write_count(), writes);
    }
}
