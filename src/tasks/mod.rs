//! Task management.
//!
//! This module provides:
//! - The [`Task`] record with its category, priority, and deadline
//! - [`TaskStore`], the session-long ordered collection with write-through
//!   persistence to a [`KeyValueStore`](crate::traits::KeyValueStore)
//! - Sample tasks for a fresh store
//!
//! # Example
//!
//! ```
//! use taskmaster::tasks::{Category, Priority, TaskDraft, TaskStore};
//! use taskmaster::testing::MemoryKvStore;
//! use taskmaster::{SystemClock, SystemRandom};
//!
//! let mut store = TaskStore::open(
//!     Box::new(MemoryKvStore::new()),
//!     Box::new(SystemClock),
//!     Box::new(SystemRandom::new()),
//!     false,
//! );
//!
//! let task = store.create(
//!     TaskDraft::new("Finish report").category(Category::Work).priority(Priority::High),
//! );
//! store.toggle_complete(&task.id);
//! assert!(store.get(&task.id).unwrap().completed);
//! ```

pub mod id;
pub mod models;
pub mod seed;
pub mod store;

pub use models::{Category, Priority, Task, TaskDraft, TaskUpdate};
pub use store::{LoadOutcome, TaskStore, TASKS_KEY};
