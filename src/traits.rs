//! Core traits for testability and abstraction.

use crate::error::Result;
use chrono::{DateTime, Utc};

/// Trait for the flat key-value persistence layer.
///
/// Values are opaque strings; callers own the serialization format. The
/// production implementation uses `SQLite`, while tests use an in-memory mock.
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` if the key was never set.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the write.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Trait for reading the current time.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Trait for pseudo-random choices.
///
/// Canned replies and id suffixes draw from this so tests can pin the output.
pub trait RandomSource {
    /// Produce the next 64 random bits.
    fn next_u64(&mut self) -> u64;

    /// Pick an index in `0..len`. Returns 0 when `len` is 0.
    #[allow(clippy::cast_possible_truncation)]
    fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        // Truncation is fine: the modulus is at most `len`.
        (self.next_u64() % len as u64) as usize
    }
}
