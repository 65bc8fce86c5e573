//! Task ID generation.
//!
//! Task IDs combine a time component with a random suffix:
//! `task_<unix-millis>_<9 base-36 characters>`. The store retries on the
//! off chance that an ID is already taken.

use crate::traits::RandomSource;
use chrono::{DateTime, Utc};

/// Prefix shared by every generated task ID.
pub const ID_PREFIX: &str = "task_";

/// Length of the random suffix.
const SUFFIX_LEN: usize = 9;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Encode the low bits of `value` as exactly `len` base-36 digits.
#[must_use]
pub fn base36(mut value: u64, len: usize) -> String {
    let mut digits = vec![b'0'; len];
    for slot in digits.iter_mut().rev() {
        // The index is < 36 so the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation)]
        let index = (value % 36) as usize;
        *slot = BASE36[index];
        value /= 36;
    }
    String::from_utf8(digits).unwrap_or_default()
}

/// Generate a task ID for a task created at `now`.
#[must_use]
pub fn generate_task_id(now: DateTime<Utc>, random: &mut dyn RandomSource) -> String {
    let suffix = base36(random.next_u64(), SUFFIX_LEN);
    format!("{ID_PREFIX}{}_{suffix}", now.timestamp_millis())
}
