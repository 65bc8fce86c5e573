//! Path utilities for determining data storage locations.
//!
//! Data lives in `~/.taskmaster/` unless the `TASKMASTER_HOME` environment
//! variable points elsewhere.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const HOME_ENV_VAR: &str = "TASKMASTER_HOME";

/// The base directory name under the user's home.
const DATA_DIR_NAME: &str = ".taskmaster";

/// The database filename.
pub const DATABASE_FILENAME: &str = "taskmaster.sqlite3";

/// The config filename.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Get the base data directory.
///
/// Returns `$TASKMASTER_HOME` when set and non-empty, otherwise
/// `~/.taskmaster/`, or `None` if the home directory cannot be determined.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV_VAR).filter(|dir| !dir.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    dirs::home_dir().map(|home| home.join(DATA_DIR_NAME))
}

/// `<data_dir>/config.yaml`.
#[must_use]
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILENAME)
}

/// `<data_dir>/taskmaster.sqlite3`.
#[must_use]
pub fn default_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DATABASE_FILENAME)
}
