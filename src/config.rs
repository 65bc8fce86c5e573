//! Configuration management for taskmaster.
//!
//! This module handles the `config.yaml` file in the data directory.

use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const fn default_reply_delay_ms() -> u64 {
    500
}

const fn default_seed_sample_tasks() -> bool {
    true
}

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Simulated "thinking" time before an assistant reply, in milliseconds.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,

    /// Insert the sample tasks when no task list has been stored yet.
    #[serde(default = "default_seed_sample_tasks")]
    pub seed_sample_tasks: bool,

    /// Database location. None means `<data dir>/taskmaster.sqlite3`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Directory of `*.tera` files overriding the built-in reply templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            seed_sample_tasks: default_seed_sample_tasks(),
            database_path: None,
            templates_dir: None,
        }
    }
}

impl AppConfig {
    /// Load config from a data directory, returning None if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(data_dir: &Path) -> Result<Option<Self>> {
        let config_path = paths::config_path(data_dir);
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(Some(config))
    }

    /// Load config, falling back to defaults when the file is missing or
    /// unusable.
    #[must_use]
    pub fn load_or_default(data_dir: &Path) -> Self {
        match Self::load_from(data_dir) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!(
                    target: "config",
                    "ignoring unreadable {}: {e}",
                    paths::config_path(data_dir).display()
                );
                Self::default()
            }
        }
    }

    /// Save config to a data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, data_dir: &Path) -> Result<()> {
        let config_path = paths::config_path(data_dir);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// The reply delay as a [`Duration`].
    #[must_use]
    pub const fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    /// Where the key-value database lives for this data directory.
    #[must_use]
    pub fn db_path(&self, data_dir: &Path) -> PathBuf {
        self.database_path.clone().unwrap_or_else(|| paths::default_db_path(data_dir))
    }
}
