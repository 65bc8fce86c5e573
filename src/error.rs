//! Error types for `taskmaster`.

/// Errors that can occur in the task tracker.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `SQLite` database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A regex error occurred.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A template error occurred.
    #[error("Template error: {0}")]
    Template(String),

    /// User input failed validation (missing required fields and the like).
    #[error("{0}")]
    Validation(String),

    /// The persistence backend refused a write (unavailable, quota exceeded).
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A value at a text boundary did not name a known variant.
    #[error("invalid {kind}: '{value}'")]
    InvalidValue {
        /// What was being parsed (e.g. "priority").
        kind: &'static str,
        /// The offending input.
        value: String,
    },
}

impl Error {
    /// Whether this error is caused by user input rather than a system fault.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidValue { .. })
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
