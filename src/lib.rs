//! # `taskmaster`
//!
//! A personal task tracker with filtering, statistics, and a rule-based
//! assistant that turns short sentences into tasks.

pub mod app;
pub mod assistant;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dates;
pub mod display;
pub mod error;
pub mod paths;
pub mod query;
pub mod random;
pub mod stats;
pub mod storage;
pub mod tasks;
pub mod templates;
pub mod testing;
pub mod traits;

pub use app::App;
pub use error::{Error, Result};
pub use random::{SeededRandom, SystemRandom};
pub use traits::SystemClock;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
