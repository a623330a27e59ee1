//!  Storage is organized through [journal_storage::JsonStorage].
//!  The basic idea is:
//!   - There is a data directory described by [config::StorageConfig].
//!   - Daily records live in a single `logs.json` array, tasks in `tasks.json`.
//!   - Files are always rewritten in full while holding an exclusive lock.
//!   - Unreadable records are skipped on load, a file that isn't an array is an error.

pub mod config;
pub mod entities;
pub mod journal_storage;

use thiserror::Error;

pub use config::StorageConfig;
pub use journal_storage::{parse_logs, parse_tasks, JournalStorage, JsonStorage};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a list of {0}, found {1}")]
    NotASequence(&'static str, &'static str),
}
