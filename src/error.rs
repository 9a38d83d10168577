//! Centralized error types for mailsweep.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::ThreadId;

/// All errors produced by the mailsweep library.
#[derive(Error, Debug)]
pub enum SweepError {
    /// The query or subject filter is empty or malformed.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The mailbox backend could not be reached.
    #[error("Mailbox service unavailable: {reason}")]
    ServiceUnavailable { reason: String },

    /// The mailbox file exists but does not contain valid thread data.
    #[error("Invalid mailbox file '{path}': {reason}")]
    InvalidMailbox { path: PathBuf, reason: String },

    /// A trash operation referenced a thread the mailbox does not know.
    #[error("Unknown thread: {0}")]
    UnknownThread(ThreadId),

    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias for `Result<T, SweepError>`.
pub type Result<T> = std::result::Result<T, SweepError>;

impl SweepError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
