//! Mailbox backends.
//!
//! [`Mailbox`] is the single boundary dependency of the sweep: a service that
//! can search conversation threads and move one thread to trash. The cleaner
//! takes it as an explicit dependency so tests can substitute a fake, and so
//! a remote backend (IMAP, hosted API) can slot in behind the same trait.

pub mod json;

pub use json::JsonMailbox;

use crate::error::Result;
use crate::model::{Thread, ThreadId};

/// A mail service holding conversation threads.
pub trait Mailbox {
    /// Run a query (see [`crate::query`] for the syntax) and return the
    /// matching threads.
    ///
    /// Transport failures surface as
    /// [`SweepError::ServiceUnavailable`](crate::error::SweepError::ServiceUnavailable);
    /// a bad query as [`SweepError::InvalidQuery`](crate::error::SweepError::InvalidQuery).
    fn search(&self, query: &str) -> Result<Vec<Thread>>;

    /// Move one thread to trash (reversible soft-delete).
    ///
    /// Idempotent: trashing an already-trashed thread is a successful no-op.
    fn trash(&mut self, id: &ThreadId) -> Result<()>;
}
