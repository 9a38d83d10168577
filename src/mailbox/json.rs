//! File-backed mailbox: a JSON array of threads on local disk.
//!
//! This is the backend the CLI and the integration tests run against. The
//! file holds a plain JSON array of thread objects:
//!
//! ```json
//! [
//!   {
//!     "id": "18c2a4f09e7b1d32",
//!     "subject": "Task List Update",
//!     "from": "notifier@example.com",
//!     "last_activity": "2024-01-10T08:30:00Z",
//!     "message_count": 4,
//!     "trashed": false
//!   }
//! ]
//! ```
//!
//! Trash operations mutate only the in-memory copy; call [`JsonMailbox::flush`]
//! to persist. The write goes through a temp file and rename so a failed run
//! never leaves a half-written mailbox behind.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use crate::error::{Result, SweepError};
use crate::mailbox::Mailbox;
use crate::model::{Thread, ThreadId};
use crate::query;

/// A mailbox persisted as a JSON file.
#[derive(Debug)]
pub struct JsonMailbox {
    path: PathBuf,
    threads: Vec<Thread>,
    dirty: bool,
}

impl JsonMailbox {
    /// Open a mailbox file and load all threads into memory.
    ///
    /// A file that cannot be read maps to `ServiceUnavailable` (the backend
    /// is unreachable); a file that reads but does not parse maps to
    /// `InvalidMailbox`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            SweepError::ServiceUnavailable {
                reason: format!("cannot read mailbox '{}': {e}", path.display()),
            }
        })?;
        let threads: Vec<Thread> =
            serde_json::from_str(&contents).map_err(|e| SweepError::InvalidMailbox {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        debug!(path = %path.display(), threads = threads.len(), "Opened mailbox");
        Ok(Self {
            path,
            threads,
            dirty: false,
        })
    }

    /// All threads, in file order.
    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    /// Whether unsaved trash operations are pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Persist the current thread states back to the mailbox file.
    ///
    /// No-op when nothing changed.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let contents = serde_json::to_string_pretty(&self.threads).map_err(|e| {
            SweepError::InvalidMailbox {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(|e| SweepError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| SweepError::io(&self.path, e))?;

        debug!(path = %self.path.display(), "Flushed mailbox");
        self.dirty = false;
        Ok(())
    }
}

impl Mailbox for JsonMailbox {
    fn search(&self, query_str: &str) -> Result<Vec<Thread>> {
        let query = query::parse_query(query_str)?;
        let now = Utc::now();
        let matches: Vec<Thread> = self
            .threads
            .iter()
            .filter(|t| query.matches(t, now))
            .cloned()
            .collect();
        debug!(query = query_str, matches = matches.len(), "Searched mailbox");
        Ok(matches)
    }

    fn trash(&mut self, id: &ThreadId) -> Result<()> {
        let thread = self
            .threads
            .iter_mut()
            .find(|t| t.id == *id)
            .ok_or_else(|| SweepError::UnknownThread(id.clone()))?;

        if thread.trashed {
            // Idempotent no-op
            return Ok(());
        }

        thread.trashed = true;
        self.dirty = true;
        debug!(thread = %id, "Moved thread to trash");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn mailbox_file(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        f.write_all(contents.as_bytes()).expect("write fixture");
        f
    }

    #[test]
    fn test_open_missing_file_is_service_unavailable() {
        let err = JsonMailbox::open("/nonexistent/mailbox.json").unwrap_err();
        assert!(matches!(err, SweepError::ServiceUnavailable { .. }));
    }

    #[test]
    fn test_open_bad_json_is_invalid_mailbox() {
        let f = mailbox_file("{ not json");
        let err = JsonMailbox::open(f.path()).unwrap_err();
        assert!(matches!(err, SweepError::InvalidMailbox { .. }));
    }

    #[test]
    fn test_trash_is_idempotent() {
        let f = mailbox_file(
            r#"[{"id":"a","subject":"x","last_activity":"2024-01-01T00:00:00Z"}]"#,
        );
        let mut mb = JsonMailbox::open(f.path()).unwrap();
        mb.trash(&"a".into()).unwrap();
        assert!(mb.threads()[0].trashed);
        // Second trash of the same thread is a no-op, not an error
        mb.trash(&"a".into()).unwrap();
        assert!(mb.threads()[0].trashed);
    }

    #[test]
    fn test_trash_unknown_thread() {
        let f = mailbox_file("[]");
        let mut mb = JsonMailbox::open(f.path()).unwrap();
        let err = mb.trash(&"ghost".into()).unwrap_err();
        assert!(matches!(err, SweepError::UnknownThread(_)));
    }

    #[test]
    fn test_flush_persists_trashed_state() {
        let f = mailbox_file(
            r#"[{"id":"a","subject":"x","last_activity":"2024-01-01T00:00:00Z"}]"#,
        );
        let mut mb = JsonMailbox::open(f.path()).unwrap();
        mb.trash(&"a".into()).unwrap();
        assert!(mb.is_dirty());
        mb.flush().unwrap();
        assert!(!mb.is_dirty());

        let reopened = JsonMailbox::open(f.path()).unwrap();
        assert!(reopened.threads()[0].trashed);
    }

    #[test]
    fn test_search_rejects_empty_query() {
        let f = mailbox_file("[]");
        let mb = JsonMailbox::open(f.path()).unwrap();
        assert!(matches!(
            mb.search(""),
            Err(SweepError::InvalidQuery(_))
        ));
    }
}
