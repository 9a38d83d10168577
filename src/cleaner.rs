//! The sweep operation: find stale threads and move them to trash.

use tracing::{info, warn};

use crate::error::{Result, SweepError};
use crate::mailbox::Mailbox;
use crate::model::ThreadId;
use crate::query;

/// Progress callback: receives `(processed, total)` after each thread.
pub type ProgressFn<'a> = dyn Fn(usize, usize) + 'a;

/// Options for one sweep run.
#[derive(Debug, Clone)]
pub struct SweepOptions {
    /// Non-empty text matched against thread subjects (case-insensitive
    /// contains).
    pub subject_filter: String,
    /// Threads qualify when their last activity is older than this many days.
    pub max_age_days: u32,
    /// Search and report, but do not trash anything.
    pub dry_run: bool,
}

/// Outcome of one sweep run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SweepReport {
    /// Threads that matched the subject filter and age threshold.
    pub matched: usize,
    /// Threads successfully moved to trash (0 on a dry run).
    pub trashed: usize,
    /// Threads whose trash operation failed.
    pub failed: Vec<ThreadId>,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

/// Moves stale notification threads to trash.
///
/// Takes the mailbox as an explicit dependency so callers can plug in a
/// file-backed mailbox, a remote backend, or a test fake.
pub struct MailCleaner<M: Mailbox> {
    mailbox: M,
}

impl<M: Mailbox> MailCleaner<M> {
    pub fn new(mailbox: M) -> Self {
        Self { mailbox }
    }

    /// Give the mailbox back, e.g. to flush a file-backed one.
    pub fn into_inner(self) -> M {
        self.mailbox
    }

    /// Find threads whose subject contains `subject_filter` and whose last
    /// activity is older than `max_age_days` days, and move each to trash.
    ///
    /// Returns the number of threads trashed. Individual trash failures do
    /// not abort the batch; they are logged and excluded from the count.
    /// Idempotent in effect: a second run over an unchanged mailbox finds
    /// nothing, since matched threads are already in trash.
    pub fn delete_stale_notification_threads(
        &mut self,
        subject_filter: &str,
        max_age_days: u32,
    ) -> Result<usize> {
        let opts = SweepOptions {
            subject_filter: subject_filter.to_string(),
            max_age_days,
            dry_run: false,
        };
        Ok(self.sweep(&opts, None)?.trashed)
    }

    /// Run one sweep and report what happened.
    pub fn sweep(
        &mut self,
        opts: &SweepOptions,
        progress: Option<&ProgressFn<'_>>,
    ) -> Result<SweepReport> {
        if opts.subject_filter.trim().is_empty() {
            return Err(SweepError::InvalidQuery(
                "subject filter must not be empty".to_string(),
            ));
        }

        let query_str = query::build_query(&opts.subject_filter, opts.max_age_days);
        let threads = self.mailbox.search(&query_str)?;

        if threads.is_empty() {
            info!("No old threads found to delete.");
            return Ok(SweepReport {
                matched: 0,
                trashed: 0,
                failed: Vec::new(),
                dry_run: opts.dry_run,
            });
        }

        if opts.dry_run {
            info!("Dry run: {} threads would be moved to trash.", threads.len());
            return Ok(SweepReport {
                matched: threads.len(),
                trashed: 0,
                failed: Vec::new(),
                dry_run: true,
            });
        }

        info!("Deleting {} threads.", threads.len());

        let total = threads.len();
        let mut trashed = 0usize;
        let mut failed = Vec::new();

        for (i, thread) in threads.iter().enumerate() {
            match self.mailbox.trash(&thread.id) {
                Ok(()) => trashed += 1,
                Err(e) => {
                    warn!(thread = %thread.id, error = %e, "Failed to trash thread");
                    failed.push(thread.id.clone());
                }
            }
            if let Some(cb) = progress {
                cb(i + 1, total);
            }
        }

        Ok(SweepReport {
            matched: total,
            trashed,
            failed,
            dry_run: false,
        })
    }
}
