//! Conversation thread types.

use chrono::{DateTime, Utc};

/// Stable identifier of a conversation thread, assigned by the mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ThreadId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A conversation thread as reported by the mailbox backend.
///
/// The thread is owned entirely by the mail service; this struct is an
/// ephemeral snapshot held only for the duration of one invocation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Thread {
    /// Backend-assigned identifier.
    pub id: ThreadId,

    /// Subject line of the conversation.
    pub subject: String,

    /// Sender of the most recent message (display form, may be empty).
    #[serde(default)]
    pub from: String,

    /// Timestamp of the last message activity in the thread.
    pub last_activity: DateTime<Utc>,

    /// Number of messages in the conversation.
    #[serde(default = "default_message_count")]
    pub message_count: u32,

    /// Whether the thread currently sits in trash.
    #[serde(default)]
    pub trashed: bool,
}

fn default_message_count() -> u32 {
    1
}

impl Thread {
    /// Whole days elapsed between `last_activity` and `now`.
    /// Negative if the thread's last activity lies in the future.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_activity).num_days()
    }
}
