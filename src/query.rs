//! Mailbox query parser and evaluator.
//!
//! Parses Gmail-flavored query strings into a structured [`Query`] that the
//! file-backed mailbox evaluates against individual threads.
//!
//! # Supported syntax
//!
//! **Subject**:
//! - `subject:invoice` — case-insensitive substring match
//! - `subject:"task list"` — quoted phrase (spaces preserved)
//! - bare words also match against the subject
//!
//! **Age filters** (units: `d` days, `w` weeks, `m` months ≈ 30d, `y` years ≈ 365d):
//! - `older_than:2d` — last activity strictly older than now − 2 days
//! - `newer_than:1w` — last activity within the last 7 days
//!
//! **Trash scope**:
//! - default — only non-trashed threads match
//! - `in:trash` — only trashed threads
//! - `in:anywhere` — both
//!
//! **Operators**: `term1 term2` — implicit AND.
//!
//! Unlike a best-effort search box, this parser is strict: an empty query or
//! a malformed predicate is rejected with [`SweepError::InvalidQuery`], since
//! a bad query silently matching nothing would make a destructive sweep look
//! like a clean no-op.

use chrono::{DateTime, Duration, Utc};

use crate::error::{Result, SweepError};
use crate::model::Thread;

/// A subject predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectMatch {
    /// Case-insensitive substring match on a single word.
    Word(String),
    /// Case-insensitive substring match on a quoted phrase.
    Phrase(String),
}

impl SubjectMatch {
    fn needle(&self) -> &str {
        match self {
            Self::Word(s) | Self::Phrase(s) => s,
        }
    }
}

/// Which trashed-state a thread must have to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrashScope {
    /// Only threads not in trash (the default).
    #[default]
    Active,
    /// Only threads already in trash.
    Trash,
    /// Both.
    Anywhere,
}

/// A fully parsed mailbox query. All predicates combine with AND.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Subject predicates; every one must match.
    pub subject_terms: Vec<SubjectMatch>,
    /// `older_than:` threshold in days, if present.
    pub older_than_days: Option<u32>,
    /// `newer_than:` threshold in days, if present.
    pub newer_than_days: Option<u32>,
    /// Trashed-state scope.
    pub scope: TrashScope,
}

impl Query {
    /// Evaluate the query against a single thread at time `now`.
    pub fn matches(&self, thread: &Thread, now: DateTime<Utc>) -> bool {
        match self.scope {
            TrashScope::Active if thread.trashed => return false,
            TrashScope::Trash if !thread.trashed => return false,
            _ => {}
        }

        if let Some(days) = self.older_than_days {
            if thread.last_activity >= now - Duration::days(i64::from(days)) {
                return false;
            }
        }

        if let Some(days) = self.newer_than_days {
            if thread.last_activity < now - Duration::days(i64::from(days)) {
                return false;
            }
        }

        if !self.subject_terms.is_empty() {
            let subject = thread.subject.to_lowercase();
            for term in &self.subject_terms {
                if !subject.contains(term.needle()) {
                    return false;
                }
            }
        }

        true
    }
}

/// Render the canonical query for the stale-notification sweep:
/// `subject:"<filter>" older_than:<N>d`.
///
/// Embedded double-quotes in the filter are stripped, as the query language
/// has no escape syntax.
pub fn build_query(subject_filter: &str, max_age_days: u32) -> String {
    let filter = subject_filter.replace('"', "");
    format!("subject:\"{}\" older_than:{}d", filter.trim(), max_age_days)
}

/// Parse a query string into a structured [`Query`].
///
/// Fails with `InvalidQuery` on empty input or a malformed predicate.
pub fn parse_query(input: &str) -> Result<Query> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SweepError::InvalidQuery(
            "query must not be empty".to_string(),
        ));
    }

    let mut query = Query::default();

    for token in tokenize(input) {
        if let Some(value) = token.strip_prefix("subject:") {
            query.subject_terms.push(make_subject_term(value)?);
        } else if let Some(value) = token.strip_prefix("older_than:") {
            query.older_than_days = Some(parse_age(value)?);
        } else if let Some(value) = token.strip_prefix("newer_than:") {
            query.newer_than_days = Some(parse_age(value)?);
        } else if let Some(value) = token.strip_prefix("in:") {
            query.scope = match value {
                "trash" => TrashScope::Trash,
                "anywhere" => TrashScope::Anywhere,
                "inbox" => TrashScope::Active,
                other => {
                    return Err(SweepError::InvalidQuery(format!(
                        "unknown location '{other}' (expected trash, inbox, or anywhere)"
                    )))
                }
            };
        } else {
            // Plain text — matches the subject
            query.subject_terms.push(make_subject_term(&token)?);
        }
    }

    Ok(query)
}

/// Build a subject term from a value string (quoted → Phrase, otherwise → Word).
fn make_subject_term(value: &str) -> Result<SubjectMatch> {
    let quoted = value.starts_with('"') && value.ends_with('"') && value.len() >= 2;
    let unquoted = value
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(value);
    if unquoted.trim().is_empty() {
        return Err(SweepError::InvalidQuery(
            "subject filter must not be empty".to_string(),
        ));
    }
    if quoted {
        Ok(SubjectMatch::Phrase(unquoted.to_lowercase()))
    } else {
        Ok(SubjectMatch::Word(unquoted.to_lowercase()))
    }
}

/// Tokenize input respecting quoted strings.
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            current.push(ch);
        } else if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Parse an age value like `2d`, `3w`, `6m`, `1y` into whole days.
fn parse_age(value: &str) -> Result<u32> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SweepError::InvalidQuery(
            "age filter needs a value like 2d".to_string(),
        ));
    }

    let (num_str, multiplier) = if let Some(n) = value.strip_suffix('d') {
        (n, 1u32)
    } else if let Some(n) = value.strip_suffix('w') {
        (n, 7)
    } else if let Some(n) = value.strip_suffix('m') {
        (n, 30)
    } else if let Some(n) = value.strip_suffix('y') {
        (n, 365)
    } else if value.chars().all(|c| c.is_ascii_digit()) {
        // Bare number: treat as days
        (value, 1)
    } else {
        return Err(SweepError::InvalidQuery(format!(
            "bad age '{value}' (expected <N>d, <N>w, <N>m, or <N>y)"
        )));
    };

    let num: u32 = num_str
        .parse()
        .map_err(|_| SweepError::InvalidQuery(format!("bad age '{value}'")))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| SweepError::InvalidQuery(format!("age '{value}' overflows")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread(subject: &str, age_days: i64, trashed: bool) -> Thread {
        Thread {
            id: "t".into(),
            subject: subject.to_string(),
            from: String::new(),
            last_activity: Utc::now() - Duration::days(age_days),
            message_count: 1,
            trashed,
        }
    }

    #[test]
    fn test_parse_subject_word() {
        let q = parse_query("subject:invoice").unwrap();
        assert_eq!(q.subject_terms, vec![SubjectMatch::Word("invoice".into())]);
        assert!(q.older_than_days.is_none());
    }

    #[test]
    fn test_parse_subject_phrase() {
        let q = parse_query("subject:\"Task List\"").unwrap();
        assert_eq!(
            q.subject_terms,
            vec![SubjectMatch::Phrase("task list".into())]
        );
    }

    #[test]
    fn test_parse_older_than_units() {
        assert_eq!(parse_query("older_than:2d").unwrap().older_than_days, Some(2));
        assert_eq!(parse_query("older_than:3w").unwrap().older_than_days, Some(21));
        assert_eq!(parse_query("older_than:2m").unwrap().older_than_days, Some(60));
        assert_eq!(parse_query("older_than:1y").unwrap().older_than_days, Some(365));
    }

    #[test]
    fn test_parse_bare_word_matches_subject() {
        let q = parse_query("digest").unwrap();
        assert_eq!(q.subject_terms, vec![SubjectMatch::Word("digest".into())]);
    }

    #[test]
    fn test_parse_reference_query() {
        let q = parse_query("subject:\"Task List\" older_than:2d").unwrap();
        assert_eq!(q.subject_terms.len(), 1);
        assert_eq!(q.older_than_days, Some(2));
        assert_eq!(q.scope, TrashScope::Active);
    }

    #[test]
    fn test_parse_in_trash() {
        let q = parse_query("in:trash subject:old").unwrap();
        assert_eq!(q.scope, TrashScope::Trash);
    }

    #[test]
    fn test_parse_empty_query_rejected() {
        assert!(matches!(
            parse_query("   "),
            Err(SweepError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_parse_malformed_age_rejected() {
        assert!(parse_query("older_than:abc").is_err());
        assert!(parse_query("older_than:5x").is_err());
        assert!(parse_query("older_than:").is_err());
    }

    #[test]
    fn test_parse_unknown_location_rejected() {
        assert!(parse_query("in:spam").is_err());
    }

    #[test]
    fn test_build_query() {
        assert_eq!(
            build_query("Task List", 2),
            "subject:\"Task List\" older_than:2d"
        );
    }

    #[test]
    fn test_build_query_strips_embedded_quotes() {
        assert_eq!(
            build_query("Say \"hi\"", 7),
            "subject:\"Say hi\" older_than:7d"
        );
    }

    #[test]
    fn test_matches_subject_and_age() {
        let q = parse_query("subject:\"Task List\" older_than:2d").unwrap();
        let now = Utc::now();
        assert!(q.matches(&thread("Task List Update", 5, false), now));
        assert!(!q.matches(&thread("Task List", 1, false), now));
        assert!(!q.matches(&thread("Build report", 5, false), now));
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let q = parse_query("subject:\"task list\"").unwrap();
        assert!(q.matches(&thread("TASK LIST reminder", 0, false), Utc::now()));
    }

    #[test]
    fn test_matches_excludes_trashed_by_default() {
        let q = parse_query("subject:old older_than:2d").unwrap();
        assert!(!q.matches(&thread("old news", 10, true), Utc::now()));
    }

    #[test]
    fn test_matches_in_anywhere_includes_trashed() {
        let q = parse_query("in:anywhere subject:old").unwrap();
        assert!(q.matches(&thread("old news", 10, true), Utc::now()));
    }

    #[test]
    fn test_matches_newer_than() {
        let q = parse_query("newer_than:7d").unwrap();
        let now = Utc::now();
        assert!(q.matches(&thread("anything", 3, false), now));
        assert!(!q.matches(&thread("anything", 10, false), now));
    }

    #[test]
    fn test_matches_multiple_terms_are_anded() {
        let q = parse_query("subject:task subject:list").unwrap();
        let now = Utc::now();
        assert!(q.matches(&thread("Task List Update", 0, false), now));
        assert!(!q.matches(&thread("Task board", 0, false), now));
    }
}
