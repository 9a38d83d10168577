//! `mailsweep` — mailbox housekeeping for stale notification threads.
//!
//! This crate provides the core library for querying a mailbox for
//! conversation threads matching a subject filter and an age threshold,
//! and moving the matches to trash (a reversible soft-delete).

pub mod cleaner;
pub mod config;
pub mod error;
pub mod mailbox;
pub mod model;
pub mod query;
