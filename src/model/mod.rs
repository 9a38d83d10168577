//! Core data model types for mailbox threads.

pub mod thread;

pub use thread::{Thread, ThreadId};
