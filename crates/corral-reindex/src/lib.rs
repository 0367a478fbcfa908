//! corral reindex: rebuilds an organization's search index entries.
//!
//! Each object type is an independent partition handled by its own worker
//! on a bounded pool. Workers report over a channel to a single writer that
//! owns the job record, so progress updates are never lost to concurrent
//! writes. No lock on the organization is held while a job runs.

pub mod config;
pub mod orchestrator;
mod worker;

pub use config::ReindexConfig;
pub use orchestrator::{ReindexHandle, Reindexer};
