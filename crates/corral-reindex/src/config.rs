//! Reindex configuration.

use std::time::Duration;

/// Configuration for the reindex orchestrator.
#[derive(Debug, Clone)]
pub struct ReindexConfig {
    /// Object types processed at the same time (default: 4).
    pub concurrency: usize,
    /// Upper bound on any single enumeration or index write
    /// (default: 30 s). A call that exceeds it counts as failed.
    pub call_timeout: Duration,
    /// Minimum spacing between intermediate job saves (default: 1 s).
    /// A save always happens when an object type finishes.
    pub flush_interval: Duration,
}

impl Default for ReindexConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            call_timeout: Duration::from_secs(30),
            flush_interval: Duration::from_secs(1),
        }
    }
}
