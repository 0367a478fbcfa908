//! SurrealDB repository implementations.

mod object_catalog;
mod organization;
mod reindex_job;
mod search_index;

pub use object_catalog::SurrealObjectCatalog;
pub use organization::SurrealOrganizationRepository;
pub use reindex_job::SurrealReindexJobRepository;
pub use search_index::SurrealSearchIndex;

use tracing::debug;

use crate::error::DbError;

/// Attempts made for a statement that keeps losing transaction conflicts.
const MAX_ATTEMPTS: u32 = 3;

/// Re-run `op` while it fails with a retryable transaction conflict.
///
/// Constraint violations are final and returned on the first attempt.
pub(crate) async fn retry_conflicts<T, F, Fut>(mut op: F) -> Result<T, DbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(err) if err.is_retryable() && attempt < MAX_ATTEMPTS => {
                debug!(attempt, error = %err, "Retrying after transaction conflict");
                attempt += 1;
            }
            other => return other,
        }
    }
}
