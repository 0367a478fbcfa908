//! Per-object-type reindex worker.

use std::sync::Arc;
use std::time::Duration;

use corral_core::models::reindex::ObjectType;
use corral_core::repository::{ObjectSource, SearchIndex};
use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub(crate) const CANCELLED: &str = "cancelled";

/// Progress reported by a worker to the job's single writer.
#[derive(Debug)]
pub(crate) enum ProgressEvent {
    Submitted(ObjectType),
    /// `count` objects of the type could not be indexed.
    Failed {
        object_type: ObjectType,
        count: u64,
    },
    /// The worker is done with its type. `error` is set when the type
    /// stopped early (enumeration failure, timeout, cancellation).
    Finished {
        object_type: ObjectType,
        error: Option<String>,
    },
}

/// Why a bounded call did not produce a value.
enum Interrupted {
    Cancelled,
    TimedOut,
}

/// Everything one worker needs, owned so the worker can run as a task.
pub(crate) struct TypeWorker<S, I> {
    pub org_guid: String,
    pub object_type: ObjectType,
    pub source: Arc<S>,
    pub index: Arc<I>,
    pub pool: Arc<Semaphore>,
    pub call_timeout: Duration,
    pub cancel: CancellationToken,
    pub progress: mpsc::Sender<ProgressEvent>,
}

impl<S: ObjectSource, I: SearchIndex> TypeWorker<S, I> {
    pub async fn run(self) {
        let error = self.process().await.err();
        let _ = self
            .progress
            .send(ProgressEvent::Finished {
                object_type: self.object_type,
                error,
            })
            .await;
    }

    async fn process(&self) -> Result<(), String> {
        let _permit = tokio::select! {
            permit = Arc::clone(&self.pool).acquire_owned() => {
                permit.map_err(|_| "worker pool closed".to_string())?
            }
            _ = self.cancel.cancelled() => return Err(CANCELLED.into()),
        };

        let objects = match self
            .bounded(self.source.list_objects(&self.org_guid, self.object_type))
            .await
        {
            Ok(Ok(objects)) => objects,
            Ok(Err(e)) => return Err(format!("enumeration failed: {e}")),
            Err(Interrupted::TimedOut) => {
                return Err(format!(
                    "enumeration timed out after {}s",
                    self.call_timeout.as_secs_f64()
                ));
            }
            Err(Interrupted::Cancelled) => return Err(CANCELLED.into()),
        };

        debug!(
            org_guid = %self.org_guid,
            object_type = %self.object_type,
            count = objects.len(),
            "Reindexing object type"
        );

        let total = objects.len();
        for (done, object) in objects.into_iter().enumerate() {
            let outcome = self
                .bounded(self.index.index_put(
                    &self.org_guid,
                    self.object_type,
                    &object.id,
                    &object.body,
                ))
                .await;

            let event = match outcome {
                Ok(Ok(())) => ProgressEvent::Submitted(self.object_type),
                Ok(Err(e)) => {
                    warn!(
                        org_guid = %self.org_guid,
                        object_type = %self.object_type,
                        id = %object.id,
                        error = %e,
                        "Index write failed"
                    );
                    self.failed(1)
                }
                Err(Interrupted::TimedOut) => {
                    // The rest of the batch fails with this object.
                    let remaining = (total - done) as u64;
                    warn!(
                        org_guid = %self.org_guid,
                        object_type = %self.object_type,
                        id = %object.id,
                        remaining,
                        "Index write timed out, abandoning batch"
                    );
                    let _ = self.progress.send(self.failed(remaining)).await;
                    return Err(format!(
                        "index write timed out after {}s",
                        self.call_timeout.as_secs_f64()
                    ));
                }
                Err(Interrupted::Cancelled) => return Err(CANCELLED.into()),
            };

            if self.progress.send(event).await.is_err() {
                return Err("progress writer stopped".into());
            }
        }

        Ok(())
    }

    fn failed(&self, count: u64) -> ProgressEvent {
        ProgressEvent::Failed {
            object_type: self.object_type,
            count,
        }
    }

    /// Run `fut` under the call timeout, giving up early on cancellation.
    async fn bounded<F: Future>(&self, fut: F) -> Result<F::Output, Interrupted> {
        tokio::select! {
            result = tokio::time::timeout(self.call_timeout, fut) => {
                result.map_err(|_| Interrupted::TimedOut)
            }
            _ = self.cancel.cancelled() => Err(Interrupted::Cancelled),
        }
    }
}
