//! Reindex Orchestrator.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use corral_core::error::{CorralError, CorralResult};
use corral_core::models::reindex::{JobStatus, ObjectType, ReindexJob};
use corral_core::repository::{
    ObjectSource, OrganizationRepository, ReindexJobRepository, SearchIndex,
};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::ReindexConfig;
use crate::worker::{CANCELLED, ProgressEvent, TypeWorker};

/// Attempts at writing the terminal job record before giving up.
const TERMINAL_SAVE_ATTEMPTS: u32 = 4;
const TERMINAL_SAVE_BACKOFF: Duration = Duration::from_millis(50);

/// Drives reindex jobs for organizations.
///
/// Generic over every collaborator so that tests can inject failing or
/// slow fakes.
pub struct Reindexer<O, S, I, J> {
    orgs: O,
    source: Arc<S>,
    index: Arc<I>,
    jobs: J,
    config: ReindexConfig,
}

/// A job running in the background.
///
/// Dropping the handle detaches the job; it keeps running to completion.
pub struct ReindexHandle {
    job_id: Uuid,
    cancel: CancellationToken,
    task: JoinHandle<CorralResult<ReindexJob>>,
}

impl ReindexHandle {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Ask the job to stop. Entries already written stay in the index;
    /// re-running the reindex is the recovery path.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the job to reach a terminal state.
    pub async fn wait(self) -> CorralResult<ReindexJob> {
        self.task
            .await
            .map_err(|e| CorralError::Internal(format!("reindex task failed: {e}")))?
    }
}

impl<O, S, I, J> Reindexer<O, S, I, J>
where
    O: OrganizationRepository,
    S: ObjectSource + 'static,
    I: SearchIndex + 'static,
    J: ReindexJobRepository,
{
    pub fn new(orgs: O, source: S, index: I, jobs: J, config: ReindexConfig) -> Self {
        Self {
            orgs,
            source: Arc::new(source),
            index: Arc::new(index),
            jobs,
            config,
        }
    }

    /// Reindex every object of `organization_name` and return the
    /// terminal job.
    pub async fn reindex(&self, organization_name: &str) -> CorralResult<ReindexJob> {
        let job = self.start(organization_name).await?;
        self.run(job, CancellationToken::new()).await
    }

    pub async fn job(&self, id: Uuid) -> CorralResult<ReindexJob> {
        self.jobs.get(id).await
    }

    /// Jobs of the organization currently named `organization_name`,
    /// including those started under an earlier name.
    pub async fn jobs_for(&self, organization_name: &str) -> CorralResult<Vec<ReindexJob>> {
        let org = self.orgs.get_by_name(organization_name).await?;
        self.jobs.list_for_organization(&org.guid).await
    }

    /// Resolve the organization to its guid and record a pending job.
    async fn start(&self, organization_name: &str) -> CorralResult<ReindexJob> {
        let org = self.orgs.get_by_name(organization_name).await?;
        let job = ReindexJob::new(org.guid, org.name);
        self.jobs.save(&job).await?;
        Ok(job)
    }

    async fn run(&self, mut job: ReindexJob, cancel: CancellationToken) -> CorralResult<ReindexJob> {
        job.status = JobStatus::Running;
        self.persist(&job).await;
        info!(
            job_id = %job.id,
            organization = %job.organization_name,
            org_guid = %job.organization_guid,
            "Reindex started"
        );

        let (tx, mut rx) = mpsc::channel(256);
        let pool = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut workers = JoinSet::new();

        for object_type in ObjectType::ALL {
            let worker = TypeWorker {
                org_guid: job.organization_guid.clone(),
                object_type,
                source: Arc::clone(&self.source),
                index: Arc::clone(&self.index),
                pool: Arc::clone(&pool),
                call_timeout: self.config.call_timeout,
                cancel: cancel.clone(),
                progress: tx.clone(),
            };
            workers.spawn(worker.run());
        }
        drop(tx);

        // Single writer: only this loop mutates and saves the job.
        let mut finished = BTreeSet::new();
        let mut dirty = false;
        let period = self.config.flush_interval.max(Duration::from_millis(1));
        let mut flush = tokio::time::interval_at(Instant::now() + period, period);
        flush.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    let done = match &event {
                        ProgressEvent::Finished { object_type, .. } => Some(*object_type),
                        _ => None,
                    };
                    apply(&mut job, event);
                    if let Some(object_type) = done {
                        finished.insert(object_type);
                        self.persist(&job).await;
                        dirty = false;
                    } else {
                        dirty = true;
                    }
                }
                _ = flush.tick(), if dirty => {
                    self.persist(&job).await;
                    dirty = false;
                }
            }
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(job_id = %job.id, error = %e, "Reindex worker aborted");
            }
        }

        // A worker that died without reporting leaves its type unfinished.
        for object_type in ObjectType::ALL {
            if !finished.contains(&object_type) {
                let reason = if cancel.is_cancelled() {
                    CANCELLED
                } else {
                    "worker aborted"
                };
                job.per_type_progress.entry(object_type).or_default().error = Some(reason.into());
            }
        }

        job.finish();
        self.save_terminal(&job).await?;

        if job.status == JobStatus::PartialFailure {
            warn!(job_id = %job.id, organization = %job.organization_name, "Reindex finished with failures");
        } else {
            info!(job_id = %job.id, organization = %job.organization_name, "Reindex completed");
        }
        Ok(job)
    }

    /// Intermediate save; a failure here is retried by the next save.
    async fn persist(&self, job: &ReindexJob) {
        if let Err(e) = self.jobs.save(job).await {
            warn!(job_id = %job.id, error = %e, "Failed to persist reindex progress");
        }
    }

    /// Write the terminal record, retrying with backoff so the stored job
    /// does not stay `running` after the work is done.
    async fn save_terminal(&self, job: &ReindexJob) -> CorralResult<()> {
        let mut delay = TERMINAL_SAVE_BACKOFF;
        let mut attempt = 1;
        loop {
            match self.jobs.save(job).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < TERMINAL_SAVE_ATTEMPTS => {
                    warn!(job_id = %job.id, attempt, error = %e, "Retrying terminal job save");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => {
                    error!(job_id = %job.id, error = %e, "Terminal job state could not be saved");
                    return Err(e);
                }
            }
        }
    }
}

impl<O, S, I, J> Reindexer<O, S, I, J>
where
    O: OrganizationRepository + 'static,
    S: ObjectSource + 'static,
    I: SearchIndex + 'static,
    J: ReindexJobRepository + 'static,
{
    /// Start a reindex in the background and return at once.
    ///
    /// The organization is checked and the pending job recorded before
    /// this returns, so the job id can be looked up immediately.
    pub async fn spawn(self: &Arc<Self>, organization_name: &str) -> CorralResult<ReindexHandle> {
        let job = self.start(organization_name).await?;
        let job_id = job.id;
        let cancel = CancellationToken::new();

        let this = Arc::clone(self);
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let result = this.run(job, token).await;
            if let Err(e) = &result {
                error!(job_id = %job_id, error = %e, "Reindex job failed");
            }
            result
        });

        Ok(ReindexHandle {
            job_id,
            cancel,
            task,
        })
    }
}

fn apply(job: &mut ReindexJob, event: ProgressEvent) {
    match event {
        ProgressEvent::Submitted(object_type) => {
            job.per_type_progress.entry(object_type).or_default().submitted += 1;
        }
        ProgressEvent::Failed { object_type, count } => {
            job.per_type_progress.entry(object_type).or_default().failed += count;
        }
        ProgressEvent::Finished { object_type, error } => {
            if let Some(error) = error {
                warn!(
                    job_id = %job.id,
                    object_type = %object_type,
                    error = %error,
                    "Object type not fully reindexed"
                );
                job.per_type_progress.entry(object_type).or_default().error = Some(error);
            }
        }
    }
}
