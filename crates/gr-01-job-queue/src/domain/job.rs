//! Job primitive.

use crate::domain::errors::JobError;
use crate::ports::inbound::JobSubmitter;
use crate::service::JobQueue;
use shared_types::Timestamp;
use std::fmt;
use std::sync::Arc;

/// Identity assigned to a job on submission.
///
/// Ids increase monotonically, so they double as the FIFO tie-breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

/// A one-shot unit of work owned by the [`JobQueue`] once submitted.
///
/// `run` consumes the job. A job that wants to run again submits a fresh
/// instance of itself through the context.
pub trait Job: Send + 'static {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Higher runs first among ready jobs.
    fn priority(&self) -> i32 {
        0
    }

    /// Execute the job. Must not block indefinitely.
    fn run(self: Box<Self>, ctx: &JobContext) -> Result<(), JobError>;
}

/// Handle given to a running job.
pub struct JobContext {
    queue: Arc<JobQueue>,
    job_id: JobId,
    started_at: Timestamp,
}

impl JobContext {
    pub(crate) fn new(queue: Arc<JobQueue>, job_id: JobId, started_at: Timestamp) -> Self {
        Self {
            queue,
            job_id,
            started_at,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Clock reading taken just before the job started.
    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn queue(&self) -> &Arc<JobQueue> {
        &self.queue
    }

    /// True once `stop()` has been called on the queue.
    pub fn is_stopping(&self) -> bool {
        self.queue.is_stopped()
    }
}

impl JobSubmitter for JobContext {
    fn submit_at(&self, job: Box<dyn Job>, not_before: Timestamp) -> JobId {
        self.queue.submit_at(job, not_before)
    }

    fn cancel(&self, id: JobId) -> bool {
        self.queue.cancel(id)
    }

    fn now(&self) -> Timestamp {
        self.queue.now()
    }
}

impl fmt::Debug for JobContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobContext")
            .field("job_id", &self.job_id)
            .field("started_at", &self.started_at)
            .finish()
    }
}
