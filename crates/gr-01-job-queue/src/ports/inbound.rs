//! Inbound ports for the job queue.

use crate::domain::job::{Job, JobId};
use shared_types::Timestamp;

/// Submission API shared by the queue itself and by running jobs.
///
/// Job bodies receive a [`JobContext`](crate::JobContext), which implements
/// this trait, so chained work can be queued without holding the queue.
pub trait JobSubmitter: Send + Sync {
    /// Queue `job` to run no earlier than `not_before`.
    fn submit_at(&self, job: Box<dyn Job>, not_before: Timestamp) -> JobId;

    /// Remove a job that has not started yet. Returns `false` if it already
    /// ran, is running, or was never queued.
    fn cancel(&self, id: JobId) -> bool;

    /// Current time according to the queue's clock.
    fn now(&self) -> Timestamp;

    /// Queue `job` to run as soon as possible.
    fn submit(&self, job: Box<dyn Job>) -> JobId {
        let now = self.now();
        self.submit_at(job, now)
    }

    /// Queue `job` to run `delay_ms` from now.
    fn submit_after(&self, job: Box<dyn Job>, delay_ms: u64) -> JobId {
        let at = self.now().saturating_add(delay_ms);
        self.submit_at(job, at)
    }
}
