//! Error types for the job queue

use std::any::Any;
use thiserror::Error;

/// Faults a job body can report back to the queue.
///
/// The queue logs the fault and discards the job; nothing is retried.
#[derive(Debug, Error)]
pub enum JobError {
    /// The job could not complete its work.
    #[error("Job '{job}' failed: {reason}")]
    Failed { job: String, reason: String },

    /// Work inside the job panicked and was caught.
    #[error("Job '{job}' panicked: {reason}")]
    Panicked { job: String, reason: String },
}

impl JobError {
    /// Shorthand for [`JobError::Failed`].
    pub fn failed(job: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Failed {
            job: job.into(),
            reason: reason.to_string(),
        }
    }

    /// Wrap a payload returned by `catch_unwind`.
    pub fn panicked(job: impl Into<String>, payload: &(dyn Any + Send)) -> Self {
        Self::Panicked {
            job: job.into(),
            reason: panic_reason(payload),
        }
    }
}

/// Message carried by a panic payload, if it is a string.
pub fn panic_reason(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
