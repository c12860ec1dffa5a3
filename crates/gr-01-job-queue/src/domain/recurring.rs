//! Recurring tasks layered on the one-shot job primitive.
//!
//! A [`RecurringJob`] wraps a [`RecurringTask`] and, after every tick,
//! submits itself again at `now + interval`. The chain ends when the task
//! returns [`Recurrence::Stop`] or the queue is stopping.

use crate::domain::errors::JobError;
use crate::domain::job::{Job, JobContext};
use crate::ports::inbound::JobSubmitter;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// What a recurring task wants after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    Continue,
    Stop,
}

/// Periodic work driven by a [`RecurringJob`].
pub trait RecurringTask: Send + 'static {
    fn name(&self) -> &str;

    /// Perform one pass. An error or a panic is reported to the queue after
    /// the next tick has already been scheduled.
    fn tick(&mut self, ctx: &JobContext) -> Result<Recurrence, JobError>;
}

/// One-shot job that reschedules its task after each tick.
pub struct RecurringJob<T: RecurringTask> {
    task: T,
    interval_ms: u64,
    priority: i32,
}

impl<T: RecurringTask> RecurringJob<T> {
    pub fn new(task: T, interval_ms: u64) -> Self {
        Self {
            task,
            interval_ms,
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn task(&self) -> &T {
        &self.task
    }
}

impl<T: RecurringTask> Job for RecurringJob<T> {
    fn name(&self) -> &str {
        self.task.name()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn run(mut self: Box<Self>, ctx: &JobContext) -> Result<(), JobError> {
        let task = &mut self.task;
        let outcome = catch_unwind(AssertUnwindSafe(|| task.tick(ctx)))
            .unwrap_or_else(|panic| Err(JobError::panicked(task.name(), &*panic)));

        if matches!(outcome, Ok(Recurrence::Stop)) {
            debug!(job = %self.task.name(), "[gr-01] Recurring task finished");
            return Ok(());
        }
        if ctx.is_stopping() {
            debug!(job = %self.task.name(), "[gr-01] Queue stopping, not rescheduling");
            return outcome.map(|_| ());
        }

        let interval = self.interval_ms;
        let name = self.task.name().to_string();
        let next = ctx.submit_after(self, interval);
        match outcome {
            Ok(_) => {
                debug!(job = %name, next = %next, interval_ms = interval, "[gr-01] Recurring task rescheduled");
                Ok(())
            }
            Err(e) => {
                warn!(job = %name, next = %next, "[gr-01] Recurring task failed, rescheduled anyway");
                Err(e)
            }
        }
    }
}
