//! # Job Queue Subsystem
//!
//! **Subsystem ID:** gr-01
//!
//! ## Purpose
//!
//! Orders, times and executes the router's internal jobs. Jobs are one-shot
//! units of work; a job may submit further jobs (including a fresh instance of
//! itself) while it runs. Periodic work is expressed with [`RecurringJob`].
//!
//! ## Ordering Rules
//!
//! | Rule | Enforcement |
//! |------|-------------|
//! | A job never runs before its `not_before` time | `JobQueue::promote_due()` |
//! | Ready jobs run highest priority first | `ReadyKey` ordering |
//! | Ties: earliest `not_before`, then submission order | `ReadyKey` ordering |
//! | One job body at a time | `JobQueue::execute()` holds the run lock |
//! | A failing or panicking job never stops the queue | `catch_unwind` in `execute()` |
//!
//! ## Module Structure
//!
//! ```text
//! domain/job.rs        - Job trait, JobId, JobContext
//! domain/schedule.rs   - ReadyKey / TimerKey ordering
//! domain/recurring.rs  - RecurringTask, RecurringJob
//! domain/errors.rs     - JobError
//! ports/inbound.rs     - JobSubmitter
//! ports/outbound.rs    - Clock, SystemClock, ManualClock
//! service.rs           - JobQueue (run_ready, start, stop)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let queue = JobQueue::new(Arc::new(SystemClock));
//! queue.submit_now(Box::new(MyJob));
//! let handle = queue.start();
//! // ...
//! queue.stop();
//! handle.await?;
//! ```

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::errors::{panic_reason, JobError};
pub use domain::job::{Job, JobContext, JobId};
pub use domain::recurring::{Recurrence, RecurringJob, RecurringTask};
pub use ports::inbound::JobSubmitter;
pub use ports::outbound::{Clock, ManualClock, SystemClock};
pub use service::{JobQueue, QueueConfig, QueueStats};
