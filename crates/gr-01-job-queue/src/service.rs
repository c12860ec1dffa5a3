//! # Job Queue Service
//!
//! The queue keeps two indexes:
//!
//! - `timed`: jobs whose `not_before` is still in the future, by due time
//! - `ready`: jobs that may run now, by [`ReadyKey`]
//!
//! Selection first promotes every due timer into `ready`, then pops the
//! smallest ready key. Job bodies execute under `run_lock`, so at most one
//! runs at any moment whether they are driven by [`JobQueue::run_ready`] or
//! by the async loop started with [`JobQueue::start`].

use crate::domain::errors::panic_reason;
use crate::domain::job::{Job, JobContext, JobId};
use crate::domain::schedule::{ReadyKey, Slot, TimerKey};
use crate::ports::inbound::JobSubmitter;
use crate::ports::outbound::Clock;
use parking_lot::Mutex;
use router_telemetry::{JOBS_EXECUTED, JOBS_FAILED, JOB_QUEUE_DEPTH};
use shared_types::Timestamp;
use std::collections::{BTreeMap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Queue tuning.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Upper bound on how long the run loop sleeps before re-checking timers.
    pub idle_poll_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { idle_poll_ms: 1_000 }
    }
}

/// Snapshot of queue counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub submitted: u64,
    pub executed: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub pending: usize,
}

struct Queued {
    name: String,
    priority: i32,
    job: Box<dyn Job>,
}

#[derive(Default)]
struct QueueState {
    timed: BTreeMap<TimerKey, Queued>,
    ready: BTreeMap<ReadyKey, Queued>,
    index: HashMap<JobId, Slot>,
}

impl QueueState {
    fn len(&self) -> usize {
        self.index.len()
    }

    fn promote_due(&mut self, now: Timestamp) {
        let later = self.timed.split_off(&TimerKey {
            not_before: now.saturating_add(1),
            id: JobId(0),
        });
        let due = std::mem::replace(&mut self.timed, later);
        for (key, queued) in due {
            let ready_key = ReadyKey::new(queued.priority, key.not_before, key.id);
            self.index.insert(key.id, Slot::Ready(ready_key));
            self.ready.insert(ready_key, queued);
        }
    }

    fn pop_ready(&mut self) -> Option<(JobId, Queued)> {
        let (key, queued) = self.ready.pop_first()?;
        self.index.remove(&key.id);
        Some((key.id, queued))
    }

    fn next_due(&self) -> Option<Timestamp> {
        self.timed.keys().next().map(|k| k.not_before)
    }
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    executed: AtomicU64,
    failed: AtomicU64,
    cancelled: AtomicU64,
}

/// The router's single cooperative job queue.
///
/// Owned by the composition root and shared as `Arc<JobQueue>`.
pub struct JobQueue {
    clock: Arc<dyn Clock>,
    config: QueueConfig,
    state: Mutex<QueueState>,
    run_lock: Mutex<()>,
    next_id: AtomicU64,
    counters: Counters,
    wakeup: Notify,
    running: AtomicBool,
    stopped: AtomicBool,
}

impl JobQueue {
    pub fn new(clock: Arc<dyn Clock>) -> Arc<Self> {
        Self::with_config(clock, QueueConfig::default())
    }

    pub fn with_config(clock: Arc<dyn Clock>, config: QueueConfig) -> Arc<Self> {
        Arc::new(Self {
            clock,
            config,
            state: Mutex::new(QueueState::default()),
            run_lock: Mutex::new(()),
            next_id: AtomicU64::new(1),
            counters: Counters::default(),
            wakeup: Notify::new(),
            running: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            executed: self.counters.executed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            cancelled: self.counters.cancelled.load(Ordering::Relaxed),
            pending: self.state.lock().len(),
        }
    }

    /// Time of the earliest job that is not yet due.
    pub fn next_due(&self) -> Option<Timestamp> {
        self.state.lock().next_due()
    }

    /// Run every job that is ready now, including jobs that become ready
    /// while doing so. Returns the number of jobs executed.
    ///
    /// Must not be called from inside a job body.
    pub fn run_ready(self: &Arc<Self>) -> usize {
        let mut executed = 0;
        while let Some((id, queued)) = self.take_next() {
            self.execute(id, queued);
            executed += 1;
        }
        executed
    }

    /// Spawn the run loop on the current tokio runtime.
    ///
    /// Job bodies run on the blocking pool, one at a time.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        self.stopped.store(false, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
        info!(pending = self.state.lock().len(), "[gr-01] Job queue started");

        let queue = Arc::clone(self);
        tokio::spawn(async move {
            while !queue.is_stopped() {
                if let Some((id, queued)) = queue.take_next() {
                    let worker = Arc::clone(&queue);
                    let name = queued.name.clone();
                    if let Err(e) =
                        tokio::task::spawn_blocking(move || worker.execute(id, queued)).await
                    {
                        error!(job = %name, error = %e, "[gr-01] Job worker aborted");
                    }
                    continue;
                }

                let idle = queue.config.idle_poll_ms;
                let wait = queue
                    .next_due()
                    .map(|due| due.saturating_sub(queue.now()).min(idle))
                    .unwrap_or(idle);
                tokio::select! {
                    _ = queue.wakeup.notified() => {}
                    _ = tokio::time::sleep(Duration::from_millis(wait)) => {}
                }
            }
            queue.running.store(false, Ordering::SeqCst);
            info!("[gr-01] Job queue stopped");
        })
    }

    /// Stop selecting jobs. The job currently running, if any, completes.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.wakeup.notify_one();
    }

    fn take_next(&self) -> Option<(JobId, Queued)> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.promote_due(now);
        let next = state.pop_ready();
        JOB_QUEUE_DEPTH.set(state.len() as f64);
        next
    }

    fn execute(self: &Arc<Self>, id: JobId, queued: Queued) {
        let _guard = self.run_lock.lock();
        let Queued { name, job, .. } = queued;
        let started_at = self.clock.now();
        let ctx = JobContext::new(Arc::clone(self), id, started_at);

        debug!(job = %name, job_id = %id, "[gr-01] Running job");
        match catch_unwind(AssertUnwindSafe(|| job.run(&ctx))) {
            Ok(Ok(())) => {
                self.counters.executed.fetch_add(1, Ordering::Relaxed);
                JOBS_EXECUTED.inc();
            }
            Ok(Err(e)) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                JOBS_FAILED.with_label_values(&["error"]).inc();
                error!(job = %name, job_id = %id, error = %e, "[gr-01] Job failed, discarded");
            }
            Err(panic) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                JOBS_FAILED.with_label_values(&["panic"]).inc();
                let reason = panic_reason(&*panic);
                error!(job = %name, job_id = %id, reason = %reason, "[gr-01] Job panicked, discarded");
            }
        }

        let elapsed_ms = self.clock.now().saturating_sub(started_at);
        if elapsed_ms > 1_000 {
            warn!(job = %name, elapsed_ms, "[gr-01] Job ran for over a second");
        }
    }
}

impl JobSubmitter for JobQueue {
    fn submit_at(&self, job: Box<dyn Job>, not_before: Timestamp) -> JobId {
        let id = JobId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let name = job.name().to_string();
        let priority = job.priority();
        debug!(job = %name, job_id = %id, not_before, priority, "[gr-01] Job submitted");

        {
            let mut state = self.state.lock();
            let key = TimerKey { not_before, id };
            state.index.insert(id, Slot::Timed(key));
            state.timed.insert(key, Queued { name, priority, job });
            JOB_QUEUE_DEPTH.set(state.len() as f64);
        }
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        self.wakeup.notify_one();
        id
    }

    fn cancel(&self, id: JobId) -> bool {
        let mut state = self.state.lock();
        let removed = match state.index.remove(&id) {
            Some(Slot::Timed(key)) => state.timed.remove(&key),
            Some(Slot::Ready(key)) => state.ready.remove(&key),
            None => None,
        };
        match removed {
            Some(queued) => {
                self.counters.cancelled.fetch_add(1, Ordering::Relaxed);
                JOB_QUEUE_DEPTH.set(state.len() as f64);
                debug!(job = %queued.name, job_id = %id, "[gr-01] Job cancelled");
                true
            }
            None => false,
        }
    }

    fn now(&self) -> Timestamp {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::JobError;
    use crate::ports::outbound::ManualClock;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recording {
        name: String,
        priority: i32,
        log: Log,
    }

    impl Recording {
        fn boxed(name: &str, priority: i32, log: &Log) -> Box<dyn Job> {
            Box::new(Self {
                name: name.to_string(),
                priority,
                log: log.clone(),
            })
        }
    }

    impl Job for Recording {
        fn name(&self) -> &str {
            &self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn run(self: Box<Self>, _ctx: &JobContext) -> Result<(), JobError> {
            self.log.lock().push(self.name.clone());
            Ok(())
        }
    }

    struct Chained {
        log: Log,
        remaining: u32,
    }

    impl Job for Chained {
        fn name(&self) -> &str {
            "Chained"
        }

        fn run(self: Box<Self>, ctx: &JobContext) -> Result<(), JobError> {
            self.log.lock().push(format!("chain-{}", self.remaining));
            if self.remaining > 0 {
                ctx.submit(Box::new(Chained {
                    log: self.log.clone(),
                    remaining: self.remaining - 1,
                }));
            }
            Ok(())
        }
    }

    struct Failing;

    impl Job for Failing {
        fn name(&self) -> &str {
            "Failing"
        }

        fn run(self: Box<Self>, _ctx: &JobContext) -> Result<(), JobError> {
            Err(JobError::failed("Failing", "expected"))
        }
    }

    struct Panicking;

    impl Job for Panicking {
        fn name(&self) -> &str {
            "Panicking"
        }

        fn run(self: Box<Self>, _ctx: &JobContext) -> Result<(), JobError> {
            panic!("job blew up");
        }
    }

    fn setup() -> (Arc<ManualClock>, Arc<JobQueue>, Log) {
        let clock = Arc::new(ManualClock::new(10_000));
        let queue = JobQueue::new(clock.clone());
        (clock, queue, Arc::new(Mutex::new(Vec::new())))
    }

    #[test]
    fn test_priority_order() {
        let (_clock, queue, log) = setup();
        queue.submit(Recording::boxed("low", 0, &log));
        queue.submit(Recording::boxed("high", 10, &log));
        queue.submit(Recording::boxed("mid", 5, &log));

        assert_eq!(queue.run_ready(), 3);
        assert_eq!(*log.lock(), vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_fifo_among_equal_priority() {
        let (_clock, queue, log) = setup();
        for name in ["a", "b", "c"] {
            queue.submit(Recording::boxed(name, 1, &log));
        }
        queue.run_ready();
        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_earlier_not_before_breaks_priority_tie() {
        let (clock, queue, log) = setup();
        queue.submit_at(Recording::boxed("later", 1, &log), 10_200);
        queue.submit_at(Recording::boxed("earlier", 1, &log), 10_100);
        clock.advance(500);
        queue.run_ready();
        assert_eq!(*log.lock(), vec!["earlier", "later"]);
    }

    #[test]
    fn test_not_before_respected() {
        let (clock, queue, log) = setup();
        queue.submit_after(Recording::boxed("delayed", 0, &log), 5_000);

        assert_eq!(queue.run_ready(), 0);
        assert_eq!(queue.next_due(), Some(15_000));

        clock.advance(4_999);
        assert_eq!(queue.run_ready(), 0);

        clock.advance(1);
        assert_eq!(queue.run_ready(), 1);
        assert_eq!(*log.lock(), vec!["delayed"]);
    }

    #[test]
    fn test_job_can_submit_followups() {
        let (_clock, queue, log) = setup();
        queue.submit(Box::new(Chained { log: log.clone(), remaining: 2 }));
        assert_eq!(queue.run_ready(), 3);
        assert_eq!(*log.lock(), vec!["chain-2", "chain-1", "chain-0"]);
    }

    #[test]
    fn test_failures_do_not_stop_queue() {
        let (_clock, queue, log) = setup();
        queue.submit(Box::new(Failing));
        queue.submit(Box::new(Panicking));
        queue.submit(Recording::boxed("survivor", 0, &log));

        assert_eq!(queue.run_ready(), 3);
        assert_eq!(*log.lock(), vec!["survivor"]);

        let stats = queue.stats();
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.executed, 1);
        assert_eq!(stats.pending, 0);
    }

    #[test]
    fn test_cancel_pending_job() {
        let (clock, queue, log) = setup();
        let keep = queue.submit(Recording::boxed("keep", 0, &log));
        let drop_timed = queue.submit_after(Recording::boxed("timed", 0, &log), 100);
        let drop_ready = queue.submit(Recording::boxed("ready", 0, &log));

        assert!(queue.cancel(drop_timed));
        assert!(queue.cancel(drop_ready));
        assert!(!queue.cancel(drop_ready));

        clock.advance(100);
        queue.run_ready();
        assert_eq!(*log.lock(), vec!["keep"]);
        assert!(!queue.cancel(keep));
        assert_eq!(queue.stats().cancelled, 2);
    }

    #[test]
    fn test_stats_track_submissions() {
        let (_clock, queue, log) = setup();
        queue.submit(Recording::boxed("one", 0, &log));
        queue.submit_after(Recording::boxed("two", 0, &log), 1_000);

        let stats = queue.stats();
        assert_eq!(stats.submitted, 2);
        assert_eq!(stats.pending, 2);

        queue.run_ready();
        assert_eq!(queue.stats().pending, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_loop_executes_and_stops() {
        let queue = JobQueue::with_config(
            Arc::new(crate::ports::outbound::SystemClock),
            QueueConfig { idle_poll_ms: 10 },
        );
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let handle = queue.start();

        queue.submit(Recording::boxed("first", 0, &log));
        queue.submit_after(Recording::boxed("second", 0, &log), 20);

        for _ in 0..200 {
            if log.lock().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(*log.lock(), vec!["first", "second"]);

        queue.stop();
        handle.await.unwrap();
        assert!(!queue.is_running());
    }
}
