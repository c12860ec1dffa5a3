//! Shared fixtures: routers wired on a manual clock in a temp directory.

use gr_01_job_queue::{Job, JobContext, JobError, JobSubmitter, ManualClock};
use parking_lot::Mutex;
use router_runtime::{BootSequenceJob, BootStatus, RouterConfig, RouterContainer};
use std::path::Path;
use std::sync::Arc;

/// 2023-11-14T22:13:20Z
pub const GENESIS_MS: u64 = 1_700_000_000_000;

pub type EventLog = Arc<Mutex<Vec<String>>>;

/// A router whose time only moves when the test says so.
pub struct TestRouter {
    pub clock: Arc<ManualClock>,
    pub container: RouterContainer,
    pub boot: BootStatus,
}

impl TestRouter {
    pub fn new(dir: &Path) -> Self {
        let mut config = RouterConfig::default();
        config.identity.config_dir = dir.to_path_buf();
        let clock = Arc::new(ManualClock::new(GENESIS_MS));
        let container = RouterContainer::with_clock(config, clock.clone());
        Self {
            clock,
            container,
            boot: BootStatus::new(),
        }
    }

    /// Queue the boot chain and run it to completion.
    pub fn boot(&self) {
        self.container.queue.submit(Box::new(BootSequenceJob::new(
            self.container.boot_phases(),
            self.boot.clone(),
        )));
        self.container.queue.run_ready();
    }

    /// Advance the clock and run whatever became due.
    pub fn advance(&self, ms: u64) -> usize {
        self.clock.advance(ms);
        self.container.queue.run_ready()
    }
}

/// Job that appends its label to a shared log.
pub struct Mark {
    pub label: String,
    pub log: EventLog,
}

impl Mark {
    pub fn new(label: &str, log: &EventLog) -> Self {
        Self {
            label: label.to_string(),
            log: Arc::clone(log),
        }
    }
}

impl Job for Mark {
    fn name(&self) -> &str {
        &self.label
    }

    fn run(self: Box<Self>, _ctx: &JobContext) -> Result<(), JobError> {
        self.log.lock().push(self.label);
        Ok(())
    }
}
