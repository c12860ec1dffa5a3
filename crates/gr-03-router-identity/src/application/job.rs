//! Periodic identity self-check.

use crate::domain::lifecycle::LifecycleState;
use crate::ports::inbound::RouterIdentityApi;
use gr_01_job_queue::{JobContext, JobError, Recurrence, RecurringJob, RecurringTask};
use std::sync::Arc;
use tracing::{debug, info};

pub const LIFECYCLE_JOB_NAME: &str = "Rebuild Router Info";

/// Checks the identity files every interval and rebuilds when triggered.
pub struct IdentityLifecycleJob {
    identity: Arc<dyn RouterIdentityApi>,
    state: LifecycleState,
    checks: u64,
    rebuilds: u64,
}

impl IdentityLifecycleJob {
    pub fn new(identity: Arc<dyn RouterIdentityApi>) -> Self {
        Self {
            identity,
            state: LifecycleState::Idle,
            checks: 0,
            rebuilds: 0,
        }
    }

    /// Wrap in a recurring job that runs every `interval_ms`.
    pub fn recurring(identity: Arc<dyn RouterIdentityApi>, interval_ms: u64) -> RecurringJob<Self> {
        RecurringJob::new(Self::new(identity), interval_ms)
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn checks(&self) -> u64 {
        self.checks
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    fn check(&mut self) -> Result<(), JobError> {
        let trigger = self
            .identity
            .check_triggers()
            .map_err(|e| JobError::failed(LIFECYCLE_JOB_NAME, e))?;

        let Some(trigger) = trigger else {
            debug!(checks = self.checks, "[gr-03] No identity rebuild needed");
            return Ok(());
        };

        info!(trigger = %trigger, "[gr-03] Rebuilding router info");
        self.rebuilds += 1;
        let outcome = self
            .identity
            .rebuild()
            .map_err(|e| JobError::failed(LIFECYCLE_JOB_NAME, e))?;
        debug!(outcome = outcome.as_label(), "[gr-03] Router info rebuild complete");
        Ok(())
    }
}

impl RecurringTask for IdentityLifecycleJob {
    fn name(&self) -> &str {
        LIFECYCLE_JOB_NAME
    }

    fn tick(&mut self, _ctx: &JobContext) -> Result<Recurrence, JobError> {
        self.state = LifecycleState::Checking;
        self.checks += 1;
        let result = self.check();
        self.state = LifecycleState::Idle;
        result.map(|_| Recurrence::Continue)
    }
}
