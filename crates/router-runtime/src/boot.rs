//! # Boot Sequence
//!
//! Startup is an ordered list of [`BootPhase`]s executed as a chain of
//! one-shot [`BootSequenceJob`]s. Each job runs the head phase and, on
//! success, submits a fresh job holding the remaining phases. A failing
//! phase halts the chain; later phases never run.
//!
//! ```text
//! LoadIdentity ──→ PeerDatabase ──→ StartIdentityLifecycle ──→ AcceptClients
//! ```

use crate::adapters::PeerDatabaseFacade;
use gr_01_job_queue::{Job, JobContext, JobError, JobSubmitter};
use gr_03_router_identity::{IdentityLifecycleJob, RouterIdentityApi};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// Priority of boot jobs relative to ordinary work.
pub const BOOT_PRIORITY: i32 = 1_000;

/// One startup step.
pub trait BootPhase: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Run the step. Must not block indefinitely.
    fn run(&self, ctx: &JobContext) -> Result<(), JobError>;
}

#[derive(Debug, Default)]
struct BootProgress {
    completed: Vec<String>,
    failed: Option<String>,
    finished: bool,
}

/// Shared view of boot progress.
#[derive(Debug, Clone, Default)]
pub struct BootStatus {
    inner: Arc<RwLock<BootProgress>>,
}

impl BootStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of phases that completed, in order.
    pub fn completed(&self) -> Vec<String> {
        self.inner.read().completed.clone()
    }

    /// Name of the phase that halted the chain.
    pub fn failed(&self) -> Option<String> {
        self.inner.read().failed.clone()
    }

    /// True once every phase completed.
    pub fn is_finished(&self) -> bool {
        self.inner.read().finished
    }
}

/// One link of the boot chain.
pub struct BootSequenceJob {
    name: String,
    phases: VecDeque<Box<dyn BootPhase>>,
    status: BootStatus,
}

impl BootSequenceJob {
    pub fn new(phases: Vec<Box<dyn BootPhase>>, status: BootStatus) -> Self {
        Self::from_queue(phases.into(), status)
    }

    fn from_queue(phases: VecDeque<Box<dyn BootPhase>>, status: BootStatus) -> Self {
        let name = match phases.front() {
            Some(phase) => format!("Boot: {}", phase.name()),
            None => "Boot: complete".to_string(),
        };
        Self {
            name,
            phases,
            status,
        }
    }

    pub fn remaining(&self) -> usize {
        self.phases.len()
    }
}

impl Job for BootSequenceJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        BOOT_PRIORITY
    }

    fn run(self: Box<Self>, ctx: &JobContext) -> Result<(), JobError> {
        let Self {
            mut phases, status, ..
        } = *self;

        let Some(phase) = phases.pop_front() else {
            status.inner.write().finished = true;
            return Ok(());
        };

        info!(phase = phase.name(), "[boot] Running phase");
        if let Err(e) = phase.run(ctx) {
            error!(phase = phase.name(), error = %e, "[boot] Phase failed, boot halted");
            status.inner.write().failed = Some(phase.name().to_string());
            return Err(e);
        }
        status.inner.write().completed.push(phase.name().to_string());

        if phases.is_empty() {
            status.inner.write().finished = true;
            info!("[boot] Router started");
        } else {
            ctx.submit(Box::new(BootSequenceJob::from_queue(phases, status)));
        }
        Ok(())
    }
}

/// Install the on-disk identity, creating it on first boot.
pub struct LoadIdentityPhase {
    identity: Arc<dyn RouterIdentityApi>,
}

impl LoadIdentityPhase {
    pub fn new(identity: Arc<dyn RouterIdentityApi>) -> Self {
        Self { identity }
    }
}

impl BootPhase for LoadIdentityPhase {
    fn name(&self) -> &str {
        "Load Router Identity"
    }

    fn run(&self, _ctx: &JobContext) -> Result<(), JobError> {
        let info = self
            .identity
            .load_or_create()
            .map_err(|e| JobError::failed(self.name(), e))?;
        info!(identity = %info.identity(), "[boot] Router identity ready");
        Ok(())
    }
}

/// Start the peer database.
pub struct PeerDatabasePhase {
    database: Arc<dyn PeerDatabaseFacade>,
}

impl PeerDatabasePhase {
    pub fn new(database: Arc<dyn PeerDatabaseFacade>) -> Self {
        Self { database }
    }
}

impl BootPhase for PeerDatabasePhase {
    fn name(&self) -> &str {
        "Peer Database Startup"
    }

    fn run(&self, _ctx: &JobContext) -> Result<(), JobError> {
        self.database
            .startup()
            .map_err(|e| JobError::failed(self.name(), e))
    }
}

/// Schedule the recurring identity self-check.
pub struct StartIdentityLifecyclePhase {
    identity: Arc<dyn RouterIdentityApi>,
    interval_ms: u64,
}

impl StartIdentityLifecyclePhase {
    pub fn new(identity: Arc<dyn RouterIdentityApi>, interval_ms: u64) -> Self {
        Self {
            identity,
            interval_ms,
        }
    }
}

impl BootPhase for StartIdentityLifecyclePhase {
    fn name(&self) -> &str {
        "Start Identity Lifecycle"
    }

    fn run(&self, ctx: &JobContext) -> Result<(), JobError> {
        let job = IdentityLifecycleJob::recurring(Arc::clone(&self.identity), self.interval_ms);
        let id = ctx.submit_after(Box::new(job), self.interval_ms);
        info!(job_id = %id, interval_ms = self.interval_ms, "[boot] Identity lifecycle scheduled");
        Ok(())
    }
}

/// Open the client-facing side of the router.
pub struct StartAcceptingClientsPhase {
    accepting: Arc<AtomicBool>,
}

impl StartAcceptingClientsPhase {
    pub fn new(accepting: Arc<AtomicBool>) -> Self {
        Self { accepting }
    }
}

impl BootPhase for StartAcceptingClientsPhase {
    fn name(&self) -> &str {
        "Start Accepting Clients"
    }

    fn run(&self, _ctx: &JobContext) -> Result<(), JobError> {
        self.accepting.store(true, Ordering::SeqCst);
        info!("[boot] Accepting client connections");
        Ok(())
    }
}
