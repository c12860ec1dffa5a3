//! # Garlic Dispatcher
//!
//! Entry point for sending a garlic message. Validation happens before any
//! job is queued; everything after that is reported through callbacks.

use crate::application::jobs::{BuildGarlicJob, SendParams};
use crate::domain::entities::GarlicConfig;
use crate::domain::envelope::EnvelopeCallbacks;
use crate::domain::errors::DispatchError;
use crate::domain::session::{SessionSlot, SessionStore};
use crate::ports::inbound::GarlicDispatchApi;
use crate::ports::outbound::{GarlicCipher, OutboundDispatchQueue, ReplyJob, ReplySelector};
use gr_01_job_queue::{Job, JobId, JobQueue, JobSubmitter};
use std::sync::Arc;
use tracing::debug;

/// Dispatch tuning. All durations in milliseconds.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Added to the message expiration to form the envelope expiration.
    pub clock_skew_tolerance_ms: u64,
    /// Builds slower than this are logged as warnings.
    pub slow_build_threshold_ms: u64,
    pub default_priority: i32,
    pub default_reply_timeout_ms: u64,
    /// Tags given to a freshly created peer session.
    pub initial_session_tags: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            clock_skew_tolerance_ms: 60_000,
            slow_build_threshold_ms: 1_000,
            default_priority: 100,
            default_reply_timeout_ms: 60_000,
            initial_session_tags: 40,
        }
    }
}

/// Arguments of one dispatch call.
pub struct DispatchRequest {
    config: GarlicConfig,
    session: Option<SessionSlot>,
    timeout_ms: Option<u64>,
    priority: Option<i32>,
    reply_selector: Option<Box<dyn ReplySelector>>,
    callbacks: EnvelopeCallbacks,
}

impl DispatchRequest {
    pub fn new(config: GarlicConfig) -> Self {
        Self {
            config,
            session: None,
            timeout_ms: None,
            priority: None,
            reply_selector: None,
            callbacks: EnvelopeCallbacks::default(),
        }
    }

    /// Use this session instead of the dispatcher's per-peer store.
    pub fn session(mut self, slot: SessionSlot) -> Self {
        self.session = Some(slot);
        self
    }

    /// How long to wait for a reply once sent.
    pub fn timeout(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn reply_selector(mut self, selector: impl ReplySelector + 'static) -> Self {
        self.reply_selector = Some(Box::new(selector));
        self
    }

    pub fn on_send(mut self, job: impl Job) -> Self {
        self.callbacks.on_send = Some(Box::new(job));
        self
    }

    pub fn on_send_failed(mut self, job: impl Job) -> Self {
        self.callbacks.on_send_failed = Some(Box::new(job));
        self
    }

    pub fn on_reply(mut self, job: impl ReplyJob) -> Self {
        self.callbacks.on_reply = Some(Box::new(job));
        self
    }

    pub fn on_reply_failed(mut self, job: impl Job) -> Self {
        self.callbacks.on_reply_failed = Some(Box::new(job));
        self
    }
}

/// Garlic dispatch service.
pub struct GarlicDispatcher {
    queue: Arc<JobQueue>,
    cipher: Arc<dyn GarlicCipher>,
    outbound: Arc<dyn OutboundDispatchQueue>,
    sessions: SessionStore,
    settings: DispatchSettings,
}

impl GarlicDispatcher {
    pub fn new(
        queue: Arc<JobQueue>,
        cipher: Arc<dyn GarlicCipher>,
        outbound: Arc<dyn OutboundDispatchQueue>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            queue,
            cipher,
            outbound,
            sessions: SessionStore::new(settings.initial_session_tags),
            settings,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }
}

impl GarlicDispatchApi for GarlicDispatcher {
    fn dispatch(&self, request: DispatchRequest) -> Result<JobId, DispatchError> {
        if self.queue.is_stopped() {
            return Err(DispatchError::QueueStopped);
        }

        let DispatchRequest {
            config,
            session,
            timeout_ms,
            priority,
            reply_selector,
            callbacks,
        } = request;

        let session =
            session.unwrap_or_else(|| self.sessions.slot_for(&config.target().peer_hash()));
        let params = SendParams {
            priority: priority.unwrap_or(self.settings.default_priority),
            reply_selector,
            reply_timeout_ms: timeout_ms.unwrap_or(self.settings.default_reply_timeout_ms),
            clock_skew_ms: self.settings.clock_skew_tolerance_ms,
            callbacks,
        };
        let cloves = config.cloves().len();
        let job = BuildGarlicJob::new(
            config,
            session,
            Arc::clone(&self.cipher),
            Arc::clone(&self.outbound),
            self.settings.slow_build_threshold_ms,
            params,
        );

        let id = self.queue.submit(Box::new(job));
        debug!(job_id = %id, cloves, "[gr-02] Garlic dispatch queued");
        Ok(id)
    }
}
