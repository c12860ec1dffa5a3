//! Build and send phases of a garlic dispatch.
//!
//! The build job hands its result to the send job by value through the
//! queue; no state is shared between the two.

use crate::domain::entities::{DispatchTarget, GarlicConfig, GarlicMessage};
use crate::domain::envelope::{EnvelopeCallbacks, OutboundEnvelope};
use crate::domain::errors::CipherError;
use crate::domain::session::SessionSlot;
use crate::ports::outbound::{GarlicCipher, OutboundDispatchQueue, ReplySelector};
use gr_01_job_queue::{panic_reason, Job, JobContext, JobError, JobSubmitter};
use router_telemetry::{
    ENVELOPES_DISPATCHED, GARLIC_BUILD_DURATION, GARLIC_MESSAGES_BUILT, GARLIC_SLOW_BUILDS,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const BUILD_JOB_NAME: &str = "Build Garlic Message";
pub const SEND_JOB_NAME: &str = "Send Built Garlic Message";

/// Everything the send phase carries through unchanged.
pub struct SendParams {
    pub priority: i32,
    pub reply_selector: Option<Box<dyn ReplySelector>>,
    pub reply_timeout_ms: u64,
    pub clock_skew_ms: u64,
    pub callbacks: EnvelopeCallbacks,
}

/// Build phase: encrypt the cloves under the peer's session.
pub struct BuildGarlicJob {
    config: GarlicConfig,
    session: SessionSlot,
    cipher: Arc<dyn GarlicCipher>,
    outbound: Arc<dyn OutboundDispatchQueue>,
    slow_build_threshold_ms: u64,
    params: SendParams,
}

impl BuildGarlicJob {
    pub fn new(
        config: GarlicConfig,
        session: SessionSlot,
        cipher: Arc<dyn GarlicCipher>,
        outbound: Arc<dyn OutboundDispatchQueue>,
        slow_build_threshold_ms: u64,
        params: SendParams,
    ) -> Self {
        Self {
            config,
            session,
            cipher,
            outbound,
            slow_build_threshold_ms,
            params,
        }
    }
}

impl Job for BuildGarlicJob {
    fn name(&self) -> &str {
        BUILD_JOB_NAME
    }

    fn priority(&self) -> i32 {
        self.params.priority
    }

    fn run(self: Box<Self>, ctx: &JobContext) -> Result<(), JobError> {
        let session = self.session.clone();
        let Some((mut material, this)) = session.checkout_or_park(self) else {
            debug!(job = BUILD_JOB_NAME, "[gr-02] Session busy, build parked");
            return Ok(());
        };

        // The material goes back to the slot on every path, a panic included.
        let started = ctx.now();
        let built = catch_unwind(AssertUnwindSafe(|| {
            this.cipher
                .build(&this.config, &material.key, &mut material.tags)
        }))
        .unwrap_or_else(|panic| Err(CipherError::Panicked(panic_reason(&*panic))));
        let elapsed_ms = ctx.now().saturating_sub(started);

        if let Some(waiter) = session.release(material) {
            ctx.submit(waiter);
        }
        GARLIC_BUILD_DURATION.observe(elapsed_ms as f64 / 1_000.0);

        let this = *this;
        let message = match built {
            Ok(message) => message,
            Err(e) => {
                error!(job = BUILD_JOB_NAME, error = %e, "[gr-02] Garlic build failed");
                if let Some(job) = this.params.callbacks.on_send_failed {
                    ctx.submit(job);
                }
                return Err(JobError::failed(BUILD_JOB_NAME, e));
            }
        };

        GARLIC_MESSAGES_BUILT.inc();
        if elapsed_ms > this.slow_build_threshold_ms {
            GARLIC_SLOW_BUILDS.inc();
            warn!(
                job = BUILD_JOB_NAME,
                elapsed_ms,
                threshold_ms = this.slow_build_threshold_ms,
                "[gr-02] Slow garlic build"
            );
        }

        let send = SendGarlicJob {
            target: this.config.target().clone(),
            message,
            outbound: this.outbound,
            params: this.params,
        };
        ctx.submit(Box::new(send));
        Ok(())
    }
}

/// Send phase: wrap the built message in an envelope and queue it.
pub struct SendGarlicJob {
    target: DispatchTarget,
    message: GarlicMessage,
    outbound: Arc<dyn OutboundDispatchQueue>,
    params: SendParams,
}

impl Job for SendGarlicJob {
    fn name(&self) -> &str {
        SEND_JOB_NAME
    }

    fn priority(&self) -> i32 {
        self.params.priority
    }

    fn run(self: Box<Self>, _ctx: &JobContext) -> Result<(), JobError> {
        let Self {
            target,
            message,
            outbound,
            params,
        } = *self;
        let message_id = message.id;

        let envelope = OutboundEnvelope::new(
            target,
            message,
            params.clock_skew_ms,
            params.priority,
            params.reply_selector,
            params.reply_timeout_ms,
            params.callbacks,
        );
        info!(
            message_id,
            expiration = envelope.expiration(),
            priority = envelope.priority(),
            "[gr-02] Dispatching garlic envelope"
        );
        outbound.add(envelope);
        ENVELOPES_DISPATCHED.inc();
        Ok(())
    }
}
