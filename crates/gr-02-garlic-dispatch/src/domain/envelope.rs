//! Outbound envelope type-state.
//!
//! ```text
//! OutboundEnvelope ──send_failed()──→ on_send_failed            (terminal)
//!        │
//!        └──sent()──→ on_send ──(no selector)──→                 (terminal)
//!                        │
//!                        └──→ AwaitingReply ──reply()────────→ on_reply
//!                                           └─reply_failed()─→ on_reply_failed
//! ```
//!
//! Each transition consumes `self`, so at most one terminal callback fires.

use crate::domain::entities::{DispatchTarget, GarlicMessage, InboundMessage};
use crate::ports::outbound::{ReplyJob, ReplySelector};
use gr_01_job_queue::{Job, JobSubmitter};
use router_telemetry::ENVELOPE_OUTCOMES;
use shared_types::Timestamp;
use std::fmt;
use tracing::debug;

/// Completion callbacks carried unchanged from the dispatch call.
#[derive(Default)]
pub struct EnvelopeCallbacks {
    pub on_send: Option<Box<dyn Job>>,
    pub on_send_failed: Option<Box<dyn Job>>,
    pub on_reply: Option<Box<dyn ReplyJob>>,
    pub on_reply_failed: Option<Box<dyn Job>>,
}

impl fmt::Debug for EnvelopeCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopeCallbacks")
            .field("on_send", &self.on_send.as_ref().map(|j| j.name().to_string()))
            .field(
                "on_send_failed",
                &self.on_send_failed.as_ref().map(|j| j.name().to_string()),
            )
            .field("on_reply", &self.on_reply.is_some())
            .field(
                "on_reply_failed",
                &self.on_reply_failed.as_ref().map(|j| j.name().to_string()),
            )
            .finish()
    }
}

fn fire(submitter: &dyn JobSubmitter, job: Option<Box<dyn Job>>) {
    if let Some(job) = job {
        submitter.submit(job);
    }
}

/// A built garlic message addressed to a peer, not yet transmitted.
pub struct OutboundEnvelope {
    target: DispatchTarget,
    message: GarlicMessage,
    expiration: Timestamp,
    priority: i32,
    reply_selector: Option<Box<dyn ReplySelector>>,
    reply_timeout_ms: u64,
    callbacks: EnvelopeCallbacks,
}

impl OutboundEnvelope {
    /// Expiration is the message's own plus `clock_skew_ms`.
    pub fn new(
        target: DispatchTarget,
        message: GarlicMessage,
        clock_skew_ms: u64,
        priority: i32,
        reply_selector: Option<Box<dyn ReplySelector>>,
        reply_timeout_ms: u64,
        callbacks: EnvelopeCallbacks,
    ) -> Self {
        let expiration = message.expiration.saturating_add(clock_skew_ms);
        Self {
            target,
            message,
            expiration,
            priority,
            reply_selector,
            reply_timeout_ms,
            callbacks,
        }
    }

    pub fn target(&self) -> &DispatchTarget {
        &self.target
    }

    pub fn message(&self) -> &GarlicMessage {
        &self.message
    }

    pub fn expiration(&self) -> Timestamp {
        self.expiration
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn expects_reply(&self) -> bool {
        self.reply_selector.is_some()
    }

    pub fn reply_timeout_ms(&self) -> u64 {
        self.reply_timeout_ms
    }

    pub fn callbacks(&self) -> &EnvelopeCallbacks {
        &self.callbacks
    }

    /// Transmission failed or the envelope expired before it was sent.
    pub fn send_failed(self, submitter: &dyn JobSubmitter) {
        debug!(message_id = self.message.id, "[gr-02] Envelope send failed");
        ENVELOPE_OUTCOMES.with_label_values(&["send_failed"]).inc();
        fire(submitter, self.callbacks.on_send_failed);
    }

    /// Transmission succeeded. Returns the reply wait state when a reply
    /// selector was supplied.
    pub fn sent(self, submitter: &dyn JobSubmitter) -> Option<AwaitingReply> {
        let sent_at = submitter.now();
        ENVELOPE_OUTCOMES.with_label_values(&["sent"]).inc();
        fire(submitter, self.callbacks.on_send);

        let selector = self.reply_selector?;
        Some(AwaitingReply {
            message_id: self.message.id,
            selector,
            deadline: sent_at.saturating_add(self.reply_timeout_ms),
            on_reply: self.callbacks.on_reply,
            on_reply_failed: self.callbacks.on_reply_failed,
        })
    }
}

impl fmt::Debug for OutboundEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundEnvelope")
            .field("message_id", &self.message.id)
            .field("expiration", &self.expiration)
            .field("priority", &self.priority)
            .field("expects_reply", &self.reply_selector.is_some())
            .finish()
    }
}

/// A sent envelope waiting for its reply.
pub struct AwaitingReply {
    message_id: u64,
    selector: Box<dyn ReplySelector>,
    deadline: Timestamp,
    on_reply: Option<Box<dyn ReplyJob>>,
    on_reply_failed: Option<Box<dyn Job>>,
}

impl AwaitingReply {
    pub fn message_id(&self) -> u64 {
        self.message_id
    }

    pub fn deadline(&self) -> Timestamp {
        self.deadline
    }

    pub fn is_match(&self, message: &InboundMessage) -> bool {
        self.selector.is_match(message)
    }

    pub fn reply(self, message: InboundMessage, submitter: &dyn JobSubmitter) {
        ENVELOPE_OUTCOMES.with_label_values(&["reply"]).inc();
        if let Some(job) = self.on_reply {
            submitter.submit(job.with_reply(message));
        }
    }

    /// No matching reply arrived before the deadline.
    pub fn reply_failed(self, submitter: &dyn JobSubmitter) {
        debug!(message_id = self.message_id, "[gr-02] Reply timed out");
        ENVELOPE_OUTCOMES.with_label_values(&["reply_failed"]).inc();
        fire(submitter, self.on_reply_failed);
    }
}

impl fmt::Debug for AwaitingReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwaitingReply")
            .field("message_id", &self.message_id)
            .field("deadline", &self.deadline)
            .finish()
    }
}
