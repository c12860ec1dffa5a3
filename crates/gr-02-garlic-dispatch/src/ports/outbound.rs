//! Outbound ports for garlic dispatch.

use crate::domain::entities::{GarlicConfig, GarlicMessage, InboundMessage};
use crate::domain::envelope::OutboundEnvelope;
use crate::domain::errors::CipherError;
use gr_01_job_queue::Job;
use shared_crypto::{SessionKey, SessionTag};
use std::collections::BTreeSet;

/// Garlic encryption primitive.
///
/// May consume and/or add session tags; the caller owns the tag set for
/// the duration of the call.
pub trait GarlicCipher: Send + Sync {
    fn build(
        &self,
        config: &GarlicConfig,
        key: &SessionKey,
        tags: &mut BTreeSet<SessionTag>,
    ) -> Result<GarlicMessage, CipherError>;
}

/// Accepts envelopes for eventual transmission. Takes ownership.
pub trait OutboundDispatchQueue: Send + Sync {
    fn add(&self, envelope: OutboundEnvelope);
}

/// Caller-supplied rule matching an inbound reply to its request.
pub trait ReplySelector: Send + Sync {
    fn is_match(&self, message: &InboundMessage) -> bool;
}

impl<F> ReplySelector for F
where
    F: Fn(&InboundMessage) -> bool + Send + Sync,
{
    fn is_match(&self, message: &InboundMessage) -> bool {
        self(message)
    }
}

/// Completion job that needs the matched reply before it can run.
pub trait ReplyJob: Send + 'static {
    fn with_reply(self: Box<Self>, reply: InboundMessage) -> Box<dyn Job>;
}
