//! In-memory outbound message pool.
//!
//! Holds envelopes in priority order until a transport takes them, then
//! tracks the ones waiting for a reply. All callbacks are fired through the
//! job queue, never inline.

use crate::domain::entities::InboundMessage;
use crate::domain::envelope::{AwaitingReply, OutboundEnvelope};
use crate::ports::outbound::OutboundDispatchQueue;
use gr_01_job_queue::JobSubmitter;
use parking_lot::Mutex;
use shared_types::Timestamp;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

type PendingKey = (Reverse<i32>, u64);

pub struct OutboundMessagePool {
    submitter: Arc<dyn JobSubmitter>,
    pending: Mutex<BTreeMap<PendingKey, OutboundEnvelope>>,
    awaiting: Mutex<Vec<AwaitingReply>>,
    seq: AtomicU64,
}

impl OutboundMessagePool {
    pub fn new(submitter: Arc<dyn JobSubmitter>) -> Self {
        Self {
            submitter,
            pending: Mutex::new(BTreeMap::new()),
            awaiting: Mutex::new(Vec::new()),
            seq: AtomicU64::new(0),
        }
    }

    /// Highest-priority envelope, oldest first among equals.
    pub fn take_next(&self) -> Option<OutboundEnvelope> {
        self.pending.lock().pop_first().map(|(_, envelope)| envelope)
    }

    /// Record a successful transmission.
    pub fn mark_sent(&self, envelope: OutboundEnvelope) {
        if let Some(awaiting) = envelope.sent(self.submitter.as_ref()) {
            self.awaiting.lock().push(awaiting);
        }
    }

    /// Record a failed transmission.
    pub fn mark_failed(&self, envelope: OutboundEnvelope) {
        envelope.send_failed(self.submitter.as_ref());
    }

    /// Offer an inbound message to the envelopes awaiting a reply. The
    /// first match, in send order, consumes it.
    pub fn deliver_reply(&self, message: InboundMessage) -> bool {
        let matched = {
            let mut awaiting = self.awaiting.lock();
            awaiting
                .iter()
                .position(|a| a.is_match(&message))
                .map(|index| awaiting.remove(index))
        };
        match matched {
            Some(awaiting) => {
                debug!(message_id = awaiting.message_id(), reply_id = message.id, "[gr-02] Reply matched");
                awaiting.reply(message, self.submitter.as_ref());
                true
            }
            None => false,
        }
    }

    /// Fail every envelope whose expiration or reply deadline has passed.
    /// Returns the number resolved.
    pub fn expire(&self, now: Timestamp) -> usize {
        let expired: Vec<OutboundEnvelope> = {
            let mut pending = self.pending.lock();
            let keys: Vec<PendingKey> = pending
                .iter()
                .filter(|(_, e)| e.expiration() < now)
                .map(|(k, _)| *k)
                .collect();
            keys.iter().filter_map(|k| pending.remove(k)).collect()
        };
        let timed_out: Vec<AwaitingReply> = {
            let mut awaiting = self.awaiting.lock();
            let (late, waiting): (Vec<_>, Vec<_>) =
                awaiting.drain(..).partition(|a| a.deadline() < now);
            *awaiting = waiting;
            late
        };

        let count = expired.len() + timed_out.len();
        for envelope in expired {
            envelope.send_failed(self.submitter.as_ref());
        }
        for awaiting in timed_out {
            awaiting.reply_failed(self.submitter.as_ref());
        }
        if count > 0 {
            info!(count, "[gr-02] Expired outbound envelopes");
        }
        count
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn awaiting_reply(&self) -> usize {
        self.awaiting.lock().len()
    }
}

impl OutboundDispatchQueue for OutboundMessagePool {
    fn add(&self, envelope: OutboundEnvelope) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.pending
            .lock()
            .insert((Reverse(envelope.priority()), seq), envelope);
    }
}
