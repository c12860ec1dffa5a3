//! Outbound pump between the message pool and a transport.

use crate::adapters::ports::{Transport, TransportError};
use async_trait::async_trait;
use gr_01_job_queue::Clock;
use gr_02_garlic_dispatch::{DispatchTarget, GarlicMessage, OutboundMessagePool};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Transport that logs each envelope and reports success.
#[derive(Debug, Default)]
pub struct LoggingTransport;

#[async_trait]
impl Transport for LoggingTransport {
    async fn transmit(
        &self,
        target: &DispatchTarget,
        message: &GarlicMessage,
    ) -> Result<(), TransportError> {
        debug!(
            message_id = message.id,
            peer = %hex::encode(&target.peer_hash()[..6]),
            bytes = message.payload.len(),
            "[gr-02] Transmitting message"
        );
        Ok(())
    }
}

/// Drains the pool into the transport and expires stale envelopes.
pub struct OutboundPump {
    pool: Arc<OutboundMessagePool>,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl OutboundPump {
    pub fn new(
        pool: Arc<OutboundMessagePool>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pool,
            transport,
            clock,
        }
    }

    /// Expire stale envelopes, then hand every pending one to the
    /// transport. Returns the number transmitted.
    pub async fn pump_once(&self) -> usize {
        self.pool.expire(self.clock.now());

        let mut sent = 0;
        while let Some(envelope) = self.pool.take_next() {
            let result = self
                .transport
                .transmit(envelope.target(), envelope.message())
                .await;
            match result {
                Ok(()) => {
                    self.pool.mark_sent(envelope);
                    sent += 1;
                }
                Err(e) => {
                    warn!(error = %e, "[gr-02] Transmission failed");
                    self.pool.mark_failed(envelope);
                }
            }
        }
        sent
    }

    /// Run until the shutdown channel flips to `true`.
    pub fn spawn(self, poll_ms: u64, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(poll_ms.max(1)));
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        self.pump_once().await;
                    }
                    _ = shutdown.changed() => {
                        info!("[gr-02] Outbound pump shutting down");
                        break;
                    }
                }
            }
        })
    }
}
