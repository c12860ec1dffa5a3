//! # Garlic Dispatch Flows
//!
//! Router A sends a garlic message to router B's published identity:
//!
//! ```text
//! dispatch → Build job → Send job → OutboundMessagePool → OutboundPump → Transport
//!                                            │
//!                      reply / timeout ──────┘
//! ```

#[cfg(test)]
mod tests {
    use super::super::fixtures::{EventLog, Mark, TestRouter, GENESIS_MS};
    use async_trait::async_trait;
    use gr_01_job_queue::{Clock, Job};
    use gr_02_garlic_dispatch::{
        Clove, DispatchRequest, DispatchTarget, GarlicConfig, GarlicDispatchApi, GarlicMessage,
        InboundMessage, ReplyJob, SealedGarlicCipher,
    };
    use gr_03_router_identity::RouterIdentityApi;
    use parking_lot::Mutex;
    use router_runtime::adapters::{OutboundPump, Transport, TransportError};
    use shared_types::RouterInfo;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Transport that records every message, or refuses all of them.
    #[derive(Default)]
    struct CapturingTransport {
        sent: Mutex<Vec<GarlicMessage>>,
        refuse: bool,
    }

    #[async_trait]
    impl Transport for CapturingTransport {
        async fn transmit(
            &self,
            _target: &DispatchTarget,
            message: &GarlicMessage,
        ) -> Result<(), TransportError> {
            if self.refuse {
                return Err(TransportError::Closed);
            }
            self.sent.lock().push(message.clone());
            Ok(())
        }
    }

    struct RecordReply(EventLog);

    impl ReplyJob for RecordReply {
        fn with_reply(self: Box<Self>, reply: InboundMessage) -> Box<dyn Job> {
            let label = format!("reply:{}", String::from_utf8_lossy(&reply.payload));
            Box::new(Mark::new(&label, &self.0))
        }
    }

    struct Pair {
        _dirs: (TempDir, TempDir),
        alice: TestRouter,
        bob: Arc<RouterInfo>,
    }

    fn pair() -> Pair {
        let (a, b) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let alice = TestRouter::new(a.path());
        alice.boot();
        let bob_router = TestRouter::new(b.path());
        bob_router.boot();
        let bob = bob_router.container.identity.active().unwrap();
        Pair {
            _dirs: (a, b),
            alice,
            bob,
        }
    }

    fn request(bob: &RouterInfo, log: &EventLog) -> DispatchRequest {
        let config = GarlicConfig::builder()
            .recipient(bob.clone())
            .clove(Clove::new(1, b"hello bob".to_vec()))
            .expiration(GENESIS_MS + 30_000)
            .build()
            .unwrap();
        DispatchRequest::new(config)
            .timeout(5_000)
            .reply_selector(|m: &InboundMessage| m.payload == b"ack".to_vec())
            .on_send(Mark::new("sent", log))
            .on_send_failed(Mark::new("send_failed", log))
            .on_reply(RecordReply(Arc::clone(log)))
            .on_reply_failed(Mark::new("reply_failed", log))
    }

    fn pump(router: &TestRouter, transport: Arc<CapturingTransport>) -> OutboundPump {
        let c = &router.container;
        OutboundPump::new(Arc::clone(&c.outbound), transport, Arc::clone(&c.clock))
    }

    #[tokio::test]
    async fn test_message_reaches_transport_and_reply_completes() {
        let Pair { _dirs, alice, bob } = pair();
        let log = EventLog::default();
        let transport = Arc::new(CapturingTransport::default());

        alice.container.dispatcher.dispatch(request(&bob, &log)).unwrap();
        alice.container.queue.run_ready();
        assert_eq!(alice.container.outbound.len(), 1);

        assert_eq!(pump(&alice, transport.clone()).pump_once().await, 1);
        alice.container.queue.run_ready();
        assert_eq!(*log.lock(), vec!["sent"]);
        assert_eq!(alice.container.outbound.awaiting_reply(), 1);

        // bob can open it with the session alice used for him
        let slot = alice
            .container
            .dispatcher
            .sessions()
            .slot_for(&bob.identity().hash());
        let material = slot.checkout().unwrap();
        let message = transport.sent.lock()[0].clone();
        let payload = SealedGarlicCipher::open_message(&material.key, &message).unwrap();
        slot.release(material);
        assert_eq!(payload.cloves, vec![Clove::new(1, b"hello bob".to_vec())]);
        assert_eq!(payload.expiration, GENESIS_MS + 30_000);

        let ignored = InboundMessage {
            id: 7,
            received_at: alice.clock.now(),
            payload: b"noise".to_vec(),
        };
        assert!(!alice.container.outbound.deliver_reply(ignored));
        let ack = InboundMessage {
            id: 8,
            received_at: alice.clock.now(),
            payload: b"ack".to_vec(),
        };
        assert!(alice.container.outbound.deliver_reply(ack));
        alice.container.queue.run_ready();

        assert_eq!(*log.lock(), vec!["sent", "reply:ack"]);
        assert_eq!(alice.container.outbound.awaiting_reply(), 0);
    }

    #[tokio::test]
    async fn test_refused_transmission_fires_send_failed_once() {
        let Pair { _dirs, alice, bob } = pair();
        let log = EventLog::default();
        let transport = Arc::new(CapturingTransport {
            refuse: true,
            ..Default::default()
        });

        alice.container.dispatcher.dispatch(request(&bob, &log)).unwrap();
        alice.container.queue.run_ready();
        assert_eq!(pump(&alice, transport).pump_once().await, 0);
        alice.container.queue.run_ready();

        assert_eq!(*log.lock(), vec!["send_failed"]);
        assert!(alice.container.outbound.is_empty());
        assert_eq!(alice.container.outbound.awaiting_reply(), 0);
    }

    #[tokio::test]
    async fn test_unanswered_message_times_out() {
        let Pair { _dirs, alice, bob } = pair();
        let log = EventLog::default();
        let transport = Arc::new(CapturingTransport::default());
        let pump = pump(&alice, transport);

        alice.container.dispatcher.dispatch(request(&bob, &log)).unwrap();
        alice.container.queue.run_ready();
        pump.pump_once().await;
        alice.container.queue.run_ready();

        alice.clock.advance(5_001);
        pump.pump_once().await;
        alice.container.queue.run_ready();

        assert_eq!(*log.lock(), vec!["sent", "reply_failed"]);
        assert_eq!(alice.container.outbound.awaiting_reply(), 0);
    }

    #[tokio::test]
    async fn test_stale_envelope_expires_before_transmission() {
        let Pair { _dirs, alice, bob } = pair();
        let log = EventLog::default();
        let transport = Arc::new(CapturingTransport::default());

        alice.container.dispatcher.dispatch(request(&bob, &log)).unwrap();
        alice.container.queue.run_ready();

        // message expiration plus the clock-skew tolerance
        alice.clock.advance(30_000 + 60_000 + 1);
        assert_eq!(pump(&alice, transport.clone()).pump_once().await, 0);
        alice.container.queue.run_ready();

        assert_eq!(*log.lock(), vec!["send_failed"]);
        assert!(transport.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_messages_to_one_peer_share_session() {
        let Pair { _dirs, alice, bob } = pair();
        let log = EventLog::default();
        let transport = Arc::new(CapturingTransport::default());

        for _ in 0..3 {
            alice.container.dispatcher.dispatch(request(&bob, &log)).unwrap();
        }
        alice.container.queue.run_ready();
        assert_eq!(pump(&alice, transport.clone()).pump_once().await, 3);

        let sessions = alice.container.dispatcher.sessions();
        assert_eq!(sessions.len(), 1);
        let slot = sessions.slot_for(&bob.identity().hash());
        let material = slot.checkout().unwrap();
        for message in transport.sent.lock().iter() {
            assert!(SealedGarlicCipher::open_message(&material.key, message).is_ok());
        }
        slot.release(material);
    }
}
