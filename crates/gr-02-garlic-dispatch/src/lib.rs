//! # Garlic Dispatch Subsystem
//!
//! **Subsystem ID:** gr-02
//!
//! ## Purpose
//!
//! Builds an encrypted garlic message for a peer and hands the resulting
//! outbound envelope to the transport layer. Dispatch is split into two
//! chained jobs on the gr-01 queue so the build never stalls other work:
//!
//! ```text
//! dispatch() ──submit──→ [Build Garlic Message] ──submit──→ [Send Built Garlic Message]
//!                              │                                   │
//!                   checkout session slot                 OutboundEnvelope
//!                   GarlicCipher::build                   OutboundDispatchQueue::add
//!                   release slot (wake waiter)
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Config has a recipient or recipient key | `GarlicConfigBuilder::build()` |
//! | One envelope per successful dispatch | `SendGarlicJob::run()` |
//! | Envelope expiration = message expiration + clock skew | `OutboundEnvelope::new()` |
//! | At most one exchange holds a peer's session tags | `SessionSlot::checkout_or_park()` |
//! | Exactly one terminal callback per envelope | `OutboundEnvelope` / `AwaitingReply` type-state |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose | Default adapter |
//! |-------|---------|-----------------|
//! | `GarlicCipher` | Encrypt cloves under a session key | `SealedGarlicCipher` |
//! | `OutboundDispatchQueue` | Accept envelopes for transmission | `OutboundMessagePool` |

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub use adapters::cipher::SealedGarlicCipher;
pub use adapters::pool::OutboundMessagePool;
pub use application::jobs::{BuildGarlicJob, SendGarlicJob, BUILD_JOB_NAME, SEND_JOB_NAME};
pub use application::service::{DispatchRequest, DispatchSettings, GarlicDispatcher};
pub use domain::entities::{Clove, DispatchTarget, GarlicConfig, GarlicConfigBuilder, GarlicMessage, InboundMessage};
pub use domain::envelope::{AwaitingReply, EnvelopeCallbacks, OutboundEnvelope};
pub use domain::errors::{CipherError, DispatchError};
pub use domain::session::{SessionKeyMaterial, SessionSlot, SessionStore};
pub use ports::inbound::GarlicDispatchApi;
pub use ports::outbound::{GarlicCipher, OutboundDispatchQueue, ReplyJob, ReplySelector};
