//! Collaborator ports owned by the composition root.

use async_trait::async_trait;
use gr_02_garlic_dispatch::{DispatchTarget, GarlicMessage};
use thiserror::Error;

/// Peer database errors.
#[derive(Debug, Error)]
pub enum PeerDatabaseError {
    #[error("Peer database unavailable: {0}")]
    Unavailable(String),
}

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("No route to peer {0}")]
    NoRoute(String),

    #[error("Transport closed")]
    Closed,
}

/// The peer database as seen by the boot sequence.
pub trait PeerDatabaseFacade: Send + Sync {
    /// Bring the database up. Called once, synchronously, during boot.
    fn startup(&self) -> Result<(), PeerDatabaseError>;

    fn is_running(&self) -> bool;
}

/// Wire transport fed from the outbound pool.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn transmit(
        &self,
        target: &DispatchTarget,
        message: &GarlicMessage,
    ) -> Result<(), TransportError>;
}
