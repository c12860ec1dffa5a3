//! In-memory peer database.

use crate::adapters::ports::{PeerDatabaseError, PeerDatabaseFacade};
use parking_lot::RwLock;
use shared_types::{Hash, RouterInfo};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Peer records keyed by identity hash.
#[derive(Default)]
pub struct InMemoryPeerDatabase {
    running: AtomicBool,
    peers: RwLock<HashMap<Hash, Arc<RouterInfo>>>,
}

impl InMemoryPeerDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a verified record. Unsigned or tampered records are dropped.
    pub fn store(&self, info: Arc<RouterInfo>) -> bool {
        if !info.is_valid() {
            return false;
        }
        self.peers.write().insert(info.identity().hash(), info);
        true
    }

    pub fn lookup(&self, hash: &Hash) -> Option<Arc<RouterInfo>> {
        self.peers.read().get(hash).cloned()
    }

    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }
}

impl PeerDatabaseFacade for InMemoryPeerDatabase {
    fn startup(&self) -> Result<(), PeerDatabaseError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!(peers = self.len(), "[boot] Peer database started");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
