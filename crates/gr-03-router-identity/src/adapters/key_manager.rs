//! In-memory key manager.

use crate::domain::keys::RouterKeys;
use crate::ports::outbound::IdentityStore;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Default)]
pub struct KeyManager {
    keys: RwLock<Option<Arc<RouterKeys>>>,
}

impl KeyManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: RouterKeys) -> Self {
        Self {
            keys: RwLock::new(Some(Arc::new(keys))),
        }
    }
}

impl IdentityStore for KeyManager {
    fn keys(&self) -> Option<Arc<RouterKeys>> {
        self.keys.read().clone()
    }

    fn install(&self, keys: RouterKeys) {
        *self.keys.write() = Some(Arc::new(keys));
    }
}
