//! Outbound ports for the router identity.

use crate::domain::errors::{IdentityError, KeyFileError};
use crate::domain::keys::RouterKeys;
use shared_types::RouterAddress;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Holder of the router's private keys in memory.
pub trait IdentityStore: Send + Sync {
    /// Currently loaded keys, if any.
    fn keys(&self) -> Option<Arc<RouterKeys>>;

    /// Replace the loaded keys.
    fn install(&self, keys: RouterKeys);
}

/// Persistent copy of the router keys.
pub trait KeyFileSource: Send + Sync {
    fn exists(&self) -> bool;

    fn read(&self) -> Result<RouterKeys, KeyFileError>;

    /// Replace the file atomically.
    fn write(&self, keys: &RouterKeys) -> Result<(), IdentityError>;

    /// Delete the file. `Ok(false)` if it was already gone.
    fn remove(&self) -> Result<bool, IdentityError>;
}

/// Transport-side discovery of the addresses the router is reachable at.
pub trait AddressSource: Send + Sync {
    fn addresses(&self) -> Vec<RouterAddress>;
}

/// Statistics published as options of the identity record.
pub trait StatisticsSource: Send + Sync {
    fn published_options(&self) -> BTreeMap<String, String>;
}
