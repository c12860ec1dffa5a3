//! # Session Keys and Tags
//!
//! A session key is shared with a peer once; afterwards each message carries
//! one single-use session tag so the peer can find the key without a fresh
//! key exchange.

use crate::symmetric::SecretKey;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Length of a session tag in bytes.
pub const SESSION_TAG_LENGTH: usize = 32;

/// Symmetric session key (256-bit).
#[derive(Clone, PartialEq, Eq, Zeroize, Serialize, Deserialize)]
#[zeroize(drop)]
pub struct SessionKey([u8; 32]);

impl SessionKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Generate random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// View as a symmetric cipher key.
    pub fn to_secret_key(&self) -> SecretKey {
        SecretKey::from_bytes(self.0)
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

/// Single-use session tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionTag([u8; SESSION_TAG_LENGTH]);

impl SessionTag {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; SESSION_TAG_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Generate a random tag.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_TAG_LENGTH];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; SESSION_TAG_LENGTH] {
        &self.0
    }
}
