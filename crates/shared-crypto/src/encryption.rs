//! # X25519 Encryption Keys
//!
//! The router's public encryption key is what garlic senders seal to.

use crate::CryptoError;
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey, StaticSecret};

/// Length of an encoded X25519 key.
pub const X25519_KEY_LENGTH: usize = 32;

/// X25519 public key (32 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncryptionPublicKey([u8; 32]);

impl EncryptionPublicKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking its length.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: X25519_KEY_LENGTH,
            actual: bytes.len(),
        })?;
        Ok(Self(array))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// X25519 static keypair.
#[derive(Clone)]
pub struct EncryptionKeyPair {
    secret: StaticSecret,
}

impl EncryptionKeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        Self {
            secret: StaticSecret::random_from_rng(rand::thread_rng()),
        }
    }

    /// Create from the 32-byte private scalar.
    pub fn from_private_bytes(bytes: [u8; 32]) -> Self {
        Self {
            secret: StaticSecret::from(bytes),
        }
    }

    /// Get public key.
    pub fn public_key(&self) -> EncryptionPublicKey {
        EncryptionPublicKey(PublicKey::from(&self.secret).to_bytes())
    }

    /// Get the private scalar (for serialization).
    pub fn private_bytes(&self) -> [u8; 32] {
        self.secret.to_bytes()
    }

    /// Diffie-Hellman with a peer public key.
    pub fn agree(&self, peer: &EncryptionPublicKey) -> [u8; 32] {
        self.secret
            .diffie_hellman(&PublicKey::from(*peer.as_bytes()))
            .to_bytes()
    }
}

impl std::fmt::Debug for EncryptionKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}
