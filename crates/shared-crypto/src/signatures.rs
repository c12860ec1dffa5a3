//! # Ed25519 Signatures
//!
//! A router signs its own record with the signing half of its identity;
//! peers check the record against the signing public key it advertises.

use crate::CryptoError;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

/// Length of an encoded Ed25519 public key or secret seed.
pub const ED25519_KEY_LENGTH: usize = 32;

/// Signing public key, checked to be a curve point on construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ed25519PublicKey([u8; ED25519_KEY_LENGTH]);

impl Ed25519PublicKey {
    /// Fails with [`CryptoError::InvalidPublicKey`] off the curve.
    pub fn from_bytes(bytes: [u8; ED25519_KEY_LENGTH]) -> Result<Self, CryptoError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; ED25519_KEY_LENGTH] {
        &self.0
    }

    /// Check `signature` over `message`.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CryptoError> {
        VerifyingKey::from_bytes(&self.0)
            .map_err(|_| CryptoError::InvalidPublicKey)?
            .verify(message, &Signature::from_bytes(&signature.0))
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// Detached 64-byte signature.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ed25519Signature(#[serde_as(as = "Bytes")] [u8; 64]);

/// Router signing key. The dalek key wipes itself on drop.
#[derive(Clone)]
pub struct Ed25519KeyPair(SigningKey);

impl Ed25519KeyPair {
    /// Fresh random key.
    pub fn generate() -> Self {
        Self(SigningKey::generate(&mut rand::thread_rng()))
    }

    /// Rebuild from the seed stored in the router key file.
    pub fn from_seed(seed: [u8; ED25519_KEY_LENGTH]) -> Self {
        Self(SigningKey::from_bytes(&seed))
    }

    /// Seed written to the router key file.
    pub fn to_seed(&self) -> [u8; ED25519_KEY_LENGTH] {
        self.0.to_bytes()
    }

    /// Public half.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.0.verifying_key().to_bytes())
    }

    /// Deterministic signature over `message`.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.0.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Ed25519KeyPair")
            .field(&self.public_key())
            .finish()
    }
}
