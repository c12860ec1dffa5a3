//! Crypto error types.

use thiserror::Error;

/// Failures of the router's cryptographic primitives.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// AEAD sealing failed
    #[error("Seal failed: {0}")]
    Seal(String),

    /// Wrong key or tampered payload
    #[error("Open failed: {0}")]
    Open(String),

    /// Sealed payload shorter than its nonce prefix
    #[error("Sealed payload truncated: {len} bytes")]
    TruncatedPayload {
        /// Length of the payload that was supplied
        len: usize,
    },

    /// Key bytes of the wrong size
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Bytes do not encode a curve point
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Signature does not match the message and key
    #[error("Signature verification failed")]
    SignatureVerificationFailed,
}
