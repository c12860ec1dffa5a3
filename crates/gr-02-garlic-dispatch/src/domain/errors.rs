//! Error types for garlic dispatch

use shared_crypto::CryptoError;
use thiserror::Error;

/// Errors returned synchronously by the dispatch API.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Neither a recipient identity nor a recipient public key was given.
    #[error("Garlic config has no recipient or recipient public key")]
    MissingRecipient,

    /// No expiration was set on the garlic config.
    #[error("Garlic config has no expiration")]
    MissingExpiration,

    /// The job queue is shutting down.
    #[error("Job queue is stopped")]
    QueueStopped,
}

/// Errors raised by a [`GarlicCipher`](crate::GarlicCipher).
#[derive(Debug, Error)]
pub enum CipherError {
    /// Clove encoding failed.
    #[error("Failed to encode cloves: {0}")]
    Encoding(String),

    /// Symmetric sealing failed.
    #[error("Encryption failed: {0}")]
    Crypto(#[from] CryptoError),

    /// The cipher panicked mid-build.
    #[error("Cipher panicked: {0}")]
    Panicked(String),
}

impl From<bincode::Error> for CipherError {
    fn from(e: bincode::Error) -> Self {
        Self::Encoding(e.to_string())
    }
}
