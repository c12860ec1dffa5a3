//! # Error Types
//!
//! Errors raised while signing, validating or encoding router records.

use thiserror::Error;

/// Errors related to router identity records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record has no signature (or was modified after signing).
    #[error("Router info is not signed")]
    Unsigned,

    /// The signing key does not belong to the record's identity.
    #[error("Signing key does not match the identity's public signing key")]
    SigningKeyMismatch,

    /// The stored signature does not validate.
    #[error("Router info signature is invalid")]
    InvalidSignature,

    /// Encoding or decoding failed.
    #[error("Router info encoding error: {0}")]
    Encoding(String),

    /// Unsupported record format version.
    #[error("Unsupported router info version: {0}")]
    UnsupportedVersion(u8),
}

impl From<bincode::Error> for RecordError {
    fn from(e: bincode::Error) -> Self {
        RecordError::Encoding(e.to_string())
    }
}
