//! Error types for the router identity

use shared_types::RecordError;
use std::path::PathBuf;
use thiserror::Error;

/// Faults reading or decoding the key file.
#[derive(Debug, Error)]
pub enum KeyFileError {
    /// The file ended before all four keys were read.
    #[error("Key file truncated while reading {field}: {actual} of {expected} bytes")]
    Truncated {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A public key does not belong to its private key.
    #[error("Key file {0} does not match its private key")]
    PublicKeyMismatch(&'static str),

    /// A stored public key is not a valid point.
    #[error("Key file holds an invalid {0}")]
    InvalidKey(&'static str),

    #[error("Key file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the identity service.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error(transparent)]
    KeyFile(#[from] KeyFileError),

    /// No signing key is loaded, or it does not match the identity.
    #[error("Failed to sign router info: {0}")]
    Signing(RecordError),

    /// The stored record could not be decoded or verified.
    #[error("Invalid router info: {0}")]
    Record(#[from] RecordError),

    /// Writing a file failed. The previous file, if any, is untouched.
    #[error("Failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Identity I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_display() {
        let err = KeyFileError::Truncated {
            field: "private encryption key",
            expected: 32,
            actual: 7,
        };
        assert_eq!(
            err.to_string(),
            "Key file truncated while reading private encryption key: 7 of 32 bytes"
        );
    }

    #[test]
    fn test_signing_display() {
        let err = IdentityError::Signing(RecordError::SigningKeyMismatch);
        assert!(err.to_string().starts_with("Failed to sign router info"));
    }
}
