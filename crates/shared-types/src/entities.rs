//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Time**: `Timestamp` (milliseconds since the UNIX epoch)
//! - **Identity**: `Certificate`, `RouterIdentity`
//! - **Reachability**: `RouterAddress`

use serde::{Deserialize, Serialize};
use shared_crypto::{sha256, Ed25519PublicKey, EncryptionPublicKey};
use std::collections::BTreeMap;
use std::fmt;

pub use shared_crypto::Hash;

/// Milliseconds since the UNIX epoch.
pub type Timestamp = u64;

// =============================================================================
// IDENTITY
// =============================================================================

/// Certificate kinds attached to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CertificateType {
    /// No certificate payload.
    #[default]
    Null,
    /// Proof-of-work stamp.
    Hashcash,
    /// Identity is not published.
    Hidden,
}

/// Certificate attached to a router identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Certificate {
    /// Certificate type.
    pub cert_type: CertificateType,
    /// Type-specific payload (empty for `Null`).
    pub payload: Vec<u8>,
}

impl Certificate {
    /// The null certificate used by ordinary routers.
    pub fn null() -> Self {
        Self::default()
    }
}

/// Public half of a router's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterIdentity {
    /// Key that garlic senders encrypt to.
    pub public_key: EncryptionPublicKey,
    /// Key that verifies our published records.
    pub signing_public_key: Ed25519PublicKey,
    /// Attached certificate.
    pub certificate: Certificate,
}

impl RouterIdentity {
    /// Identity with a null certificate.
    pub fn new(public_key: EncryptionPublicKey, signing_public_key: Ed25519PublicKey) -> Self {
        Self {
            public_key,
            signing_public_key,
            certificate: Certificate::null(),
        }
    }

    /// SHA-256 over the encoded identity. This is the router's network address.
    pub fn hash(&self) -> Hash {
        let mut bytes = Vec::with_capacity(72);
        bytes.extend_from_slice(self.public_key.as_bytes());
        bytes.extend_from_slice(self.signing_public_key.as_bytes());
        bytes.push(self.certificate.cert_type as u8);
        bytes.extend_from_slice(&self.certificate.payload);
        sha256(&bytes)
    }

    /// Abbreviated hex hash for log lines.
    pub fn short_hash(&self) -> String {
        hex::encode(&self.hash()[..6])
    }
}

impl fmt::Display for RouterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[RouterIdentity {}]", self.short_hash())
    }
}

// =============================================================================
// REACHABILITY
// =============================================================================

/// A transport endpoint at which the router accepts connections.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouterAddress {
    /// Transport style, e.g. `NTCP`.
    pub transport: String,
    /// Relative cost; lower is preferred.
    pub cost: u8,
    /// Transport options such as `host` and `port`.
    pub options: BTreeMap<String, String>,
}

impl RouterAddress {
    /// Address for a host/port pair on the given transport.
    pub fn new(transport: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        let mut options = BTreeMap::new();
        options.insert("host".to_string(), host.into());
        options.insert("port".to_string(), port.to_string());
        Self {
            transport: transport.into(),
            cost: 10,
            options,
        }
    }
}
