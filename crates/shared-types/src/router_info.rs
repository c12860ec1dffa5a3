//! # Router Info
//!
//! The self-signed descriptor a router publishes about itself: identity,
//! reachable addresses, published options/statistics and a publication time.
//!
//! ## Invariants
//!
//! - A record is valid for publication only while it carries a signature
//!   that validates against `identity.signing_public_key`.
//! - Every setter drops the signature, so a record refreshed but not
//!   re-signed can never be encoded.

use crate::entities::{RouterAddress, RouterIdentity, Timestamp};
use crate::errors::RecordError;
use serde::{Deserialize, Serialize};
use shared_crypto::{Ed25519KeyPair, Ed25519Signature};
use std::collections::BTreeMap;
use std::fmt;

/// Leading byte of the encoded record.
pub const ROUTER_INFO_VERSION: u8 = 1;

/// Signed router descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterInfo {
    identity: RouterIdentity,
    addresses: Vec<RouterAddress>,
    options: BTreeMap<String, String>,
    published: Timestamp,
    signature: Option<Ed25519Signature>,
}

impl RouterInfo {
    /// Unsigned record for `identity` with no addresses or options.
    pub fn new(identity: RouterIdentity) -> Self {
        Self {
            identity,
            addresses: Vec::new(),
            options: BTreeMap::new(),
            published: 0,
            signature: None,
        }
    }

    pub fn identity(&self) -> &RouterIdentity {
        &self.identity
    }

    pub fn addresses(&self) -> &[RouterAddress] {
        &self.addresses
    }

    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    pub fn published(&self) -> Timestamp {
        self.published
    }

    pub fn signature(&self) -> Option<&Ed25519Signature> {
        self.signature.as_ref()
    }

    pub fn set_identity(&mut self, identity: RouterIdentity) {
        self.identity = identity;
        self.signature = None;
    }

    /// Addresses are kept sorted so the signed bytes do not depend on
    /// discovery order.
    pub fn set_addresses(&mut self, mut addresses: Vec<RouterAddress>) {
        addresses.sort();
        addresses.dedup();
        self.addresses = addresses;
        self.signature = None;
    }

    pub fn set_options(&mut self, options: BTreeMap<String, String>) {
        self.options = options;
        self.signature = None;
    }

    pub fn set_published(&mut self, published: Timestamp) {
        self.published = published;
        self.signature = None;
    }

    /// Bytes covered by the signature.
    pub fn signable_bytes(&self) -> Result<Vec<u8>, RecordError> {
        Ok(bincode::serialize(&(
            &self.identity,
            &self.addresses,
            &self.options,
            self.published,
        ))?)
    }

    /// Sign with the router's private signing key.
    ///
    /// # Errors
    ///
    /// `SigningKeyMismatch` if `key` does not belong to this identity.
    pub fn sign(&mut self, key: &Ed25519KeyPair) -> Result<(), RecordError> {
        if key.public_key() != self.identity.signing_public_key {
            return Err(RecordError::SigningKeyMismatch);
        }
        let bytes = self.signable_bytes()?;
        self.signature = Some(key.sign(&bytes));
        Ok(())
    }

    /// Check the signature against the identity's public signing key.
    pub fn verify_signature(&self) -> Result<(), RecordError> {
        let signature = self.signature.as_ref().ok_or(RecordError::Unsigned)?;
        let bytes = self.signable_bytes()?;
        self.identity
            .signing_public_key
            .verify(&bytes, signature)
            .map_err(|_| RecordError::InvalidSignature)
    }

    pub fn is_valid(&self) -> bool {
        self.verify_signature().is_ok()
    }

    /// Encode as `version || bincode(record)`. Unsigned records are refused.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RecordError> {
        if self.signature.is_none() {
            return Err(RecordError::Unsigned);
        }
        let body = bincode::serialize(self)?;
        let mut out = Vec::with_capacity(body.len() + 1);
        out.push(ROUTER_INFO_VERSION);
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Decode a record written by [`RouterInfo::to_bytes`]. The signature is
    /// not checked here; call [`RouterInfo::verify_signature`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        let (&version, body) = bytes
            .split_first()
            .ok_or_else(|| RecordError::Encoding("empty router info".to_string()))?;
        if version != ROUTER_INFO_VERSION {
            return Err(RecordError::UnsupportedVersion(version));
        }
        Ok(bincode::deserialize(body)?)
    }
}

impl fmt::Display for RouterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[RouterInfo {} published={} addresses={} options={} signed={}]",
            self.identity.short_hash(),
            self.published,
            self.addresses.len(),
            self.options.len(),
            self.signature.is_some()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shared_crypto::EncryptionKeyPair;

    fn signed_record(signing: &Ed25519KeyPair) -> RouterInfo {
        let identity =
            RouterIdentity::new(EncryptionKeyPair::generate().public_key(), signing.public_key());
        let mut info = RouterInfo::new(identity);
        info.set_addresses(vec![RouterAddress::new("NTCP", "10.0.0.1", 8887)]);
        info.set_published(1_700_000_000_000);
        info.sign(signing).unwrap();
        info
    }

    #[test]
    fn test_sign_and_verify() {
        let signing = Ed25519KeyPair::generate();
        let info = signed_record(&signing);
        assert!(info.verify_signature().is_ok());
        assert!(info.is_valid());
    }

    #[test]
    fn test_unsigned_record_is_invalid() {
        let signing = Ed25519KeyPair::generate();
        let mut info = signed_record(&signing);
        info.set_published(1);

        assert!(matches!(info.verify_signature(), Err(RecordError::Unsigned)));
        assert!(matches!(info.to_bytes(), Err(RecordError::Unsigned)));
    }

    #[test]
    fn test_foreign_key_cannot_sign() {
        let signing = Ed25519KeyPair::generate();
        let mut info = signed_record(&signing);
        let result = info.sign(&Ed25519KeyPair::generate());
        assert!(matches!(result, Err(RecordError::SigningKeyMismatch)));
    }

    #[test]
    fn test_tampered_bytes_fail_verification() {
        let signing = Ed25519KeyPair::generate();
        let info = signed_record(&signing);
        let mut decoded = RouterInfo::from_bytes(&info.to_bytes().unwrap()).unwrap();
        decoded.published += 1;
        // Bypass the setter so the old signature is kept
        assert!(matches!(
            decoded.verify_signature(),
            Err(RecordError::InvalidSignature)
        ));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let signing = Ed25519KeyPair::generate();
        let mut bytes = signed_record(&signing).to_bytes().unwrap();
        bytes[0] = 7;
        assert!(matches!(
            RouterInfo::from_bytes(&bytes),
            Err(RecordError::UnsupportedVersion(7))
        ));
        assert!(RouterInfo::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_address_order_does_not_affect_signature() {
        let signing = Ed25519KeyPair::generate();
        let mut a = signed_record(&signing);
        let mut b = a.clone();
        let x = RouterAddress::new("NTCP", "10.0.0.1", 1);
        let y = RouterAddress::new("NTCP", "10.0.0.2", 2);
        a.set_addresses(vec![x.clone(), y.clone()]);
        b.set_addresses(vec![y, x]);
        a.sign(&signing).unwrap();
        b.sign(&signing).unwrap();
        assert_eq!(a.signature(), b.signature());
    }

    proptest! {
        #[test]
        fn prop_signed_record_survives_encoding(
            options in proptest::collection::btree_map("[a-z.]{1,12}", "[ -~]{0,24}", 0..8),
            published in any::<u64>(),
        ) {
            let signing = Ed25519KeyPair::generate();
            let mut info = signed_record(&signing);
            info.set_options(options);
            info.set_published(published);
            info.sign(&signing).unwrap();

            let decoded = RouterInfo::from_bytes(&info.to_bytes().unwrap()).unwrap();
            prop_assert!(decoded.verify_signature().is_ok());
            prop_assert_eq!(decoded, info);
        }
    }
}
