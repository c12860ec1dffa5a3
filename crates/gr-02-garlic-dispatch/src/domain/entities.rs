//! Garlic dispatch entities.

use crate::domain::errors::DispatchError;
use serde::{Deserialize, Serialize};
use shared_crypto::{sha256, EncryptionPublicKey, SessionTag};
use shared_types::{Hash, RouterInfo, Timestamp};

/// One payload unit bundled inside a garlic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clove {
    pub id: u64,
    pub payload: Vec<u8>,
}

impl Clove {
    pub fn new(id: u64, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            payload: payload.into(),
        }
    }
}

/// Where an outbound envelope is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchTarget {
    /// Full identity record of the recipient.
    Router(Box<RouterInfo>),
    /// Bare encryption key of the recipient.
    PublicKey(EncryptionPublicKey),
}

impl DispatchTarget {
    /// Hash identifying the peer, used to key per-peer sessions.
    pub fn peer_hash(&self) -> Hash {
        match self {
            Self::Router(info) => info.identity().hash(),
            Self::PublicKey(key) => sha256(key.as_bytes()),
        }
    }

    pub fn encryption_key(&self) -> &EncryptionPublicKey {
        match self {
            Self::Router(info) => &info.identity().public_key,
            Self::PublicKey(key) => key,
        }
    }
}

/// What to build: recipient, cloves and the requested expiration.
///
/// Only constructible through [`GarlicConfigBuilder`], which rejects a
/// config with no recipient or no expiration.
#[derive(Debug, Clone)]
pub struct GarlicConfig {
    target: DispatchTarget,
    recipient_public_key: Option<EncryptionPublicKey>,
    cloves: Vec<Clove>,
    expiration: Timestamp,
}

impl GarlicConfig {
    pub fn builder() -> GarlicConfigBuilder {
        GarlicConfigBuilder::default()
    }

    pub fn recipient(&self) -> Option<&RouterInfo> {
        match &self.target {
            DispatchTarget::Router(info) => Some(info.as_ref()),
            DispatchTarget::PublicKey(_) => None,
        }
    }

    pub fn recipient_public_key(&self) -> Option<&EncryptionPublicKey> {
        self.recipient_public_key.as_ref()
    }

    pub fn cloves(&self) -> &[Clove] {
        &self.cloves
    }

    pub fn expiration(&self) -> Timestamp {
        self.expiration
    }

    /// The recipient identity when present, otherwise the bare key.
    pub fn target(&self) -> &DispatchTarget {
        &self.target
    }
}

/// Builder for [`GarlicConfig`].
#[derive(Debug, Default)]
pub struct GarlicConfigBuilder {
    recipient: Option<RouterInfo>,
    recipient_public_key: Option<EncryptionPublicKey>,
    cloves: Vec<Clove>,
    expiration: Option<Timestamp>,
}

impl GarlicConfigBuilder {
    pub fn recipient(mut self, info: RouterInfo) -> Self {
        self.recipient = Some(info);
        self
    }

    pub fn recipient_public_key(mut self, key: EncryptionPublicKey) -> Self {
        self.recipient_public_key = Some(key);
        self
    }

    pub fn clove(mut self, clove: Clove) -> Self {
        self.cloves.push(clove);
        self
    }

    pub fn cloves(mut self, cloves: impl IntoIterator<Item = Clove>) -> Self {
        self.cloves.extend(cloves);
        self
    }

    pub fn expiration(mut self, expiration: Timestamp) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn build(self) -> Result<GarlicConfig, DispatchError> {
        let target = match (self.recipient, self.recipient_public_key) {
            (Some(info), _) => DispatchTarget::Router(Box::new(info)),
            (None, Some(key)) => DispatchTarget::PublicKey(key),
            (None, None) => return Err(DispatchError::MissingRecipient),
        };
        let expiration = self.expiration.ok_or(DispatchError::MissingExpiration)?;
        Ok(GarlicConfig {
            target,
            recipient_public_key: self.recipient_public_key,
            cloves: self.cloves,
            expiration,
        })
    }
}

/// Output of a [`GarlicCipher`](crate::GarlicCipher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GarlicMessage {
    pub id: u64,
    pub expiration: Timestamp,
    /// Session tag consumed by this message, if the session had one left.
    pub tag: Option<SessionTag>,
    pub payload: Vec<u8>,
}

/// A message received from the network, offered to awaiting envelopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub id: u64,
    pub received_at: Timestamp,
    pub payload: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::{Ed25519KeyPair, EncryptionKeyPair};
    use shared_types::RouterIdentity;

    fn router_info() -> RouterInfo {
        RouterInfo::new(RouterIdentity::new(
            EncryptionKeyPair::generate().public_key(),
            Ed25519KeyPair::generate().public_key(),
        ))
    }

    #[test]
    fn test_missing_recipient_rejected() {
        let result = GarlicConfig::builder()
            .clove(Clove::new(1, b"data".to_vec()))
            .expiration(5_000)
            .build();
        assert!(matches!(result, Err(DispatchError::MissingRecipient)));
    }

    #[test]
    fn test_missing_expiration_rejected() {
        let result = GarlicConfig::builder()
            .recipient_public_key(EncryptionKeyPair::generate().public_key())
            .clove(Clove::new(1, b"data".to_vec()))
            .build();
        assert!(matches!(result, Err(DispatchError::MissingExpiration)));
    }

    #[test]
    fn test_recipient_preferred_over_public_key() {
        let info = router_info();
        let config = GarlicConfig::builder()
            .recipient(info.clone())
            .recipient_public_key(EncryptionKeyPair::generate().public_key())
            .expiration(5_000)
            .build()
            .unwrap();
        assert_eq!(config.target(), &DispatchTarget::Router(Box::new(info.clone())));
        assert_eq!(config.recipient(), Some(&info));
        assert!(config.recipient_public_key().is_some());
    }

    #[test]
    fn test_public_key_target() {
        let key = EncryptionKeyPair::generate().public_key();
        let config = GarlicConfig::builder()
            .recipient_public_key(key)
            .expiration(5_000)
            .build()
            .unwrap();
        let target = config.target();
        assert_eq!(target, &DispatchTarget::PublicKey(key));
        assert!(config.recipient().is_none());
        assert_eq!(target.peer_hash(), sha256(key.as_bytes()));
    }

    #[test]
    fn test_router_target_hash_matches_identity() {
        let info = router_info();
        let target = DispatchTarget::Router(Box::new(info.clone()));
        assert_eq!(target.peer_hash(), info.identity().hash());
        assert_eq!(target.encryption_key(), &info.identity().public_key);
    }
}
