//! Default garlic cipher.
//!
//! Cloves are encoded with bincode and sealed with XChaCha20-Poly1305 under
//! the session key. Each message consumes one session tag. When the set
//! falls below `low_water_mark`, a batch of fresh tags is added to the set
//! and delivered inside the sealed payload so the peer can use them.

use crate::domain::entities::{Clove, GarlicConfig, GarlicMessage};
use crate::domain::errors::CipherError;
use crate::ports::outbound::GarlicCipher;
use serde::{Deserialize, Serialize};
use shared_crypto::{open, seal, SessionKey, SessionTag};
use shared_types::Timestamp;
use std::collections::BTreeSet;
use tracing::debug;

/// Plaintext layout inside the sealed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarlicPayload {
    pub expiration: Timestamp,
    pub cloves: Vec<Clove>,
    pub new_tags: Vec<SessionTag>,
}

#[derive(Debug, Clone)]
pub struct SealedGarlicCipher {
    low_water_mark: usize,
    replenish_batch: usize,
}

impl Default for SealedGarlicCipher {
    fn default() -> Self {
        Self {
            low_water_mark: 10,
            replenish_batch: 40,
        }
    }
}

impl SealedGarlicCipher {
    pub fn new(low_water_mark: usize, replenish_batch: usize) -> Self {
        Self {
            low_water_mark,
            replenish_batch,
        }
    }

    /// Decrypt a message built by this cipher.
    pub fn open_message(
        key: &SessionKey,
        message: &GarlicMessage,
    ) -> Result<GarlicPayload, CipherError> {
        let plaintext = open(&key.to_secret_key(), &message.payload)?;
        Ok(bincode::deserialize(&plaintext)?)
    }
}

impl GarlicCipher for SealedGarlicCipher {
    fn build(
        &self,
        config: &GarlicConfig,
        key: &SessionKey,
        tags: &mut BTreeSet<SessionTag>,
    ) -> Result<GarlicMessage, CipherError> {
        let tag = tags.pop_first();

        let mut new_tags = Vec::new();
        if tags.len() < self.low_water_mark {
            new_tags = (0..self.replenish_batch)
                .map(|_| SessionTag::generate())
                .collect();
        }

        let payload = GarlicPayload {
            expiration: config.expiration(),
            cloves: config.cloves().to_vec(),
            new_tags,
        };
        let plaintext = bincode::serialize(&payload)?;
        let sealed = seal(&key.to_secret_key(), &plaintext)?;

        // Only commit the new tags once the message that carries them exists
        let added = payload.new_tags.len();
        tags.extend(payload.new_tags);
        debug!(
            consumed = tag.is_some(),
            added,
            remaining = tags.len(),
            "[gr-02] Session tags updated"
        );

        Ok(GarlicMessage {
            id: rand::random(),
            expiration: config.expiration(),
            tag,
            payload: sealed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SessionKeyMaterial;
    use shared_crypto::EncryptionKeyPair;

    fn config() -> GarlicConfig {
        GarlicConfig::builder()
            .recipient_public_key(EncryptionKeyPair::generate().public_key())
            .clove(Clove::new(1, b"hello".to_vec()))
            .clove(Clove::new(2, b"world".to_vec()))
            .expiration(90_000)
            .build()
            .unwrap()
    }

    #[test]
    fn test_consumes_one_tag() {
        let cipher = SealedGarlicCipher::new(2, 5);
        let mut material = SessionKeyMaterial::generate(20);
        let first = *material.tags.iter().next().unwrap();

        let message = cipher.build(&config(), &material.key, &mut material.tags).unwrap();

        assert_eq!(message.tag, Some(first));
        assert_eq!(material.tags.len(), 19);
        assert!(!material.tags.contains(&first));
        assert_eq!(message.expiration, 90_000);
    }

    #[test]
    fn test_replenishes_below_low_water_mark() {
        let cipher = SealedGarlicCipher::new(10, 40);
        let mut material = SessionKeyMaterial::generate(5);

        let message = cipher.build(&config(), &material.key, &mut material.tags).unwrap();
        assert_eq!(material.tags.len(), 4 + 40);

        let payload = SealedGarlicCipher::open_message(&material.key, &message).unwrap();
        assert_eq!(payload.new_tags.len(), 40);
        assert!(payload.new_tags.iter().all(|t| material.tags.contains(t)));
    }

    #[test]
    fn test_empty_tag_set_still_builds() {
        let cipher = SealedGarlicCipher::default();
        let mut material = SessionKeyMaterial::generate(0);

        let message = cipher.build(&config(), &material.key, &mut material.tags).unwrap();
        assert!(message.tag.is_none());
        assert_eq!(material.tags.len(), 40);
    }

    #[test]
    fn test_payload_round_trip() {
        let cipher = SealedGarlicCipher::default();
        let mut material = SessionKeyMaterial::generate(50);
        let config = config();

        let message = cipher.build(&config, &material.key, &mut material.tags).unwrap();
        let payload = SealedGarlicCipher::open_message(&material.key, &message).unwrap();

        assert_eq!(payload.cloves, config.cloves());
        assert!(payload.new_tags.is_empty());
    }

    #[test]
    fn test_wrong_key_fails_to_open() {
        let cipher = SealedGarlicCipher::default();
        let mut material = SessionKeyMaterial::generate(50);
        let message = cipher.build(&config(), &material.key, &mut material.tags).unwrap();

        let other = SessionKey::generate();
        assert!(SealedGarlicCipher::open_message(&other, &message).is_err());
    }
}
