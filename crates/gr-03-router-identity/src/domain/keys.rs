//! Router key material and the key file layout.

use crate::domain::errors::KeyFileError;
use shared_crypto::{
    Ed25519KeyPair, Ed25519PublicKey, EncryptionKeyPair, EncryptionPublicKey, ED25519_KEY_LENGTH,
    X25519_KEY_LENGTH,
};
use shared_types::RouterIdentity;

/// Total key file size: four 32-byte fields.
pub const KEY_FILE_LENGTH: usize = 2 * X25519_KEY_LENGTH + 2 * ED25519_KEY_LENGTH;

/// The router's private encryption and signing keys.
#[derive(Clone, Debug)]
pub struct RouterKeys {
    pub encryption: EncryptionKeyPair,
    pub signing: Ed25519KeyPair,
}

impl RouterKeys {
    pub fn generate() -> Self {
        Self {
            encryption: EncryptionKeyPair::generate(),
            signing: Ed25519KeyPair::generate(),
        }
    }

    /// Identity with a null certificate for these keys.
    pub fn identity(&self) -> RouterIdentity {
        RouterIdentity::new(self.encryption.public_key(), self.signing.public_key())
    }

    /// Key file bytes: private enc, private sign, public enc, public sign.
    pub fn to_key_file(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(KEY_FILE_LENGTH);
        bytes.extend_from_slice(&self.encryption.private_bytes());
        bytes.extend_from_slice(&self.signing.to_seed());
        bytes.extend_from_slice(self.encryption.public_key().as_bytes());
        bytes.extend_from_slice(self.signing.public_key().as_bytes());
        bytes
    }

    /// Decode a key file, reading the four fields in their fixed order.
    ///
    /// A short read on any field fails the whole read. The stored public
    /// keys must match the ones derived from the private keys.
    pub fn from_key_file(bytes: &[u8]) -> Result<Self, KeyFileError> {
        let mut reader = FieldReader { bytes, offset: 0 };
        let private_enc = reader.read::<X25519_KEY_LENGTH>("private encryption key")?;
        let private_sign = reader.read::<ED25519_KEY_LENGTH>("private signing key")?;
        let public_enc = reader.read::<X25519_KEY_LENGTH>("public encryption key")?;
        let public_sign = reader.read::<ED25519_KEY_LENGTH>("public signing key")?;

        let encryption = EncryptionKeyPair::from_private_bytes(private_enc);
        let signing = Ed25519KeyPair::from_seed(private_sign);

        if encryption.public_key() != EncryptionPublicKey::from_bytes(public_enc) {
            return Err(KeyFileError::PublicKeyMismatch("public encryption key"));
        }
        let stored_sign = Ed25519PublicKey::from_bytes(public_sign)
            .map_err(|_| KeyFileError::InvalidKey("public signing key"))?;
        if signing.public_key() != stored_sign {
            return Err(KeyFileError::PublicKeyMismatch("public signing key"));
        }

        Ok(Self {
            encryption,
            signing,
        })
    }
}

struct FieldReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl FieldReader<'_> {
    fn read<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], KeyFileError> {
        let available = self.bytes.len().saturating_sub(self.offset);
        if available < N {
            return Err(KeyFileError::Truncated {
                field,
                expected: N,
                actual: available,
            });
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.offset..self.offset + N]);
        self.offset += N;
        Ok(out)
    }
}
