//! # Symmetric Sealing
//!
//! XChaCha20-Poly1305 under a 256-bit key. A sealed payload is
//! `nonce (24 bytes) || ciphertext`, so one byte string travels on the wire.

use crate::CryptoError;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    Key, XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use zeroize::Zeroize;

/// Length of the nonce prefix written by [`seal`].
pub const NONCE_LENGTH: usize = 24;

/// 256-bit sealing key, wiped on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new(Key::from_slice(&self.0))
    }
}

/// Seal `plaintext` under a fresh random nonce.
pub fn seal(key: &SecretKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut nonce = [0u8; NONCE_LENGTH];
    rand::thread_rng().fill_bytes(&mut nonce);

    let ciphertext = key
        .cipher()
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Seal(e.to_string()))?;

    let mut sealed = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Reverse of [`seal`]. Fails on a wrong key or any tampering.
pub fn open(key: &SecretKey, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if sealed.len() < NONCE_LENGTH {
        return Err(CryptoError::TruncatedPayload { len: sealed.len() });
    }
    let (nonce, ciphertext) = sealed.split_at(NONCE_LENGTH);
    key.cipher()
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|e| CryptoError::Open(e.to_string()))
}
