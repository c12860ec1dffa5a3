//! # Shared Crypto - Router Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `symmetric` | XChaCha20-Poly1305 | Garlic sealing under a session key |
//! | `hashing` | SHA-256 | Router identity hashes |
//! | `signatures` | Ed25519 | Router record signing |
//! | `encryption` | X25519 | Router encryption keys |
//! | `session` | random 256-bit | Session keys and single-use session tags |
//!
//! Secret key material is wiped on drop.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encryption;
pub mod errors;
pub mod hashing;
pub mod session;
pub mod signatures;
pub mod symmetric;

// Re-exports
pub use encryption::{EncryptionKeyPair, EncryptionPublicKey, X25519_KEY_LENGTH};
pub use errors::CryptoError;
pub use hashing::{sha256, Hash, Sha256Hasher};
pub use session::{SessionKey, SessionTag, SESSION_TAG_LENGTH};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature, ED25519_KEY_LENGTH};
pub use symmetric::{open, seal, SecretKey, NONCE_LENGTH};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
