//! # Router Identity Subsystem
//!
//! **Subsystem ID:** gr-03
//!
//! ## Purpose
//!
//! Owns the router's own key material and signed identity record. Loads
//! them at boot, rebuilds and republishes the record on demand, and checks
//! periodically that both files are still on disk.
//!
//! ## Files
//!
//! | File | Default name | Contents |
//! |------|--------------|----------|
//! | Key file | `router.keys` | private enc, private sign, public enc, public sign |
//! | Identity record | `router.info` | version byte + encoded signed `RouterInfo` |
//! | Operator marker | `router.info.rebuild` | presence means "rebuild now" |
//!
//! ## Rebuild Outcomes
//!
//! ```text
//! key file present ──keys in memory──→ rewrite file if it disagrees ──┐
//!        │             │                                              ├─→ refresh ──→ sign ──→ persist ──→ activate
//!        │             └─none loaded──read ok──────────────────────────┘
//!        │                          └─read fault──→ delete key file, retry (bounded)
//!        │
//!        └─absent──→ new keys + new record ──→ persist both ──→ activate
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Record is signed before it is written | `IdentityService::publish()` |
//! | Disk is written before the in-memory identity changes | `IdentityService::publish()` |
//! | Files are replaced atomically | `adapters/storage.rs` `write_atomic()` |
//! | Key-read self-healing is bounded | `IdentitySettings::max_key_read_attempts` |
//! | Loaded keys outrank the key file | `IdentityService::sync_key_file()` |

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub use adapters::key_manager::KeyManager;
pub use adapters::storage::IdentityFiles;
pub use application::job::{IdentityLifecycleJob, LIFECYCLE_JOB_NAME};
pub use application::service::{IdentityService, IdentitySettings};
pub use domain::errors::{IdentityError, KeyFileError};
pub use domain::keys::{RouterKeys, KEY_FILE_LENGTH};
pub use domain::lifecycle::{ActiveIdentity, LifecycleState, RebuildOutcome, RebuildTrigger};
pub use ports::inbound::RouterIdentityApi;
pub use ports::outbound::{AddressSource, IdentityStore, KeyFileSource, StatisticsSource};
