//! # Shared Types Crate
//!
//! Router identity entities used by every kernel subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `RouterIdentity` and `RouterInfo` are defined
//!   once and reused by garlic dispatch (as recipients) and by the identity
//!   lifecycle (as the record we publish about ourselves).
//! - **Signed Before Shared**: a `RouterInfo` only encodes once it carries a
//!   signature that validates against its own identity's signing key. Any
//!   mutation drops the signature.

pub mod entities;
pub mod errors;
pub mod router_info;

pub use entities::*;
pub use errors::*;
pub use router_info::RouterInfo;
