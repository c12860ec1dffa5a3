//! Domain layer for the router identity.

pub mod errors;
pub mod keys;
pub mod lifecycle;
