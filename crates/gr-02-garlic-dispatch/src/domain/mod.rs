//! Domain layer for garlic dispatch.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod session;
