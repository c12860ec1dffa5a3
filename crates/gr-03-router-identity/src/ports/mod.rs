//! Ports for the router identity.

pub mod inbound;
pub mod outbound;
