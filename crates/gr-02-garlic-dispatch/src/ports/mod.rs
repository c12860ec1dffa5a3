//! Ports for garlic dispatch.

pub mod inbound;
pub mod outbound;
