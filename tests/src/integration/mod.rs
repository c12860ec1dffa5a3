//! Cross-crate integration flows.

pub mod fixtures;

mod boot_flow;
mod dispatch_flow;
