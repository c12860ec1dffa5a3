//! Ports for the job queue.

pub mod inbound;
pub mod outbound;
