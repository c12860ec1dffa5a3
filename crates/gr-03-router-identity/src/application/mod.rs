//! Application layer: rebuild service and the periodic lifecycle job.

pub mod job;
pub mod service;
