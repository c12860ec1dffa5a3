//! Domain layer for the job queue.

pub mod errors;
pub mod job;
pub mod recurring;
pub mod schedule;
