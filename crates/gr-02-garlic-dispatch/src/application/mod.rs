//! Application layer: dispatch service and the build/send jobs.

pub mod jobs;
pub mod service;
