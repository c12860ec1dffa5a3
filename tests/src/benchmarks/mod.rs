//! # Kernel Benchmarks
//!
//! Criterion groups per subsystem, registered from
//! `benches/kernel_benchmarks.rs`.

pub mod gr_01_job_queue;
pub mod gr_02_garlic_dispatch;
