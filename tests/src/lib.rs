//! # Garlic Router Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # Criterion groups per subsystem
//! │   ├── gr_01_job_queue.rs
//! │   └── gr_02_garlic_dispatch.rs
//! │
//! └── integration/      # Cross-crate flows
//!     ├── fixtures.rs
//!     ├── boot_flow.rs
//!     └── dispatch_flow.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gr-tests
//! cargo bench -p gr-tests
//! ```

pub mod benchmarks;
pub mod integration;
