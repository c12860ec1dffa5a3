//! # Garlic Router Runtime
//!
//! Composition root for the router kernel.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and subsystem wiring
//! - `adapters/` - collaborator implementations (peer database, addresses,
//!   statistics, transport pump)
//! - `boot` - the startup phase chain
//! - `runtime` - start and graceful shutdown
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, file, environment)
//! 2. Wire subsystems
//! 3. Start the job queue
//! 4. Run the boot chain: load identity, start peer database, schedule the
//!    identity lifecycle job, accept clients

pub mod adapters;
pub mod boot;
pub mod container;
pub mod runtime;

pub use boot::{BootPhase, BootSequenceJob, BootStatus};
pub use container::{ConfigError, RouterConfig, RouterContainer};
pub use runtime::RouterRuntime;
