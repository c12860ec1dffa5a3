//! # Router Container
//!
//! Holds the subsystem instances and wires each one's ports to concrete
//! adapters.
//!
//! ## Wiring Order
//!
//! ```text
//! Clock → JobQueue → KeyManager → IdentityService
//!                 └→ OutboundMessagePool → GarlicDispatcher
//! ```

pub mod config;

pub use config::{ConfigError, RouterConfig};

use crate::adapters::{
    InMemoryPeerDatabase, PeerDatabaseFacade, RouterStatistics, StaticAddressSource,
};
use crate::boot::{
    BootPhase, LoadIdentityPhase, PeerDatabasePhase, StartAcceptingClientsPhase,
    StartIdentityLifecyclePhase,
};
use gr_01_job_queue::{Clock, JobQueue, JobSubmitter, QueueConfig, SystemClock};
use gr_02_garlic_dispatch::{GarlicDispatcher, OutboundMessagePool, SealedGarlicCipher};
use gr_03_router_identity::{IdentityService, KeyManager, RouterIdentityApi};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, instrument};

/// Every subsystem instance of a running router.
pub struct RouterContainer {
    pub clock: Arc<dyn Clock>,
    pub queue: Arc<JobQueue>,
    pub keys: Arc<KeyManager>,
    pub identity: Arc<IdentityService>,
    pub outbound: Arc<OutboundMessagePool>,
    pub dispatcher: Arc<GarlicDispatcher>,
    pub peer_database: Arc<InMemoryPeerDatabase>,
    /// Flipped by the final boot phase.
    pub accepting_clients: Arc<AtomicBool>,
    pub config: RouterConfig,
}

impl RouterContainer {
    /// Wire the subsystems against the system clock.
    pub fn new(config: RouterConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    #[instrument(name = "container_init", skip_all)]
    pub fn with_clock(config: RouterConfig, clock: Arc<dyn Clock>) -> Self {
        info!("Initializing router container");

        let queue = JobQueue::with_config(
            Arc::clone(&clock),
            QueueConfig {
                idle_poll_ms: config.scheduler.idle_poll_ms,
            },
        );

        let keys = Arc::new(KeyManager::new());
        let identity = Arc::new(IdentityService::new(
            config.identity_settings(),
            keys.clone(),
            Arc::new(StaticAddressSource::new(&config.network.addresses)),
            Arc::new(RouterStatistics::new(Arc::clone(&clock), &queue)),
            Arc::clone(&clock),
        ));
        info!(dir = %config.identity.config_dir.display(), "  [gr-03] Router identity wired");

        let submitter: Arc<dyn JobSubmitter> = queue.clone();
        let outbound = Arc::new(OutboundMessagePool::new(submitter));
        let dispatcher = Arc::new(GarlicDispatcher::new(
            Arc::clone(&queue),
            Arc::new(SealedGarlicCipher::default()),
            outbound.clone(),
            config.dispatch_settings(),
        ));
        info!("  [gr-02] Garlic dispatch wired");

        Self {
            clock,
            queue,
            keys,
            identity,
            outbound,
            dispatcher,
            peer_database: Arc::new(InMemoryPeerDatabase::new()),
            accepting_clients: Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    /// Boot phases in execution order.
    pub fn boot_phases(&self) -> Vec<Box<dyn BootPhase>> {
        let identity: Arc<dyn RouterIdentityApi> = self.identity.clone();
        let database: Arc<dyn PeerDatabaseFacade> = self.peer_database.clone();
        vec![
            Box::new(LoadIdentityPhase::new(Arc::clone(&identity))),
            Box::new(PeerDatabasePhase::new(database)),
            Box::new(StartIdentityLifecyclePhase::new(
                identity,
                self.config.identity.check_interval_ms,
            )),
            Box::new(StartAcceptingClientsPhase::new(Arc::clone(
                &self.accepting_clients,
            ))),
        ]
    }

    pub fn is_accepting_clients(&self) -> bool {
        self.accepting_clients.load(Ordering::SeqCst)
    }
}
