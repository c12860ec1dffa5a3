//! Runtime lifecycle: start the queue, boot, pump, and shut down.

use crate::adapters::{LoggingTransport, OutboundPump, Transport};
use crate::boot::{BootSequenceJob, BootStatus};
use crate::container::{RouterConfig, RouterContainer};
use gr_01_job_queue::JobSubmitter;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Upper bound on how long shutdown waits for background tasks.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// The running router.
pub struct RouterRuntime {
    container: Arc<RouterContainer>,
    transport: Arc<dyn Transport>,
    boot: BootStatus,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl RouterRuntime {
    pub fn new(config: RouterConfig) -> Self {
        Self::from_container(RouterContainer::new(config), Arc::new(LoggingTransport))
    }

    pub fn from_container(container: RouterContainer, transport: Arc<dyn Transport>) -> Self {
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        Self {
            container: Arc::new(container),
            transport,
            boot: BootStatus::new(),
            tasks: Mutex::new(Vec::new()),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Start the job queue, queue the boot chain and start the outbound pump.
    ///
    /// Returns once everything is scheduled; boot runs on the queue.
    pub fn start(&self) {
        info!("===========================================");
        info!("  Garlic Router Kernel v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let container = &self.container;
        let mut tasks = self.tasks.lock();
        tasks.push(container.queue.start());

        let boot = BootSequenceJob::new(container.boot_phases(), self.boot.clone());
        container.queue.submit(Box::new(boot));

        let pump = OutboundPump::new(
            Arc::clone(&container.outbound),
            Arc::clone(&self.transport),
            Arc::clone(&container.clock),
        );
        tasks.push(pump.spawn(
            container.config.network.outbound_poll_ms,
            self.shutdown_rx.clone(),
        ));

        info!(
            config_dir = %container.config.identity.config_dir.display(),
            started_at = container.clock.now(),
            "Router runtime started"
        );
    }

    /// Signal shutdown, stop the queue and wait for background tasks.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        self.container.queue.stop();

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(error = %e, "Background task aborted"),
                Err(_) => warn!("Background task did not stop in time"),
            }
        }

        info!("Shutdown complete");
    }

    pub fn container(&self) -> Arc<RouterContainer> {
        Arc::clone(&self.container)
    }

    pub fn boot_status(&self) -> &BootStatus {
        &self.boot
    }
}
