//! Statistics published in the router's identity record.

use gr_01_job_queue::{Clock, JobQueue};
use gr_03_router_identity::StatisticsSource;
use shared_types::Timestamp;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

/// Version, uptime and scheduler counters.
///
/// Holds the queue weakly; the queue owns jobs that hold the identity
/// service, which holds this source.
pub struct RouterStatistics {
    clock: Arc<dyn Clock>,
    started_at: Timestamp,
    queue: Weak<JobQueue>,
}

impl RouterStatistics {
    pub fn new(clock: Arc<dyn Clock>, queue: &Arc<JobQueue>) -> Self {
        let started_at = clock.now();
        Self {
            clock,
            started_at,
            queue: Arc::downgrade(queue),
        }
    }

    pub fn uptime_ms(&self) -> u64 {
        self.clock.now().saturating_sub(self.started_at)
    }
}

impl StatisticsSource for RouterStatistics {
    fn published_options(&self) -> BTreeMap<String, String> {
        let mut options = BTreeMap::new();
        options.insert(
            "router.version".to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        options.insert("stat_uptime".to_string(), format!("{}ms", self.uptime_ms()));
        if let Some(queue) = self.queue.upgrade() {
            let stats = queue.stats();
            options.insert("stat_jobs.executed".to_string(), stats.executed.to_string());
            options.insert("stat_jobs.failed".to_string(), stats.failed.to_string());
            options.insert("stat_jobs.pending".to_string(), stats.pending.to_string());
        }
        options
    }
}
