//! Prometheus metrics for the router kernel.
//!
//! All metrics follow the naming convention: `gr_<subsystem>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., jobs_executed_total)
//! - **Gauge**: Value that can go up or down (e.g., job queue depth)
//! - **Histogram**: Distribution of values (e.g., garlic build duration)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // JOB QUEUE METRICS (gr-01)
    // =========================================================================

    /// Jobs that ran to completion
    pub static ref JOBS_EXECUTED: Counter = Counter::new(
        "gr_jobqueue_jobs_executed_total",
        "Total number of jobs executed by the job queue"
    ).expect("metric creation failed");

    /// Jobs that returned an error or panicked
    pub static ref JOBS_FAILED: CounterVec = CounterVec::new(
        Opts::new("gr_jobqueue_jobs_failed_total", "Jobs discarded after a fault"),
        &["kind"]  // kind: error/panic
    ).expect("metric creation failed");

    /// Jobs waiting to run
    pub static ref JOB_QUEUE_DEPTH: Gauge = Gauge::new(
        "gr_jobqueue_pending_jobs",
        "Number of jobs queued (ready or timed)"
    ).expect("metric creation failed");

    // =========================================================================
    // GARLIC DISPATCH METRICS (gr-02)
    // =========================================================================

    /// Garlic messages built
    pub static ref GARLIC_MESSAGES_BUILT: Counter = Counter::new(
        "gr_garlic_messages_built_total",
        "Total garlic messages built"
    ).expect("metric creation failed");

    /// Builds that exceeded the slow-build threshold
    pub static ref GARLIC_SLOW_BUILDS: Counter = Counter::new(
        "gr_garlic_slow_builds_total",
        "Garlic builds slower than the warning threshold"
    ).expect("metric creation failed");

    /// Garlic build duration
    pub static ref GARLIC_BUILD_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "gr_garlic_build_duration_seconds",
            "Time spent building garlic messages"
        ).buckets(exponential_buckets(0.0001, 2.0, 16).unwrap_or_default())
    ).expect("metric creation failed");

    /// Envelopes handed to the outbound queue
    pub static ref ENVELOPES_DISPATCHED: Counter = Counter::new(
        "gr_garlic_envelopes_dispatched_total",
        "Outbound envelopes submitted for transmission"
    ).expect("metric creation failed");

    /// Terminal envelope outcomes
    pub static ref ENVELOPE_OUTCOMES: CounterVec = CounterVec::new(
        Opts::new("gr_garlic_envelope_outcomes_total", "Terminal outcomes of outbound envelopes"),
        &["outcome"]  // outcome: send_failed/sent/reply/reply_failed
    ).expect("metric creation failed");

    // =========================================================================
    // ROUTER IDENTITY METRICS (gr-03)
    // =========================================================================

    /// Identity rebuilds
    pub static ref IDENTITY_REBUILDS: CounterVec = CounterVec::new(
        Opts::new("gr_identity_rebuilds_total", "Router identity rebuilds"),
        &["kind"]  // kind: refresh/regenerate
    ).expect("metric creation failed");

    /// Corrupt key files deleted by the rebuild procedure
    pub static ref KEY_FILE_HEALS: Counter = Counter::new(
        "gr_identity_key_file_heals_total",
        "Corrupt key files deleted and rebuilt"
    ).expect("metric creation failed");
}

/// Handle for the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Job queue
        Box::new(JOBS_EXECUTED.clone()),
        Box::new(JOBS_FAILED.clone()),
        Box::new(JOB_QUEUE_DEPTH.clone()),
        // Garlic dispatch
        Box::new(GARLIC_MESSAGES_BUILT.clone()),
        Box::new(GARLIC_SLOW_BUILDS.clone()),
        Box::new(GARLIC_BUILD_DURATION.clone()),
        Box::new(ENVELOPES_DISPATCHED.clone()),
        Box::new(ENVELOPE_OUTCOMES.clone()),
        // Identity
        Box::new(IDENTITY_REBUILDS.clone()),
        Box::new(KEY_FILE_HEALS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
