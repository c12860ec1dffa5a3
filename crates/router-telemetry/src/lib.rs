//! # Router Telemetry
//!
//! Observability for the router kernel.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with env-filter, pretty or JSON output
//! - **Traces**: optional OpenTelemetry OTLP export
//! - **Metrics**: Prometheus counters for the job queue, garlic dispatch and
//!   identity lifecycle
//!
//! ## Usage
//!
//! ```rust,ignore
//! use router_telemetry::{init_telemetry, TelemetryConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(config).await.expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | unset | OTLP endpoint; tracing export is off when unset |
//! | `OTEL_SERVICE_NAME` | `garlic-router` | Service name in traces |
//! | `GR_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `GR_JSON_LOGS` | `false` | JSON formatted logs |
//! | `GR_CONSOLE_OUTPUT` | `true` | Console output |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    gather_metrics, register_metrics, MetricsHandle, ENVELOPES_DISPATCHED, ENVELOPE_OUTCOMES,
    GARLIC_BUILD_DURATION, GARLIC_MESSAGES_BUILT, GARLIC_SLOW_BUILDS, IDENTITY_REBUILDS,
    JOBS_EXECUTED, JOBS_FAILED, JOB_QUEUE_DEPTH, KEY_FILE_HEALS,
};
pub use tracing_setup::TracingGuard;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber or tracer setup failed.
    #[error("Failed to initialize tracing: {0}")]
    TracerInit(String),

    /// Metric registration or encoding failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging, optional trace export and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
/// When dropped, it flushes pending traces.
pub async fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Initialize metrics first (synchronous)
    let metrics_handle = register_metrics()?;

    let tracing_guard = tracing_setup::init_tracing(&config).await?;

    logging::announce(&config);

    Ok(TelemetryGuard {
        _tracing: tracing_guard,
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active. Drop to flush and shutdown.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
