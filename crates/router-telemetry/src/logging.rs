//! Structured logging conventions.
//!
//! Log lines carry consistent fields so they can be filtered per subsystem:
//! - `subsystem`: `gr-01` (job queue), `gr-02` (garlic dispatch),
//!   `gr-03` (router identity), `boot`
//! - `job`: job name, when the line is emitted on behalf of a job
//! - `peer`: abbreviated router hash, when a remote router is involved

use crate::TelemetryConfig;

/// Log the effective telemetry settings once the subscriber is installed.
pub(crate) fn announce(config: &TelemetryConfig) {
    tracing::debug!(
        service = %config.service_name,
        log_level = %config.log_level,
        json_logs = config.json_logs,
        otlp = config.exports_traces(),
        "Structured logging configured"
    );
}

/// Log a job-related event with standard fields.
#[macro_export]
macro_rules! log_job_event {
    ($level:ident, $subsystem:expr, $msg:expr, $job_name:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            job = %$job_name,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a peer-related event with standard fields.
#[macro_export]
macro_rules! log_peer_event {
    ($level:ident, $subsystem:expr, $msg:expr, $peer:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            peer = %$peer,
            $($($field)*,)?
            $msg
        )
    };
}
