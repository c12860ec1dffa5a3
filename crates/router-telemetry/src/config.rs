//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging, tracing and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name for traces and logs
    pub service_name: String,

    /// OpenTelemetry OTLP endpoint. Trace export is disabled when `None`.
    pub otlp_endpoint: Option<String>,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Router profile label attached to exported traces (e.g. `floodfill`)
    pub profile: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "garlic-router".to_string(),
            otlp_endpoint: None,
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            profile: "standard".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: garlic-router)
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: unset)
    /// - `GR_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `GR_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `GR_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `GR_PROFILE`: Router profile label (default: standard)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "garlic-router".to_string()),

            otlp_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .ok()
                .filter(|v| !v.is_empty()),

            log_level: env::var("GR_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("GR_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: env::var("GR_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            profile: env::var("GR_PROFILE").unwrap_or_else(|_| "standard".to_string()),
        }
    }

    /// Whether spans are exported over OTLP.
    pub fn exports_traces(&self) -> bool {
        self.otlp_endpoint.is_some()
    }
}
