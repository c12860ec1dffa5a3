//! # Router Configuration
//!
//! Unified configuration for the kernel subsystems.
//!
//! ## Sources (later wins)
//!
//! 1. Built-in defaults
//! 2. JSON file named by `GR_CONFIG_FILE`
//! 3. Environment overrides: `GR_CONFIG_DIR`, `GR_NTCP_HOST`, `GR_NTCP_PORT`,
//!    `GR_LOG_LEVEL`
//!
//! All durations are milliseconds.

use gr_02_garlic_dispatch::DispatchSettings;
use gr_03_router_identity::{IdentityFiles, IdentitySettings};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Complete router configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub identity: IdentityConfig,
    pub dispatch: DispatchConfig,
    pub network: NetworkConfig,
    pub scheduler: SchedulerConfig,
    /// Log filter handed to the telemetry layer.
    pub log_level: String,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

impl RouterConfig {
    /// Defaults, then `GR_CONFIG_FILE`, then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("GR_CONFIG_FILE") {
            Ok(path) => Self::from_file(PathBuf::from(path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: PathBuf) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = serde_json::from_str(&text)?;
        info!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Apply `GR_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("GR_CONFIG_DIR") {
            self.identity.config_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup("GR_LOG_LEVEL") {
            self.log_level = level;
        }

        let host = lookup("GR_NTCP_HOST");
        let port = match lookup("GR_NTCP_PORT") {
            Some(p) => Some(p.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "GR_NTCP_PORT",
                reason: e.to_string(),
            })?),
            None => None,
        };
        if host.is_some() || port.is_some() {
            let ntcp = self.network.ntcp_mut();
            if let Some(host) = host {
                ntcp.host = host;
            }
            if let Some(port) = port {
                ntcp.port = port;
            }
        }
        Ok(())
    }

    /// Reject zero intervals and empty file names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let id = &self.identity;
        for (key, name) in [
            ("identity.keys_filename", &id.keys_filename),
            ("identity.info_filename", &id.info_filename),
            ("identity.rebuild_marker_filename", &id.rebuild_marker_filename),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key,
                    reason: "file name is empty".into(),
                });
            }
        }
        for (key, value) in [
            ("identity.check_interval_ms", id.check_interval_ms),
            ("scheduler.idle_poll_ms", self.scheduler.idle_poll_ms),
            ("dispatch.slow_build_threshold_ms", self.dispatch.slow_build_threshold_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key,
                    reason: "must be greater than zero".into(),
                });
            }
        }
        if id.max_key_read_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "identity.max_key_read_attempts",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn identity_settings(&self) -> IdentitySettings {
        let id = &self.identity;
        let mut settings = IdentitySettings::new(IdentityFiles::new(
            &id.config_dir,
            &id.keys_filename,
            &id.info_filename,
            &id.rebuild_marker_filename,
        ));
        settings.max_key_read_attempts = id.max_key_read_attempts;
        settings
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            clock_skew_tolerance_ms: self.dispatch.clock_skew_tolerance_ms,
            slow_build_threshold_ms: self.dispatch.slow_build_threshold_ms,
            default_priority: self.dispatch.default_priority,
            default_reply_timeout_ms: self.dispatch.default_reply_timeout_ms,
            initial_session_tags: self.dispatch.initial_session_tags,
        }
    }
}

/// Identity files and self-check cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub config_dir: PathBuf,
    pub keys_filename: String,
    pub info_filename: String,
    pub rebuild_marker_filename: String,
    pub check_interval_ms: u64,
    pub max_key_read_attempts: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("./router"),
            keys_filename: "router.keys".to_string(),
            info_filename: "router.info".to_string(),
            rebuild_marker_filename: "router.info.rebuild".to_string(),
            check_interval_ms: 45_000,
            max_key_read_attempts: 3,
        }
    }
}

/// Garlic dispatch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub clock_skew_tolerance_ms: u64,
    pub slow_build_threshold_ms: u64,
    pub default_priority: i32,
    pub default_reply_timeout_ms: u64,
    pub initial_session_tags: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        let defaults = DispatchSettings::default();
        Self {
            clock_skew_tolerance_ms: defaults.clock_skew_tolerance_ms,
            slow_build_threshold_ms: defaults.slow_build_threshold_ms,
            default_priority: defaults.default_priority,
            default_reply_timeout_ms: defaults.default_reply_timeout_ms,
            initial_session_tags: defaults.initial_session_tags,
        }
    }
}

/// One advertised transport address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressConfig {
    pub style: String,
    pub host: String,
    pub port: u16,
}

/// Network configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub addresses: Vec<AddressConfig>,
    /// How often the outbound pool is drained and expired.
    pub outbound_poll_ms: u64,
}

impl NetworkConfig {
    /// The NTCP address entry, created if absent.
    fn ntcp_mut(&mut self) -> &mut AddressConfig {
        let index = match self.addresses.iter().position(|a| a.style == "NTCP") {
            Some(index) => index,
            None => {
                self.addresses.push(AddressConfig {
                    style: "NTCP".to_string(),
                    host: "127.0.0.1".to_string(),
                    port: 8887,
                });
                self.addresses.len() - 1
            }
        };
        &mut self.addresses[index]
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            addresses: vec![AddressConfig {
                style: "NTCP".to_string(),
                host: "127.0.0.1".to_string(),
                port: 8887,
            }],
            outbound_poll_ms: 100,
        }
    }
}

/// Job queue configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub idle_poll_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { idle_poll_ms: 1_000 }
    }
}
