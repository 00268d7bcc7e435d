//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Simulated work for the `/hello` route.
    pub hello: HelloConfig,

    /// Page store and wiki routes.
    pub pages: PagesConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8090").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8090".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline applied to every request context, in seconds. 0 disables it.
    pub request_secs: u64,

    /// Grace period for draining connections on shutdown, in seconds.
    pub shutdown_grace_secs: u64,
}

impl TimeoutConfig {
    /// The per-request deadline, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_secs > 0).then(|| Duration::from_secs(self.request_secs))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_grace_secs: 15,
        }
    }
}

/// Simulated work performed by the `/hello` handler.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HelloConfig {
    /// How long the handler "works" before answering, in milliseconds.
    pub work_ms: u64,
}

impl HelloConfig {
    pub fn work(&self) -> Duration {
        Duration::from_millis(self.work_ms)
    }
}

impl Default for HelloConfig {
    fn default() -> Self {
        Self { work_ms: 10_000 }
    }
}

/// Page store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PagesConfig {
    /// Mount the `/view`, `/edit` and `/save` routes.
    pub enabled: bool,

    /// Directory holding one `<title>.txt` file per page.
    pub data_dir: PathBuf,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            data_dir: PathBuf::from("pages"),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
