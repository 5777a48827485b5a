//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Handler groups, in match order.
    pub mounts: Vec<MountConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            mounts: default_mounts(),
        }
    }
}

/// The four API services plus the static file directory.
fn default_mounts() -> Vec<MountConfig> {
    let api = [
        ("auth", "/api/auth", 3001),
        ("repos", "/api/repos", 3002),
        ("reviews", "/api/reviews", 3003),
        ("users", "/api/users", 3004),
    ];

    let mut mounts: Vec<MountConfig> = api
        .into_iter()
        .map(|(name, prefix, port)| MountConfig {
            name: Some(name.to_string()),
            prefix: prefix.to_string(),
            upstream: Some(format!("127.0.0.1:{port}")),
            static_dir: None,
        })
        .collect();

    mounts.push(MountConfig {
        name: Some("static".to_string()),
        prefix: "/static".to_string(),
        upstream: None,
        static_dir: Some("static".to_string()),
    });

    mounts
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum requests in flight across all mounts (backpressure).
    #[serde(alias = "max_connections")]
    pub max_in_flight: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_in_flight: 1024,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One prefix and the handler group that owns it.
///
/// Exactly one of `upstream` and `static_dir` must be set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MountConfig {
    /// Label for logs and metrics. Defaults to the prefix's last segment.
    #[serde(default)]
    pub name: Option<String>,

    /// Path prefix, e.g. "/api/repos".
    pub prefix: String,

    /// Upstream service address (e.g., "127.0.0.1:3002").
    #[serde(default)]
    pub upstream: Option<String>,

    /// Directory served as static files.
    #[serde(default)]
    pub static_dir: Option<String>,
}

/// What a mount forwards to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountTarget<'a> {
    Upstream(&'a str),
    StaticDir(&'a str),
}

impl MountConfig {
    /// The configured target, or `None` unless exactly one is set.
    pub fn target(&self) -> Option<MountTarget<'_>> {
        match (&self.upstream, &self.static_dir) {
            (Some(addr), None) => Some(MountTarget::Upstream(addr)),
            (None, Some(dir)) => Some(MountTarget::StaticDir(dir)),
            _ => None,
        }
    }
}
