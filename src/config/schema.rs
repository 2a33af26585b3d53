//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the mirror
//! proxy. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the mirror proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MirrorConfig {
    /// Listener configuration (bind host, per-variant ports).
    pub listener: ListenerConfig,

    /// Upstream origin hosts the two variants mirror.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
///
/// One bind host serves both variants; each variant gets its own port.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host both listeners bind to (e.g., "127.0.0.1").
    pub bind_host: String,

    /// Port for the desktop mirror.
    pub desktop_port: u16,

    /// Port for the mobile mirror.
    pub mobile_port: u16,

    /// Maximum concurrent connections per listener (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".to_string(),
            desktop_port: 9999,
            mobile_port: 9998,
            max_connections: 1024,
        }
    }
}

/// Upstream origin configuration.
///
/// The two hosts are fixed for the lifetime of the process; the mobile host
/// is the origin's mobile-subdomain counterpart of the desktop host.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme used to reach the origin ("http" or "https").
    pub scheme: String,

    /// Desktop origin host.
    pub desktop_host: String,

    /// Mobile origin host.
    pub mobile_host: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            desktop_host: "habrahabr.ru".to_string(),
            mobile_host: "m.habrahabr.ru".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total upstream request timeout in seconds.
    pub upstream_secs: u64,

    /// Read/write timeout on the inbound client connection in seconds.
    pub client_io_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
            client_io_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
