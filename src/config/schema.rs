//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the rewriting proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, concurrency).
    pub listener: ListenerConfig,

    /// Proxy endpoint routes and page decoration.
    pub proxy: EndpointConfig,

    /// Upstream fetch behaviour.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Static UI served at the root path.
    pub static_files: StaticFilesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Routes exposed by the proxy and the decoration of rewritten pages.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Path the proxy endpoint is mounted on. Rewritten links point here.
    pub prefix: String,

    /// Path of the convenience redirect endpoint.
    pub redirect_path: String,

    /// Inject the provenance banner into rewritten pages.
    pub banner: bool,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            prefix: "/proxy".to_string(),
            redirect_path: "/go".to_string(),
            banner: true,
        }
    }
}

/// Upstream fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Per-read timeout in seconds while receiving the upstream body.
    pub read_timeout_secs: u64,

    /// Maximum redirects followed before giving up.
    pub max_redirects: usize,

    /// Client headers forwarded upstream, mapped to the value used when the
    /// client did not send one. Headers not listed here are never forwarded.
    pub forward_headers: BTreeMap<String, String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
            max_redirects: 10,
            forward_headers: default_forward_headers(),
        }
    }
}

pub fn default_forward_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "user-agent".to_string(),
            "Mozilla/5.0 (compatible; rewrite-proxy)".to_string(),
        ),
        ("accept".to_string(), "*/*".to_string()),
        ("accept-language".to_string(), "en-US,en;q=0.9".to_string()),
    ])
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed until response headers are produced, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Serve files from `root` for paths no other route claims.
    pub enabled: bool,

    /// Directory holding the UI (index.html, app.js, ...).
    pub root: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: "public".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
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

    /// Human-readable or JSON log lines.
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
