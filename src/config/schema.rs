//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the forwarding proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Target rewriting: proxy prefix literal and default backend.
    pub rewrite: RewriteConfig,

    /// Header deny-lists for both directions.
    pub headers: HeaderConfig,

    /// Request logging triggers and limits.
    pub request_log: RequestLogConfig,

    /// Outbound client settings.
    pub client: ClientConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// How incoming URLs are turned into targets.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Host and port of this proxy as clients address it (e.g., "localhost:8080").
    /// Used to build the prefixes stripped from URLs, headers and bodies.
    pub proxy_host: String,

    /// Origin that relative request paths are forwarded to.
    pub default_backend: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            proxy_host: "localhost:8080".to_string(),
            default_backend: "http://localhost:3000".to_string(),
        }
    }
}

/// Header deny-lists. Names are compared case-insensitively.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Headers never forwarded to the target.
    pub request_deny_list: Vec<String>,

    /// Headers never relayed back to the client.
    pub response_deny_list: Vec<String>,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            request_deny_list: to_strings(&[
                "host",
                "content-length",
                "postman-token",
                "user-agent",
                "vary",
            ]),
            response_deny_list: to_strings(&[
                "content-length",
                "postman-token",
                "user-agent",
                "vary",
            ]),
        }
    }
}

/// Request logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestLogConfig {
    /// A request is logged when its URL contains any of these substrings.
    pub path_substrings: Vec<String>,

    /// Largest body buffered for a logged request, in bytes.
    pub max_body_bytes: usize,
}

impl Default for RequestLogConfig {
    fn default() -> Self {
        Self {
            path_substrings: to_strings(&["api", "target"]),
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Outbound HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
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

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
