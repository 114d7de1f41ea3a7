//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the HTTP and socket
//! helpers. All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct NetkitConfig {
    /// HTTP helper settings.
    pub http: HttpConfig,

    /// WebSocket helper settings.
    pub socket: SocketConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

/// HTTP helper configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    /// Prefix for every request path that has no protocol of its own
    /// (e.g., "https://api.example.com").
    pub base_uri: String,

    /// Headers sent with every request. Per-call headers override these.
    pub base_headers: BTreeMap<String, String>,

    /// Default request options.
    pub base_init: BaseInit,
}

impl HttpConfig {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            ..Self::default()
        }
    }

    /// Add a base header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.base_headers.insert(name.into(), value.into());
        self
    }
}

/// Request options applied to every call unless overridden per call.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct BaseInit {
    /// Total request timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// `User-Agent` sent when the request has none.
    pub user_agent: Option<String>,
}

impl BaseInit {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// WebSocket helper configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SocketConfig {
    /// Address to connect to (e.g., "wss://example.com/ws").
    pub source: String,
}

impl SocketConfig {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
