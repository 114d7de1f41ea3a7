//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Base URI must carry its own protocol
//! - Base headers must be valid HTTP header names and values
//! - Socket source must be a `ws://` or `wss://` URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: NetkitConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use reqwest::header::{HeaderName, HeaderValue};
use thiserror::Error;

use crate::config::schema::NetkitConfig;
use crate::uri::Uri;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending setting.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check every semantic rule and collect all violations.
pub fn validate_config(config: &NetkitConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let base_uri = &config.http.base_uri;
    if !base_uri.is_empty() && !Uri::from(base_uri.as_str()).is_absolute() {
        errors.push(ValidationError::new(
            "http.base_uri",
            format!("'{base_uri}' has no protocol"),
        ));
    }

    for (name, value) in &config.http.base_headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::new(
                format!("http.base_headers.{name}"),
                "invalid header name",
            ));
        }
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::new(
                format!("http.base_headers.{name}"),
                "invalid header value",
            ));
        }
    }

    if config.http.base_init.timeout_secs == Some(0) {
        errors.push(ValidationError::new(
            "http.base_init.timeout_secs",
            "timeout must be greater than zero",
        ));
    }

    let source = &config.socket.source;
    if !source.is_empty() {
        match url::Url::parse(source) {
            Ok(url) if matches!(url.scheme(), "ws" | "wss") => {}
            Ok(url) => errors.push(ValidationError::new(
                "socket.source",
                format!("unsupported scheme '{}'", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new("socket.source", e.to_string())),
        }
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "logging.level",
            format!("unknown level '{}'", config.logging.level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
