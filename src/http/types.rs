//! Request/response types and error definitions.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

pub use crate::config::schema::HttpConfig;
use crate::uri::Query;

/// Errors that can occur while issuing a request.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request never produced a response (connect failure, timeout, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status. `body` is the parsed
    /// JSON error payload, or the raw text when it was not JSON.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: Value },

    /// A header name or value could not be encoded.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The request body could not be serialized.
    #[error("failed to serialize body: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Raised by a success or error hook.
    #[error("{0}")]
    Hook(String),
}

impl HttpError {
    /// HTTP status code, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            HttpError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Parsed error payload, when the server answered.
    pub fn body(&self) -> Option<&Value> {
        match self {
            HttpError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Result type for HTTP operations.
pub type HttpResult<T> = Result<T, HttpError>;

/// Post-processing applied to every successful payload.
pub type SuccessHook = Arc<dyn Fn(Value) -> HttpResult<Value> + Send + Sync>;

/// Post-processing applied to every failed outcome. Returning `Ok`
/// recovers the call.
pub type ErrorHook = Arc<dyn Fn(HttpError) -> HttpResult<Value> + Send + Sync>;

/// Request body.
#[derive(Debug, Default)]
pub enum Body {
    /// No body is sent.
    #[default]
    Empty,
    /// Serialized to JSON and sent with `Content-Type: application/json`.
    Json(Value),
    /// Sent verbatim.
    Text(String),
    /// Multipart form data, sent verbatim with its own boundary header.
    Form(reqwest::multipart::Form),
}

impl Body {
    /// Serialize any value as a JSON body.
    pub fn json<T: serde::Serialize>(value: &T) -> HttpResult<Self> {
        Ok(Body::Json(serde_json::to_value(value)?))
    }

    /// True when no body bytes would be sent. JSON `null` counts as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Empty | Body::Json(Value::Null) => true,
            Body::Text(text) => text.is_empty(),
            Body::Json(_) | Body::Form(_) => false,
        }
    }
}

/// JSON strings are sent as plain text; `null` sends no body.
impl From<Value> for Body {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Body::Empty,
            Value::String(text) => Body::Text(text),
            other => Body::Json(other),
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_owned())
    }
}

impl From<reqwest::multipart::Form> for Body {
    fn from(form: reqwest::multipart::Form) -> Self {
        Body::Form(form)
    }
}

/// Per-call request options. Anything set here overrides the base init.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra headers; a header with the same name as a base header wins.
    pub headers: BTreeMap<String, String>,
    /// Query parameters appended to the resolved URL.
    pub query: Option<Query>,
    /// Total request timeout.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query
            .get_or_insert_with(Query::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_from_value() {
        assert!(matches!(Body::from(Value::Null), Body::Empty));
        assert!(matches!(Body::from(json!("raw")), Body::Text(ref t) if t == "raw"));
        assert!(matches!(Body::from(json!({"a": 1})), Body::Json(_)));
        assert!(matches!(Body::from(json!([1, 2])), Body::Json(_)));
    }

    #[test]
    fn test_body_is_empty() {
        assert!(Body::Empty.is_empty());
        assert!(Body::from("").is_empty());
        assert!(!Body::from("x").is_empty());
        assert!(!Body::Json(json!({})).is_empty());
        assert!(Body::Json(Value::Null).is_empty());
        assert!(Body::json(&None::<u8>).unwrap().is_empty());
    }

    #[test]
    fn test_body_json_serializes() {
        #[derive(serde::Serialize)]
        struct User {
            name: &'static str,
        }

        let body = Body::json(&User { name: "ada" }).unwrap();
        assert!(matches!(body, Body::Json(ref v) if v == &json!({"name": "ada"})));
    }

    #[test]
    fn test_request_options_builder() {
        let opts = RequestOptions::new()
            .header("X-Trace", "1")
            .query("page", "2")
            .timeout(Duration::from_secs(3));

        assert_eq!(opts.headers.get("X-Trace").map(String::as_str), Some("1"));
        assert_eq!(
            opts.query.as_ref().and_then(|q| q.get("page")).map(String::as_str),
            Some("2")
        );
        assert_eq!(opts.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_error_accessors_and_display() {
        let err = HttpError::Status {
            status: 404,
            body: json!({"message": "not found"}),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some(&json!({"message": "not found"})));
        assert_eq!(err.to_string(), r#"HTTP 404: {"message":"not found"}"#);

        let err = HttpError::Hook("rejected".into());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "rejected");
    }
}
