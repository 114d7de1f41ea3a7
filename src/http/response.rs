//! Response handling.
//!
//! # Responsibilities
//! - Read the response body and parse it as JSON
//! - Turn non-success statuses into `HttpError::Status`
//!
//! # Design Decisions
//! - A success response that is not JSON yields `{}` and a warning
//! - An error response that is not JSON keeps its raw text as the body

use reqwest::StatusCode;
use serde_json::{Map, Value};

use crate::http::types::{HttpError, HttpResult};

/// Read and classify a response.
pub async fn handle_response(response: reqwest::Response) -> HttpResult<Value> {
    let status = response.status();
    let url = response.url().to_string();
    let bytes = response.bytes().await?;

    tracing::debug!(url = %url, status = status.as_u16(), bytes = bytes.len(), "Response received");
    parse_payload(status, &bytes)
}

/// Classify a response from its status and raw body.
pub fn parse_payload(status: StatusCode, bytes: &[u8]) -> HttpResult<Value> {
    let parsed = serde_json::from_slice::<Value>(bytes);

    if status.is_success() {
        return Ok(parsed.unwrap_or_else(|_| {
            tracing::warn!(
                status = status.as_u16(),
                "Request succeeded but the response is not JSON"
            );
            Value::Object(Map::new())
        }));
    }

    let body =
        parsed.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()));
    Err(HttpError::Status {
        status: status.as_u16(),
        body,
    })
}
