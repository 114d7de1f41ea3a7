//! Request preparation.
//!
//! # Responsibilities
//! - Resolve the request URL against the configured base URI
//! - Merge base headers with per-call headers
//! - Shape the body (JSON serialization, content type)
//! - Apply base init defaults and per-call overrides
//!
//! # Design Decisions
//! - Preparation is pure; nothing here touches the network
//! - A path with its own `scheme://` prefix bypasses the base URI
//! - Header names compare case-insensitively, so per-call overrides work
//!   regardless of spelling

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;

use crate::http::types::{Body, HttpConfig, HttpError, HttpResult, RequestOptions};
use crate::uri::{encode_query, Uri};

/// Use `path` as-is when it already has a protocol, else prefix `base_uri`.
pub fn resolve_uri(base_uri: &str, path: &str) -> String {
    if Uri::from(path).is_absolute() {
        path.to_owned()
    } else {
        format!("{base_uri}{path}")
    }
}

/// Base headers overlaid by per-call headers.
pub fn merge_headers(
    base: &BTreeMap<String, String>,
    headers: &BTreeMap<String, String>,
) -> HttpResult<HeaderMap> {
    let mut merged = HeaderMap::new();

    for (name, value) in base.iter().chain(headers) {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| HttpError::InvalidHeader(name.clone()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| HttpError::InvalidHeader(format!("{name}: {value}")))?;
        merged.insert(name, value);
    }

    Ok(merged)
}

/// Body after shaping, ready to hand to the client.
#[derive(Debug, Default)]
pub enum PreparedBody {
    #[default]
    None,
    Text(String),
    Form(reqwest::multipart::Form),
}

/// Everything needed to send one request.
#[derive(Debug)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: PreparedBody,
    pub timeout: Option<Duration>,
}

impl PreparedRequest {
    /// Build the request from the active configuration and per-call input.
    pub fn new(
        config: &HttpConfig,
        method: Method,
        uri: &str,
        body: Body,
        options: RequestOptions,
    ) -> HttpResult<Self> {
        let mut url = resolve_uri(&config.base_uri, uri);
        if let Some(query) = options.query.as_ref() {
            let prefix = if url.contains('?') { "&" } else { "?" };
            url.push_str(&encode_query(query, prefix));
        }

        let mut headers = merge_headers(&config.base_headers, &options.headers)?;

        if let Some(agent) = config.base_init.user_agent.as_deref() {
            if !headers.contains_key(USER_AGENT) {
                let value = HeaderValue::from_str(agent)
                    .map_err(|_| HttpError::InvalidHeader(format!("user-agent: {agent}")))?;
                headers.insert(USER_AGENT, value);
            }
        }

        let body = if body.is_empty() {
            PreparedBody::None
        } else {
            match body {
                Body::Json(value) => {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                    PreparedBody::Text(serde_json::to_string(&value)?)
                }
                Body::Text(text) => PreparedBody::Text(text),
                Body::Form(form) => PreparedBody::Form(form),
                Body::Empty => PreparedBody::None,
            }
        };

        Ok(Self {
            method,
            url,
            headers,
            body,
            timeout: options.timeout.or_else(|| config.base_init.timeout()),
        })
    }

    /// Turn into a `reqwest` builder on `client`.
    pub fn into_builder(self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let mut builder = client.request(self.method, &self.url).headers(self.headers);

        builder = match self.body {
            PreparedBody::None => builder,
            PreparedBody::Text(text) => builder.body(text),
            PreparedBody::Form(form) => builder.multipart(form),
        };

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder
    }
}
