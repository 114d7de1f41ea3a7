//! HTTP request helper.
//!
//! # Data Flow
//! ```text
//! Http::get / post / ... (uri, body, options)
//!     → request.rs (resolve URL, merge headers, shape body)
//!     → reqwest::Client (send)
//!     → response.rs (parse JSON, classify status)
//!     → success hook | error hook
//!     → caller
//! ```

pub mod client;
pub mod request;
pub mod response;
pub mod types;

pub use client::Http;
pub use request::{merge_headers, resolve_uri, PreparedRequest};
pub use types::{Body, ErrorHook, HttpError, HttpResult, RequestOptions, SuccessHook};
