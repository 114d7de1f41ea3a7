//! Socket error definitions and shared types.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

pub use crate::config::schema::SocketConfig;

/// Errors that can occur during a socket session.
#[derive(Debug, Error)]
pub enum SocketError {
    /// No open connection to send on.
    #[error("socket is not connected")]
    NotConnected,

    /// The connection closed; open a new one before sending.
    #[error("socket is closed")]
    Closed,

    /// The handshake with `source` failed.
    #[error("failed to connect to {source_url}: {error}")]
    Connect {
        source_url: String,
        #[source]
        error: tungstenite::Error,
    },

    /// The connection failed after it was established.
    #[error("transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    /// An inbound message was not valid JSON.
    #[error("invalid JSON message: {0}")]
    Decode(#[from] serde_json::Error),

    /// An outbound payload did not serialize to a JSON object.
    #[error("payload for '{0}' must serialize to a JSON object")]
    InvalidPayload(String),
}

/// Result type for socket operations.
pub type SocketResult<T> = Result<T, SocketError>;

/// Identifies one registered event handler, for [`off`](crate::socket::Socket::off).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub(crate) u64);

/// Callback for a decoded inbound payload.
pub type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Why a connection closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

impl CloseInfo {
    /// Normal closure.
    pub const NORMAL: u16 = 1000;
    /// Connection dropped without a close frame.
    pub const ABNORMAL: u16 = 1006;
    /// Payload data was not what the endpoint expects.
    pub const INVALID_DATA: u16 = 1007;

    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    pub fn abnormal() -> Self {
        Self::new(Self::ABNORMAL, "")
    }
}
