//! WebSocket session helper.
//!
//! # Data Flow
//! ```text
//! Server ── text/binary frame ──→ read loop
//!     → JSON decode (failure ends the session)
//!     → Lifecycle::on_message
//!     → EventTable::dispatch(payload.event)
//!
//! Socket::emit(event, payload)
//!     → { "event": event, ...payload }
//!     → write loop ── text frame ──→ Server
//! ```
//!
//! # Design Decisions
//! - Handlers are keyed by the `event` string field of the payload
//! - `on` returns a `HandlerId`; `off` takes it back to remove one handler
//! - Lifecycle hooks merge across `init` calls; the source is replaced

pub mod client;
pub mod events;
pub mod lifecycle;
pub mod types;

pub use client::Socket;
pub use events::{encode_event, EventTable, EVENT_FIELD};
pub use lifecycle::Lifecycle;
pub use types::{CloseInfo, Handler, HandlerId, SocketError, SocketResult};
