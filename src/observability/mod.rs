//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http, socket, config produce:
//!     → tracing events (request URL, status, socket transitions)
//!
//! Consumers:
//!     → logging.rs (fmt subscriber on stdout)
//! ```
//!
//! # Design Decisions
//! - Structured fields rather than formatted messages
//! - Per-request and per-message traffic logs at debug, failures at warn/error

pub mod logging;
