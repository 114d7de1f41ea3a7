//! Thin client-side networking helpers.
//!
//! ```text
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!   │     uri      │◀──│     http     │   │    socket    │
//!   │ decode/encode│   │ reqwest+hooks│   │ ws + events  │
//!   └──────────────┘   └──────────────┘   └──────────────┘
//!            ▲                 ▲                  ▲
//!            └──────── config (TOML) ─────────────┘
//! ```
//!
//! - [`uri`]: pure URI parsing and serialization
//! - [`http`]: request helper with base URI, base headers and outcome hooks
//! - [`socket`]: WebSocket session that routes JSON messages by `event`

pub mod config;
pub mod http;
pub mod observability;
pub mod socket;
pub mod uri;

pub use config::NetkitConfig;
pub use http::Http;
pub use socket::{Lifecycle, Socket};
pub use uri::{Route, Uri};
