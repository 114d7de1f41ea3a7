//! URI parsing and serialization.
//!
//! # Data Flow
//! ```text
//! "https://a.com:8080/users?x=1#top"
//!     → codec.rs   (per-fragment decode/encode: protocol, query, hash)
//!     → route.rs   (structural decode into every field, and back)
//!     → Query      (insertion-ordered key/value mapping)
//! ```
//!
//! # Design Decisions
//! - Decoding never fails; malformed input degrades to empty fields
//! - Fragment decoders percent-decode the whole input first
//! - `Route` owns the structural round-trip, `codec` owns the single fragments

pub mod codec;
pub mod query;
pub mod route;

use serde::Serialize;

pub use codec::{
    decode_hash, decode_protocol, decode_query, encode_hash, encode_protocol, encode_query,
};
pub use query::Query;
pub use route::{Route, RouteField};

/// A URI string together with lazily decoded fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Uri {
    origin: String,
}

/// Fragments of a [`Uri`] that the HTTP and socket helpers care about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UriRoute {
    pub protocol: String,
    pub query: Option<Query>,
    pub hash: String,
}

impl Uri {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            origin: value.into(),
        }
    }

    /// The string this URI was built from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Decode protocol, query and hash from the origin.
    pub fn route(&self) -> UriRoute {
        UriRoute {
            protocol: decode_protocol(&self.origin),
            query: decode_query(&self.origin),
            hash: decode_hash(&self.origin),
        }
    }

    /// Full structural decomposition of the origin.
    pub fn structure(&self) -> Route {
        Route::decode(&self.origin)
    }

    /// True when the origin carries its own `scheme://` prefix.
    pub fn is_absolute(&self) -> bool {
        !decode_protocol(&self.origin).is_empty()
    }
}

impl From<&str> for Uri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Uri {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for Uri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.origin)
    }
}
