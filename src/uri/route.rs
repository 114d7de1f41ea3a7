//! Structural URI decomposition.
//!
//! # Responsibilities
//! - Split a URI into protocol, hostname, port, pathname, search and hash
//!   with one anchored pattern match
//! - Rebuild the URI string from a (possibly edited) [`Route`]
//!
//! # Design Decisions
//! - Every field has its own decoder and encoder, driven by [`RouteField`]
//! - Host and port are only recognised after a `scheme://` prefix; anything
//!   else is treated as a path
//! - A bracketed IPv6 literal is kept whole, brackets included, as the hostname
//! - Search keys and values are percent-decoded on the way in and
//!   percent-encoded on the way out, so the round-trip preserves meaning
//! - Search entries with an empty key or value are skipped when encoding

use std::borrow::Cow;
use std::str::FromStr;

use lazy_regex::{lazy_regex, Lazy, Regex};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Captures;
use serde::{Deserialize, Serialize};

use crate::uri::codec::{encode_hash, encode_protocol, percent_decode};
use crate::uri::query::{parse_pairs, Query};

static STRUCTURE: Lazy<Regex> = lazy_regex!(
    r"^(?:(?P<protocol>[A-Za-z][A-Za-z0-9+.\-]*)://(?P<hostname>\[[^\]\s]*\]|[^:/?#\s]*)(?::(?P<port>\d+))?)?(?P<pathname>[^?#]*)(?:\?(?P<search>[^#]*))?(?:#(?P<hash>[\s\S]*))?$"
);

const COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'=')
    .add(b'?');

const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// Named fields of a [`Route`], in encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteField {
    Protocol,
    Hostname,
    Port,
    Pathname,
    Search,
    Hash,
}

impl RouteField {
    pub const ALL: [RouteField; 6] = [
        RouteField::Protocol,
        RouteField::Hostname,
        RouteField::Port,
        RouteField::Pathname,
        RouteField::Search,
        RouteField::Hash,
    ];

    /// Capture group name for this field.
    pub fn name(self) -> &'static str {
        match self {
            RouteField::Protocol => "protocol",
            RouteField::Hostname => "hostname",
            RouteField::Port => "port",
            RouteField::Pathname => "pathname",
            RouteField::Search => "search",
            RouteField::Hash => "hash",
        }
    }

    /// Write the decoded form of `raw` into `route`.
    fn decode_into(self, route: &mut Route, raw: &str) {
        match self {
            RouteField::Protocol => route.protocol = raw.to_owned(),
            RouteField::Hostname => route.hostname = raw.to_owned(),
            RouteField::Port => route.port = raw.to_owned(),
            RouteField::Pathname => route.pathname = raw.to_owned(),
            RouteField::Search => route.search = Some(decode_search(raw)),
            RouteField::Hash => route.hash = percent_decode(raw).into_owned(),
        }
    }

    /// Encoded form of this field including its separator, or empty.
    fn encode_from(self, route: &Route) -> Cow<'_, str> {
        match self {
            RouteField::Protocol => Cow::Owned(encode_protocol(&route.protocol)),
            RouteField::Hostname => Cow::Borrowed(route.hostname.as_str()),
            RouteField::Port if route.port.is_empty() => Cow::Borrowed(""),
            RouteField::Port => Cow::Owned(format!(":{}", route.port)),
            RouteField::Pathname => Cow::Borrowed(route.pathname.as_str()),
            RouteField::Search => match route.search.as_ref().map(encode_search) {
                Some(search) if !search.is_empty() => Cow::Owned(format!("?{search}")),
                _ => Cow::Borrowed(""),
            },
            RouteField::Hash => {
                Cow::Owned(encode_hash(&utf8_percent_encode(&route.hash, FRAGMENT).to_string()))
            }
        }
    }
}

impl FromStr for RouteField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RouteField::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown route field: {s}"))
    }
}

/// Decoded structural representation of a URI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Route {
    pub protocol: String,
    pub hostname: String,
    pub port: String,
    pub pathname: String,
    /// `None` when the URI has no `?` at all.
    pub search: Option<Query>,
    pub hash: String,
}

impl Route {
    /// Decompose `uri` into its fields.
    ///
    /// Fields the pattern does not capture stay empty; input the pattern
    /// cannot match at all yields a default route.
    pub fn decode(uri: &str) -> Self {
        let mut route = Route::default();

        if let Some(caps) = STRUCTURE.captures(uri) {
            for field in RouteField::ALL {
                if let Some(raw) = group(&caps, field) {
                    field.decode_into(&mut route, raw);
                }
            }
        }

        route
    }

    /// Rebuild a URI string from every field, in [`RouteField::ALL`] order.
    pub fn encode(&self) -> String {
        RouteField::ALL
            .into_iter()
            .map(|field| field.encode_from(self))
            .collect()
    }

    /// Encoded form of a single field, without its separator.
    pub fn get(&self, field: RouteField) -> String {
        match field {
            RouteField::Protocol => self.protocol.clone(),
            RouteField::Hostname => self.hostname.clone(),
            RouteField::Port => self.port.clone(),
            RouteField::Pathname => self.pathname.clone(),
            RouteField::Search => self.search.as_ref().map(encode_search).unwrap_or_default(),
            RouteField::Hash => self.hash.clone(),
        }
    }

    /// Replace a single field by running its decoder over `raw`.
    pub fn set(&mut self, field: RouteField, raw: &str) {
        field.decode_into(self, raw);
    }

    /// `hostname[:port]`, or empty when there is no host.
    pub fn host(&self) -> String {
        if self.port.is_empty() {
            self.hostname.clone()
        } else {
            format!("{}:{}", self.hostname, self.port)
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

fn group<'h>(caps: &Captures<'h>, field: RouteField) -> Option<&'h str> {
    caps.name(field.name()).map(|m| m.as_str())
}

fn decode_search(raw: &str) -> Query {
    parse_pairs(raw, |part| percent_decode(part).into_owned())
}

fn encode_search(query: &Query) -> String {
    query
        .iter()
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, COMPONENT),
                utf8_percent_encode(value, COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
