//! Per-fragment URI codecs.
//!
//! # Responsibilities
//! - Extract protocol, query and hash from a raw URI string
//! - Serialize those fragments back with their separators
//!
//! # Design Decisions
//! - The whole input is percent-decoded before matching
//! - Invalid escapes and non UTF-8 sequences keep the raw input
//! - Encoders write values verbatim; they only add separators

use std::borrow::Cow;

use lazy_regex::{lazy_regex, Lazy, Regex};
use percent_encoding::percent_decode_str;

use crate::uri::query::{parse_pairs, Query};

static PROTOCOL: Lazy<Regex> = lazy_regex!(r"^([A-Za-z][A-Za-z0-9+.\-]*)://");
static QUERY: Lazy<Regex> = lazy_regex!(r"\?([^#]*)");
static HASH: Lazy<Regex> = lazy_regex!(r"#(\S+)");

/// Percent-decode `uri`, falling back to the raw input when the result is
/// not valid UTF-8.
pub(crate) fn percent_decode(uri: &str) -> Cow<'_, str> {
    percent_decode_str(uri)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(uri))
}

fn capture(pattern: &Regex, uri: &str) -> Option<String> {
    let decoded = percent_decode(uri);
    pattern
        .captures(&decoded)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

/// Leading `scheme://` scheme, or an empty string.
///
/// A scheme is a letter followed by letters, digits, `+`, `.` or `-`, so a
/// relative path that carries a URL in its query has no protocol.
pub fn decode_protocol(uri: &str) -> String {
    capture(&PROTOCOL, uri).unwrap_or_default()
}

/// Key/value pairs between `?` and an optional `#`.
///
/// Returns `None` when the input has no `?`. Pairs with an empty key or
/// value are dropped, so `"?"` and `"?a="` both yield an empty mapping.
pub fn decode_query(uri: &str) -> Option<Query> {
    let segment = capture(&QUERY, uri)?;
    Some(parse_pairs(&segment, str::to_owned))
}

/// Fragment after the first `#`, or an empty string.
pub fn decode_hash(uri: &str) -> String {
    capture(&HASH, uri).unwrap_or_default()
}

/// Join `key=value` pairs with `&`, the first one prefixed by `prefix`.
///
/// Every entry is written, empty values included.
pub fn encode_query(query: &Query, prefix: &str) -> String {
    let mut out = String::new();

    for (index, (key, value)) in query.iter().enumerate() {
        out.push_str(if index == 0 { prefix } else { "&" });
        out.push_str(key);
        out.push('=');
        out.push_str(value);
    }

    out
}

pub fn encode_hash(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!("#{value}")
    }
}

pub fn encode_protocol(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!("{value}://")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> Query {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_decode_protocol() {
        assert_eq!(decode_protocol("https://a.com"), "https");
        assert_eq!(decode_protocol("ws://localhost:9000/ws"), "ws");
        assert_eq!(decode_protocol("/users"), "");
        assert_eq!(decode_protocol("a.com/x://y"), "");
        assert_eq!(decode_protocol("svn+ssh://host/repo"), "svn+ssh");
        assert_eq!(decode_protocol(""), "");
    }

    #[test]
    fn test_decode_protocol_stops_at_first_separator() {
        assert_eq!(decode_protocol("http://a.com/redirect?to=ftp://b"), "http");
    }

    #[test]
    fn test_decode_protocol_ignores_url_in_query() {
        assert_eq!(decode_protocol("/redirect?to=http://x"), "");
        assert_eq!(decode_protocol("/redirect?to=http%3A%2F%2Fx"), "");
        assert_eq!(decode_protocol("1http://x"), "");
    }

    #[test]
    fn test_decode_protocol_after_percent_decoding() {
        assert_eq!(decode_protocol("https%3A%2F%2Fa.com"), "https");
    }

    #[test]
    fn test_decode_query() {
        assert_eq!(decode_query("?a=1&b=2"), Some(query(&[("a", "1"), ("b", "2")])));
        assert_eq!(decode_query("https://a.com?x=1#y"), Some(query(&[("x", "1")])));
        assert_eq!(decode_query("?"), Some(Query::new()));
        assert_eq!(decode_query("https://a.com"), None);
    }

    #[test]
    fn test_decode_query_drops_pairs_without_value() {
        assert_eq!(decode_query("/p?a=&b=2&c"), Some(query(&[("b", "2")])));
        assert_eq!(decode_query("/p?flag"), Some(Query::new()));
    }

    #[test]
    fn test_decode_query_percent_decodes_values() {
        assert_eq!(
            decode_query("/search?q=hello%20world"),
            Some(query(&[("q", "hello world")]))
        );
    }

    #[test]
    fn test_decode_query_keeps_invalid_escapes() {
        assert_eq!(decode_query("/p?a=100%"), Some(query(&[("a", "100%")])));
    }

    #[test]
    fn test_decode_hash() {
        assert_eq!(decode_hash("#section"), "section");
        assert_eq!(decode_hash("https://a.com?x=1#y"), "y");
        assert_eq!(decode_hash("https://a.com"), "");
        assert_eq!(decode_hash("https://a.com#"), "");
    }

    #[test]
    fn test_encode_query() {
        let q = query(&[("a", "1"), ("b", "2")]);
        assert_eq!(encode_query(&q, "?"), "?a=1&b=2");
        assert_eq!(encode_query(&q, ""), "a=1&b=2");
        assert_eq!(encode_query(&q, "&"), "&a=1&b=2");
        assert_eq!(encode_query(&Query::new(), "?"), "");
    }

    #[test]
    fn test_encode_query_keeps_empty_values() {
        let q = query(&[("a", ""), ("b", "2")]);
        assert_eq!(encode_query(&q, "?"), "?a=&b=2");
    }

    #[test]
    fn test_query_round_trip() {
        let source = "?page=2&sort=name&dir=asc";
        let decoded = decode_query(source).expect("query");
        let encoded = encode_query(&decoded, "?");
        assert_eq!(decode_query(&encoded), Some(decoded));
    }

    #[test]
    fn test_encode_hash() {
        assert_eq!(encode_hash(""), "");
        assert_eq!(encode_hash("section"), "#section");
        assert_eq!(decode_hash(&encode_hash("section")), "section");
    }

    #[test]
    fn test_encode_protocol() {
        assert_eq!(encode_protocol(""), "");
        assert_eq!(encode_protocol("https"), "https://");
        assert_eq!(decode_protocol(&encode_protocol("https")), "https");
    }
}
