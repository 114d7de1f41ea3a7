//! Query mapping type.

use indexmap::IndexMap;

/// Query parameters in the order they first appeared.
///
/// A repeated key keeps its first position and takes the last value.
pub type Query = IndexMap<String, String>;

/// Build a [`Query`] from `key=value` pairs separated by `&`.
///
/// Pairs with an empty key or a missing/empty value are dropped.
/// `decode` is applied to every surviving key and value.
pub(crate) fn parse_pairs<F>(segment: &str, decode: F) -> Query
where
    F: Fn(&str) -> String,
{
    let mut query = Query::new();

    for item in segment.split('&') {
        let mut entry = item.split('=');
        let key = entry.next().unwrap_or_default();
        let value = entry.next().unwrap_or_default();

        if key.is_empty() || value.is_empty() {
            continue;
        }

        query.insert(decode(key), decode(value));
    }

    query
}
