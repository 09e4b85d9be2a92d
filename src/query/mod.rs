//! Algebra over structured query-filter documents.
//!
//! A filter document is a `serde_json::Value`: a leaf maps a key to a
//! literal (implicit equality) or an operator object (`{"$ne": …}`,
//! `{"$in": […]}`, …); composites are `{"$and": […]}`, `{"$or": […]}` and
//! `{"$nor": […]}`. These operations are pure functions on documents and
//! are independent of the expression tree, though they compose with its
//! projection output.

mod invert;
mod join;
mod simplify;

pub use invert::inverse_filter;
pub use join::join_and;
pub use simplify::simplify_filter;

use serde_json::{Map, Value};

/// Reserved combinator keys.
pub(crate) const COMBINATORS: [&str; 3] = ["$and", "$or", "$nor"];

/// A vacuous filter: `{}` matches everything.
pub(crate) fn is_empty_object(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.is_empty())
}

/// Keys present in both documents, in `a`'s order.
pub(crate) fn intersection_keys(a: &Map<String, Value>, b: &Map<String, Value>) -> Vec<String> {
    a.keys().filter(|k| b.contains_key(*k)).cloned().collect()
}

/// The subset of `map` restricted to `keys`.
pub(crate) fn pick(map: &Map<String, Value>, keys: &[String]) -> Map<String, Value> {
    keys.iter()
        .filter_map(|k| map.get(k).map(|v| (k.clone(), v.clone())))
        .collect()
}

/// `map` without `keys`.
pub(crate) fn omit(map: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    map.iter()
        .filter(|(k, _)| !keys.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
