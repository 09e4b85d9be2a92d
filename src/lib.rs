//! predq — parse human-readable boolean predicates into MongoDB-style
//! query filters.
//!
//! An infix predicate over named conditions,
//!
//! ```text
//! !(draft&&(!mine)&&(open||closed))
//! ```
//!
//! parses into an expression tree ([`ExprTree`]) that can be edited,
//! disambiguated (AND binds tighter than OR) and projected into a
//! structured filter document built from `$and`/`$or`/`$nor` combinators.
//! The [`query`] module provides the filter algebra on the document side:
//! negation ([`query::inverse_filter`]), conjunction merge
//! ([`query::join_and`]) and normalization ([`query::simplify_filter`]).

pub mod error;
pub mod expr;
pub mod query;

pub use error::{Error, Result};
pub use expr::{ExprTree, Group, Item, Node, NodeId, Op};

use std::collections::HashMap;

use serde_json::Value;

/// Parse an infix predicate and project it straight to a filter document,
/// with each key rendered as itself.
pub fn parse_filter(filter: &str) -> Result<Value> {
    Ok(ExprTree::parse(filter)?.to_query())
}

/// Like [`parse_filter`], with keys replaced through a map; a key without
/// an entry fails with [`Error::MissingReplacement`].
pub fn parse_filter_with_map(filter: &str, replace: &HashMap<String, Value>) -> Result<Value> {
    ExprTree::parse(filter)?.to_query_with_map(replace)
}

/// Like [`parse_filter`], with keys replaced through a function.
pub fn parse_filter_with<F>(filter: &str, replace: F) -> Result<Value>
where
    F: Fn(&str) -> Value,
{
    Ok(ExprTree::parse(filter)?.to_query_with(replace))
}
