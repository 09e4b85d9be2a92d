//! Projection of an expression tree into a structured query-filter document.
//!
//! Keys can be replaced on the way out: a map (missing entries are an
//! error), a function, or — with neither — the bare key as a JSON string.
//! Negated nodes are expanded with De Morgan's laws so the emitted document
//! never contains a bare NOT of a combinator.

use std::collections::HashMap;

use serde_json::{Value, json};

use super::{ExprTree, Node, NodeId, Op};
use crate::error::{Error, Result};

enum Replacer<'a> {
    Key,
    Map(&'a HashMap<String, Value>),
    Func(&'a dyn Fn(&str) -> Value),
}

impl Replacer<'_> {
    fn resolve(&self, key: &str) -> Result<Value> {
        match self {
            Replacer::Key => Ok(Value::String(key.to_string())),
            Replacer::Map(map) => map
                .get(key)
                .cloned()
                .ok_or_else(|| Error::MissingReplacement(key.to_string())),
            Replacer::Func(f) => Ok(f(key)),
        }
    }
}

impl ExprTree {
    /// Project to a filter document with each key rendered as itself.
    pub fn to_query(&self) -> Value {
        match self.project(&Replacer::Key) {
            Ok(value) => value,
            Err(_) => unreachable!("bare-key projection cannot fail"),
        }
    }

    /// Project with keys replaced through `replace`; a key without an entry
    /// fails with [`Error::MissingReplacement`].
    pub fn to_query_with_map(&self, replace: &HashMap<String, Value>) -> Result<Value> {
        self.project(&Replacer::Map(replace))
    }

    /// Project with keys replaced through a function.
    pub fn to_query_with<F>(&self, replace: F) -> Value
    where
        F: Fn(&str) -> Value,
    {
        match self.project(&Replacer::Func(&replace)) {
            Ok(value) => value,
            Err(_) => unreachable!("function projection cannot fail"),
        }
    }

    fn project(&self, replace: &Replacer<'_>) -> Result<Value> {
        // Work on a disambiguated clone; the source tree keeps its shape.
        let mut clone = self.clone();
        clone.disambiguate();
        clone.project_node(clone.root_id(), replace)
    }

    fn project_node(&self, id: NodeId, replace: &Replacer<'_>) -> Result<Value> {
        match self.node(id) {
            Node::Item(item) => {
                let value = replace.resolve(&item.key)?;
                Ok(if item.negated {
                    invert_projection(value)
                } else {
                    value
                })
            }
            Node::Group(group) => {
                let mut items = Vec::with_capacity(group.members.len());
                for member in &group.members {
                    items.push(self.project_node(member.node, replace)?);
                }
                // The first connecting operator decides the combinator;
                // single-member groups default to $and.
                let value = match group.members.first().map(|m| m.op) {
                    Some(Op::Or) if group.members.len() > 1 => json!({ "$or": items }),
                    _ => json!({ "$and": items }),
                };
                Ok(if group.negated {
                    invert_projection(value)
                } else {
                    value
                })
            }
        }
    }
}

/// De Morgan expansion of NOT over an already-projected document.
/// Disambiguation guarantees at most one NOT per node, so double negation
/// never reaches this.
pub(crate) fn invert_projection(value: Value) -> Value {
    if let Value::Object(map) = &value {
        if let Some(Value::Array(members)) = map.get("$and") {
            if let [only] = members.as_slice() {
                return invert_projection(only.clone());
            }
            let negated: Vec<Value> = members.iter().cloned().map(invert_projection).collect();
            return json!({ "$or": negated });
        }
        if let Some(Value::Array(members)) = map.get("$or") {
            if let [only] = members.as_slice() {
                return invert_projection(only.clone());
            }
            // !(a || b) is nor(a, b), members unchanged
            return json!({ "$nor": members });
        }
        if let Some(Value::Array(members)) = map.get("$nor") {
            if let [only] = members.as_slice() {
                return only.clone();
            }
            return json!({ "$or": members });
        }
    }
    json!({ "$nor": [value] })
}
