//! Logical negation of a filter document via De Morgan's laws.

use serde_json::{Map, Value, json};

use super::join_and;

/// Negate a structured filter document.
///
/// Complementary operators swap directly (`$in`↔`$nin`,
/// `$exists: b`↔`!b`); any other operator object — `$gt`, `$lt`, `$regex`,
/// multi-operator ranges — is wrapped in `$not` rather than rewritten, a
/// deliberate limitation. Plain values negate to `$ne`.
pub fn inverse_filter(filter: &Value) -> Value {
    let map = match filter {
        Value::Object(map) => map,
        // not expected from well-formed input
        other => return json!({ "$nor": [other] }),
    };

    if map.is_empty() {
        return json!({});
    }

    if map.len() > 1 {
        // {a: …, b: …} is an implicit AND; negate each key independently
        let parts: Vec<Value> = map
            .iter()
            .map(|(key, value)| inverse_filter(&leaf(key, value.clone())))
            .collect();
        return json!({ "$or": parts });
    }

    let (key, value) = match map.iter().next() {
        Some(entry) => entry,
        None => return json!({}),
    };

    match key.as_str() {
        // !(A && B) => !A || !B
        "$and" => {
            if let Value::Array(members) = value {
                if let [only] = members.as_slice() {
                    return inverse_filter(only);
                }
                let negated: Vec<Value> = members.iter().map(inverse_filter).collect();
                return json!({ "$or": negated });
            }
        }
        "$nor" => {
            if let Value::Array(members) = value {
                if let [only] = members.as_slice() {
                    return only.clone();
                }
                return json!({ "$or": members });
            }
        }
        // !(A || B) => !A && !B
        "$or" => {
            if let Value::Array(members) = value {
                let negated: Vec<Value> = members.iter().map(inverse_filter).collect();
                return join_and(&negated);
            }
        }
        _ => {}
    }

    if let Value::Object(operators) = value {
        let first_is_operator = operators
            .keys()
            .next()
            .is_some_and(|k| k.starts_with('$'));
        if first_is_operator {
            if operators.len() == 1 {
                if let Some(list) = operators.get("$in") {
                    return leaf(key, json!({ "$nin": list }));
                }
                if let Some(list) = operators.get("$nin") {
                    return leaf(key, json!({ "$in": list }));
                }
                if let Some(Value::Bool(exists)) = operators.get("$exists") {
                    return leaf(key, json!({ "$exists": !exists }));
                }
            }
            return leaf(key, json!({ "$not": value }));
        }
    }

    leaf(key, json!({ "$ne": value }))
}

fn leaf(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}
