//! Best-effort normalization of a filter document. Not a canonical-form
//! prover: it expands `$nor`, flattens vacuous combinators and re-conjuncts
//! what remains.

use serde_json::{Map, Value};

use super::{inverse_filter, is_empty_object, join_and, omit};

/// Normalize a filter document:
/// - `$nor` expands into a conjunction of its individually inverted members,
/// - `$and` drops vacuous `{}` members, disappears when emptied, and
///   otherwise re-conjuncts its simplified members into the document,
/// - `$or` disappears when empty, merges a single member into the document,
///   and otherwise has its members simplified in place.
pub fn simplify_filter(filter: Value) -> Value {
    let mut map = match filter {
        Value::Object(map) => map,
        other => return other,
    };

    if let Some(Value::Array(members)) = map.get("$nor").cloned() {
        let mut conds = vec![Value::Object(omit(&map, &["$nor"]))];
        conds.extend(members.iter().map(inverse_filter));
        map = match join_and(&conds) {
            Value::Object(joined) => joined,
            other => return other,
        };
    }

    if let Some(Value::Array(mut members)) = map.get("$and").cloned() {
        members.retain(|m| !is_empty_object(m));
        if members.is_empty() {
            map.remove("$and");
        } else {
            let mut conds = vec![Value::Object(omit(&map, &["$and"]))];
            conds.extend(members.into_iter().map(simplify_filter));
            map = match join_and(&conds) {
                Value::Object(joined) => joined,
                other => return other,
            };
        }
    }

    if let Some(Value::Array(members)) = map.get("$or").cloned() {
        if members.is_empty() {
            map.remove("$or");
        } else if let [only] = members.as_slice() {
            let conds = [Value::Object(omit(&map, &["$or"])), only.clone()];
            map = match join_and(&conds) {
                Value::Object(joined) => joined,
                other => return other,
            };
        } else {
            let simplified: Vec<Value> = members.into_iter().map(simplify_filter).collect();
            map.insert("$or".to_string(), Value::Array(simplified));
        }
    }

    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_member_or_merges_into_the_document() {
        assert_eq!(simplify_filter(json!({ "$or": [{ "a": 1 }] })), json!({ "a": 1 }));
        assert_eq!(
            simplify_filter(json!({ "a": 1, "$or": [{ "a": 2 }] })),
            json!({ "a": 1, "$and": [{ "a": 2 }] })
        );
        assert_eq!(
            simplify_filter(json!({ "a": 1, "$or": [{ "b": 2 }] })),
            json!({ "a": 1, "b": 2 })
        );
    }

    #[test]
    fn multi_member_or_is_kept() {
        assert_eq!(
            simplify_filter(json!({ "$or": [{ "a": 1 }, { "b": 2 }] })),
            json!({ "$or": [{ "a": 1 }, { "b": 2 }] })
        );
    }

    #[test]
    fn empty_combinators_disappear() {
        assert_eq!(simplify_filter(json!({ "a": 1, "$or": [] })), json!({ "a": 1 }));
        assert_eq!(simplify_filter(json!({ "a": 1, "$and": [] })), json!({ "a": 1 }));
    }

    #[test]
    fn vacuous_and_members_are_dropped() {
        assert_eq!(
            simplify_filter(json!({ "$and": [{}, { "a": 1 }, {}] })),
            json!({ "a": 1 })
        );
        assert_eq!(simplify_filter(json!({ "$and": [{}, {}] })), json!({}));
    }

    #[test]
    fn and_members_simplify_recursively() {
        assert_eq!(
            simplify_filter(json!({ "$and": [{ "$or": [{ "a": 1 }] }, { "b": 2 }] })),
            json!({ "a": 1, "b": 2 })
        );
    }

    #[test]
    fn nor_expands_into_inverted_conjuncts() {
        assert_eq!(
            simplify_filter(json!({ "$nor": [{ "a": 1 }] })),
            json!({ "a": { "$ne": 1 } })
        );
        assert_eq!(
            simplify_filter(json!({ "x": 1, "$nor": [{ "a": 1 }, { "b": { "$in": [2] } }] })),
            json!({ "x": 1, "a": { "$ne": 1 }, "b": { "$nin": [2] } })
        );
    }

    #[test]
    fn non_objects_pass_through() {
        assert_eq!(simplify_filter(json!("x")), json!("x"));
    }
}
