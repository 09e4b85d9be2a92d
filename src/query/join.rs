//! Conjunction merge: the logical AND of several filter documents.

use serde_json::{Map, Value};

use super::{COMBINATORS, intersection_keys, pick};

/// Combine documents into their logical AND by a pairwise left fold.
///
/// Non-overlapping keys merge at the top level. A key present on both sides
/// would collide, so instead of overwriting, the second side's entries for
/// the colliding keys are appended as one sub-document of an explicit
/// `$and` array — both constraints survive:
/// `join_and(&[{a:1}, {a:2}])` is `{a:1, $and:[{a:2}]}`.
///
/// Combinator keys are not ordinary collisions: `$and` arrays concatenate,
/// and a `$or`/`$nor` present on both sides moves the second side's
/// combinator into the `$and` array as its own sub-document.
pub fn join_and(conds: &[Value]) -> Value {
    let mut conds = conds.iter();
    let Some(first) = conds.next() else {
        return Value::Object(Map::new());
    };
    conds.fold(first.clone(), merge_two)
}

fn merge_two(first: Value, second: &Value) -> Value {
    let (mut merged, second) = match (first, second) {
        (Value::Object(first), Value::Object(second)) => (first, second),
        // non-objects don't merge; keep the accumulator
        (first, _) => return first,
    };

    let (combinator_shared, plain_shared): (Vec<String>, Vec<String>) =
        intersection_keys(&merged, second)
            .into_iter()
            .partition(|k| COMBINATORS.contains(&k.as_str()));

    for (key, value) in second {
        if !merged.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }

    if combinator_shared.iter().any(|k| k == "$and") {
        if let (Some(Value::Array(ours)), Some(Value::Array(theirs))) =
            (merged.get_mut("$and"), second.get("$and"))
        {
            ours.extend(theirs.iter().cloned());
        }
    }

    let mut extra: Vec<Value> = Vec::new();
    for key in &combinator_shared {
        if key != "$and" {
            if let Some(value) = second.get(key) {
                let mut sub = Map::new();
                sub.insert(key.clone(), value.clone());
                extra.push(Value::Object(sub));
            }
        }
    }
    if !plain_shared.is_empty() {
        extra.push(Value::Object(pick(second, &plain_shared)));
    }
    if !extra.is_empty() {
        match merged.get_mut("$and") {
            Some(Value::Array(arr)) => arr.extend(extra),
            _ => {
                merged.insert("$and".to_string(), Value::Array(extra));
            }
        }
    }

    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn disjoint_keys_merge_flat() {
        assert_eq!(
            join_and(&[json!({ "a": 1 }), json!({ "b": 2 })]),
            json!({ "a": 1, "b": 2 })
        );
    }

    #[test]
    fn colliding_keys_land_in_an_and_array() {
        assert_eq!(
            join_and(&[json!({ "a": 1 }), json!({ "a": 2 })]),
            json!({ "a": 1, "$and": [{ "a": 2 }] })
        );
    }

    #[test]
    fn collisions_accumulate_across_the_fold() {
        assert_eq!(
            join_and(&[json!({ "a": 1 }), json!({ "a": 2 }), json!({ "a": 3 })]),
            json!({ "a": 1, "$and": [{ "a": 2 }, { "a": 3 }] })
        );
    }

    #[test]
    fn mixed_collision_picks_only_shared_keys() {
        assert_eq!(
            join_and(&[json!({ "a": 1, "b": 2 }), json!({ "a": 9, "c": 3 })]),
            json!({ "a": 1, "b": 2, "c": 3, "$and": [{ "a": 9 }] })
        );
    }

    #[test]
    fn and_arrays_concatenate() {
        assert_eq!(
            join_and(&[
                json!({ "x": 1, "$and": [{ "p": 1 }] }),
                json!({ "y": 2, "$and": [{ "q": 2 }] }),
            ]),
            json!({ "x": 1, "y": 2, "$and": [{ "p": 1 }, { "q": 2 }] })
        );
    }

    #[test]
    fn shared_or_moves_into_the_and_array() {
        assert_eq!(
            join_and(&[
                json!({ "$or": [{ "a": 1 }, { "b": 2 }] }),
                json!({ "$or": [{ "c": 3 }, { "d": 4 }] }),
            ]),
            json!({
                "$or": [{ "a": 1 }, { "b": 2 }],
                "$and": [{ "$or": [{ "c": 3 }, { "d": 4 }] }],
            })
        );
    }

    #[test]
    fn trivial_arities() {
        assert_eq!(join_and(&[]), json!({}));
        assert_eq!(join_and(&[json!({ "a": 1 })]), json!({ "a": 1 }));
        assert_eq!(
            join_and(&[json!({}), json!({ "a": 1 })]),
            json!({ "a": 1 })
        );
    }
}
