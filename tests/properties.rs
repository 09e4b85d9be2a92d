//! Property-based tests: generate random expression trees, render them,
//! and check the parser, disambiguator and projector against an independent
//! reference evaluator.
//!
//! The reference model (`TestExpr`) is built first and rendered to a
//! canonical string, so every property has a ground truth that does not go
//! through the code under test.

use std::collections::HashMap;

use proptest::prelude::*;
use serde_json::Value;

use predq::ExprTree;
use predq::query::{inverse_filter, join_and};

const KEYS: &[&str] = &["a", "b", "c", "d", "e"];

#[derive(Debug, Clone, Copy)]
enum TestOp {
    And,
    Or,
}

impl TestOp {
    fn as_str(self) -> &'static str {
        match self {
            TestOp::And => "&&",
            TestOp::Or => "||",
        }
    }
}

/// Reference expression: a leaf or a group of (member, following-op) pairs;
/// the last pair's op is padding.
#[derive(Debug, Clone)]
enum TestExpr {
    Leaf { key: String, negated: bool },
    Group { negated: bool, members: Vec<(TestExpr, TestOp)> },
}

impl TestExpr {
    /// Canonical rendering: groups parenthesized, operators spelled out.
    fn render(&self, out: &mut String) {
        match self {
            TestExpr::Leaf { key, negated } => {
                if *negated {
                    out.push('!');
                }
                out.push_str(key);
            }
            TestExpr::Group { negated, members } => {
                if *negated {
                    out.push('!');
                }
                out.push('(');
                for (i, (member, op)) in members.iter().enumerate() {
                    member.render(out);
                    if i + 1 < members.len() {
                        out.push_str(op.as_str());
                    }
                }
                out.push(')');
            }
        }
    }

    fn rendered(&self) -> String {
        let mut out = String::new();
        self.render(&mut out);
        out
    }

    /// Precedence-aware evaluation: And-runs are conjoined, runs are
    /// disjoined at Or boundaries.
    fn eval(&self, assign: &HashMap<&str, bool>) -> bool {
        match self {
            TestExpr::Leaf { key, negated } => assign[key.as_str()] ^ negated,
            TestExpr::Group { negated, members } => {
                let mut any = false;
                let mut run = true;
                for (i, (member, op)) in members.iter().enumerate() {
                    run &= member.eval(assign);
                    if i + 1 == members.len() || matches!(op, TestOp::Or) {
                        any |= run;
                        run = true;
                    }
                }
                any ^ negated
            }
        }
    }
}

/// Evaluate a projected filter document (bare keys, `$and`/`$or`/`$nor`)
/// under a boolean assignment.
fn eval_doc(doc: &Value, assign: &HashMap<&str, bool>) -> bool {
    match doc {
        Value::String(key) => assign[key.as_str()],
        Value::Object(map) => {
            if let Some(Value::Array(members)) = map.get("$and") {
                members.iter().all(|m| eval_doc(m, assign))
            } else if let Some(Value::Array(members)) = map.get("$or") {
                members.iter().any(|m| eval_doc(m, assign))
            } else if let Some(Value::Array(members)) = map.get("$nor") {
                !members.iter().any(|m| eval_doc(m, assign))
            } else {
                panic!("unexpected filter shape: {doc}");
            }
        }
        other => panic!("unexpected filter value: {other}"),
    }
}

fn all_assignments() -> Vec<HashMap<&'static str, bool>> {
    (0..1u32 << KEYS.len())
        .map(|bits| {
            KEYS.iter()
                .enumerate()
                .map(|(i, key)| (*key, bits & (1 << i) != 0))
                .collect()
        })
        .collect()
}

fn arb_op() -> impl Strategy<Value = TestOp> {
    prop_oneof![Just(TestOp::And), Just(TestOp::Or)]
}

fn arb_leaf() -> impl Strategy<Value = TestExpr> {
    (0..KEYS.len(), any::<bool>()).prop_map(|(i, negated)| TestExpr::Leaf {
        key: KEYS[i].to_string(),
        negated,
    })
}

fn arb_member() -> impl Strategy<Value = TestExpr> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        (
            prop::collection::vec((inner, arb_op()), 1..5),
            any::<bool>(),
        )
            .prop_map(|(members, negated)| TestExpr::Group { members, negated })
    })
}

/// A whole tree: the root is always a group.
fn arb_tree() -> impl Strategy<Value = TestExpr> {
    (
        prop::collection::vec((arb_member(), arb_op()), 1..5),
        any::<bool>(),
    )
        .prop_map(|(members, negated)| TestExpr::Group { members, negated })
}

/// Arbitrary leaf filter documents for the algebra properties.
fn arb_filter_doc() -> impl Strategy<Value = Value> {
    prop_oneof![
        ("[a-d]{1,4}", -50i64..50).prop_map(|(k, v)| serde_json::json!({ k: v })),
        ("[a-d]{1,4}", "[a-z]{0,6}").prop_map(|(k, v)| serde_json::json!({ k: v })),
        ("[a-d]{1,4}", prop::collection::vec(0i64..9, 1..4))
            .prop_map(|(k, v)| serde_json::json!({ k: { "$in": v } })),
        ("[a-d]{1,4}", any::<bool>())
            .prop_map(|(k, v)| serde_json::json!({ k: { "$exists": v } })),
    ]
}

proptest! {
    /// Canonical strings round-trip bit for bit.
    #[test]
    fn roundtrip_canonical(expr in arb_tree()) {
        let rendered = expr.rendered();
        let tree = ExprTree::parse(&rendered).unwrap();
        prop_assert_eq!(tree.to_string(), rendered);
    }

    /// Disambiguation applied twice prints the same as applied once.
    #[test]
    fn disambiguate_idempotent(expr in arb_tree()) {
        let mut tree = ExprTree::parse(&expr.rendered()).unwrap();
        tree.disambiguate();
        let once = tree.to_string();
        tree.disambiguate();
        prop_assert_eq!(tree.to_string(), once);
    }

    /// Disambiguation only regroups; the key sequence is untouched.
    #[test]
    fn disambiguate_preserves_keys(expr in arb_tree()) {
        let mut tree = ExprTree::parse(&expr.rendered()).unwrap();
        let before = tree.keys();
        tree.disambiguate();
        prop_assert_eq!(tree.keys(), before);
    }

    /// The projected document has the same truth table as the reference
    /// model, for every assignment — parser, disambiguator and projector
    /// all preserve meaning.
    #[test]
    fn projection_preserves_truth(expr in arb_tree()) {
        let tree = ExprTree::parse(&expr.rendered()).unwrap();
        let doc = tree.to_query();
        for assign in all_assignments() {
            prop_assert_eq!(
                eval_doc(&doc, &assign),
                expr.eval(&assign),
                "diverged for {:?} under {:?}", expr, assign
            );
        }
    }

    /// Explicit disambiguation does not change the truth table either.
    #[test]
    fn disambiguate_preserves_truth(expr in arb_tree()) {
        let mut tree = ExprTree::parse(&expr.rendered()).unwrap();
        tree.disambiguate();
        let doc = tree.to_query();
        for assign in all_assignments() {
            prop_assert_eq!(eval_doc(&doc, &assign), expr.eval(&assign));
        }
    }

    /// De Morgan over $and: negation distributes into $or of negations.
    #[test]
    fn inverse_of_and_is_or_of_inverses(a in arb_filter_doc(), b in arb_filter_doc()) {
        let and = serde_json::json!({ "$and": [a.clone(), b.clone()] });
        let expected = serde_json::json!({ "$or": [inverse_filter(&a), inverse_filter(&b)] });
        prop_assert_eq!(inverse_filter(&and), expected);
    }

    /// De Morgan over $or: negation becomes the conjunction merge of the
    /// negated members.
    #[test]
    fn inverse_of_or_is_join_of_inverses(a in arb_filter_doc(), b in arb_filter_doc()) {
        let or = serde_json::json!({ "$or": [a.clone(), b.clone()] });
        let expected = join_and(&[inverse_filter(&a), inverse_filter(&b)]);
        prop_assert_eq!(inverse_filter(&or), expected);
    }

    /// Complementary operators make double negation the exact identity.
    #[test]
    fn double_negation_on_complementary_operators(
        key in "[a-d]{1,4}",
        list in prop::collection::vec(0i64..9, 1..4),
        exists in any::<bool>(),
    ) {
        let in_doc = serde_json::json!({ (key.clone()): { "$in": list } });
        prop_assert_eq!(inverse_filter(&inverse_filter(&in_doc)), in_doc);

        let exists_doc = serde_json::json!({ key: { "$exists": exists } });
        prop_assert_eq!(inverse_filter(&inverse_filter(&exists_doc)), exists_doc);
    }
}
