#![no_main]
use libfuzzer_sys::fuzz_target;

// Feed arbitrary UTF-8 strings to the predicate parser.
// Catches panics and non-termination; accepted inputs must also survive
// stringify → reparse and projection.
fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(tree) = predq::ExprTree::parse(s) else {
        return;
    };

    // Canonical output reparses to the same canonical output.
    let canonical = tree.to_string();
    let reparsed = predq::ExprTree::parse(&canonical)
        .unwrap_or_else(|e| panic!("canonical form failed to reparse: {canonical:?}: {e}"));
    assert_eq!(reparsed.to_string(), canonical);

    let _ = tree.keys();
    let _ = tree.to_query();
});
