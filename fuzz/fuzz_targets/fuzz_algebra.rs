#![no_main]
use libfuzzer_sys::fuzz_target;

// Feed arbitrary JSON documents to the filter algebra.
// Goal: no panics, no non-termination in inversion, merging or
// simplification, whatever the document shape.
fuzz_target!(|data: &[u8]| {
    let Ok(doc) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    let inverted = predq::query::inverse_filter(&doc);
    let _ = predq::query::inverse_filter(&inverted);
    let _ = predq::query::join_and(&[doc.clone(), inverted]);
    let _ = predq::query::simplify_filter(doc);
});
