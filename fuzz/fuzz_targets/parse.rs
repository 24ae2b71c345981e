// fuzz_targets/parse.rs
#![no_main]

use gsrf::{format, parse};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    match parse(s) {
        Ok(sym) => {
            let text = format(&sym);
            let back = parse(&text).unwrap_or_else(|e| panic!("{s:?} -> {text:?}: {e}"));
            assert_eq!(back, sym, "{s:?} -> {text:?}");
        }
        Err(err) => {
            assert!(err.span.range().end <= s.len());
        }
    }

    let _ = gsrf::from_trace(s);
    let _ = gsrf::from_ssa(s);
});
