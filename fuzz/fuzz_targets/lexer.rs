// fuzz_targets/lexer.rs
#![no_main]

use gsrf::lexer::Lexer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let mut lx = Lexer::new(&s);

    let mut last_end = 0usize;
    let mut steps = 0usize;
    let max_steps = s.len() + 1;

    for (start, _tok, end) in lx.by_ref() {
        assert!(start < end);
        assert!(end <= s.len());
        assert!(start >= last_end);
        last_end = end;

        steps += 1;
        assert!(steps <= max_steps);
    }

    // Every lexical error is reported exactly once.
    let errors = Lexer::new(&s).filter(|(_, t, _)| matches!(t, gsrf::lexer::Tok::Error)).count();
    assert_eq!(errors, lx.take_diags().len());
});
