//! Fuzz target: `LineDecoder::feed`
//!
//! Splits the input at an arbitrary point and feeds both halves.  The
//! decoder must never panic, never yield a line over the limit, and
//! never yield a line containing a newline.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use breakerd::protocol::codec::{DecodedLine, LineDecoder};
use libfuzzer_sys::fuzz_target;

const MAX: usize = 64;

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let split = usize::from(split).min(rest.len());

    let mut decoder = LineDecoder::new(MAX);
    decoder.feed(&rest[..split]);
    decoder.feed(&rest[split..]);

    let newlines = rest.iter().filter(|&&b| b == b'\n').count();
    let mut yielded = 0;
    while let Some(line) = decoder.next_line() {
        yielded += 1;
        if let DecodedLine::Line(text) = line {
            assert!(!text.contains('\n'));
            // Lossy decoding may expand each byte to a 3-byte U+FFFD.
            assert!(text.len() <= MAX * 3);
        }
    }
    assert!(yielded <= newlines + 1, "more lines than terminators");

    let _ = decoder.finish();
    decoder.reset();
    assert!(decoder.next_line().is_none());
});
