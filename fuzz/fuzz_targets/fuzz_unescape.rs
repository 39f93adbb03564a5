//! Fuzz target: `protocol::unescape_into`
//!
//! Feeds arbitrary UTF-8 values through the same path `on_set` uses and
//! checks the bounded payload never exceeds capacity or the input.
//!
//! cargo fuzz run fuzz_unescape

#![no_main]

use expander::protocol::{self, PAYLOAD_CAPACITY};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = core::str::from_utf8(data) else {
        return;
    };

    let payload = protocol::unescape_into(raw);
    assert!(payload.len() <= PAYLOAD_CAPACITY);
    assert!(payload.len() <= raw.len(), "unescape must never grow the value");

    // Without escape characters the value is copied as-is, up to capacity.
    if !raw.contains(protocol::ESCAPE_CHAR) {
        assert!(raw.starts_with(payload.as_str()));
        assert_eq!(payload, protocol::payload_from(raw));
    }
});
