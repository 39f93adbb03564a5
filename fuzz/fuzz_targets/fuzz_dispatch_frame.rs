//! Fuzz target: `Frame::decode`
//!
//! Interprets arbitrary bytes as a stream of 3-word frames, as the worker
//! core would pop them, and asserts that decoding never panics and that
//! every accepted frame encodes back to the exact words it came from.
//!
//! cargo fuzz run fuzz_dispatch_frame

#![no_main]

use expander::dispatch::frame::{FRAME_WORDS, Frame};
use expander::protocol::PAYLOAD_CAPACITY;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for chunk in data.chunks_exact(4 * FRAME_WORDS) {
        let mut words = [0u32; FRAME_WORDS];
        for (word, bytes) in words.iter_mut().zip(chunk.chunks_exact(4)) {
            *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }

        if let Ok(frame) = Frame::decode(words) {
            assert_eq!(frame.encode(), words, "accepted frame must be canonical");
            if let Frame::Update { payload_len, .. } = frame {
                assert!(usize::from(payload_len) <= PAYLOAD_CAPACITY);
            }
        }
    }
});
