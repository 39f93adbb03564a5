//! Reserved values and payload handling shared by both cores.

use log::warn;

/// Message id reserved for the power-saving notification.
pub const MESSAGE_ID_POWER_SAVING: i16 = -2;

/// Device index reserved for the start/stop-local-polling control command.
pub const START_STOP_WORKER: i16 = -1;

/// Maximum payload length in bytes. The host protocol limits values to
/// about 90 bytes.
pub const PAYLOAD_CAPACITY: usize = 96;

/// Escape character of the host protocol.
pub const ESCAPE_CHAR: char = '/';

/// Bounded payload string handed to devices.
pub type Payload = heapless::String<PAYLOAD_CAPACITY>;

/// Copy `raw` into a [`Payload`], truncating at a char boundary.
pub fn payload_from(raw: &str) -> Payload {
    let mut out = Payload::new();
    for ch in raw.chars() {
        if out.push(ch).is_err() {
            warn!(
                "Payload truncated to {} of {} bytes",
                out.len(),
                raw.len()
            );
            break;
        }
    }
    out
}

/// Unescape `raw` while copying it into a [`Payload`].
///
/// The character after an escape is kept literally, so `//` becomes `/`
/// and `/,` becomes `,`. A trailing lone escape character is dropped.
/// The whole input is read; only the unescaped output is truncated, at a
/// char boundary.
pub fn unescape_into(raw: &str) -> Payload {
    let mut out = Payload::new();
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        let literal = if ch == ESCAPE_CHAR {
            match chars.next() {
                Some(next) => next,
                None => break,
            }
        } else {
            ch
        };
        if out.push(literal).is_err() {
            warn!(
                "Payload truncated to {} bytes (escaped input {} bytes)",
                out.len(),
                raw.len()
            );
            break;
        }
    }
    out
}
