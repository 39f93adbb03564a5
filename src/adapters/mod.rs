//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements | Connects to            |
//! |------------|------------|------------------------|
//! | `log_sink` | EventSink  | Serial log output      |
//! | `time`     | Clock      | ESP32 system timer     |

pub mod log_sink;
pub mod time;
