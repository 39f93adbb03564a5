//! Custom-device registry for a dual-core I/O expander.
//!
//! The host protocol registers heterogeneous devices by index and sends
//! them values; this crate owns the device slots and gets each value to
//! the right device, either directly (single core) or through a
//! lock-step 3-word FIFO protocol to a worker core.
//!
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module, so the whole crate builds and tests on host.

#![deny(unused_must_use)]

pub mod app;
pub mod arena;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod runtime;
pub mod slots;
pub mod worker;

pub mod adapters;
pub mod drivers;

mod esp_link_shims;
