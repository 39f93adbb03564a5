//! Expander runtime configuration
//!
//! All tunable parameters for the custom-device core.
//! Values are supplied by the board bring-up code; loading them from
//! storage is the job of the caller.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How device updates reach the devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchMode {
    /// Everything runs on the control core; `set` is called directly.
    SingleCore,
    /// `set` and periodic `update` run on the worker core.
    DualCore,
}

/// Core expander configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpanderConfig {
    // --- Memory ---
    /// Size of the device memory arena in bytes
    pub arena_bytes: usize,

    // --- Dispatch ---
    /// Single- or dual-core dispatch
    pub mode: DispatchMode,
    /// Whether the device type implements a periodic `update()`
    pub device_has_update: bool,
    /// Worker-core poll interval (milliseconds); `None` polls every loop pass
    pub worker_poll_interval_ms: Option<u32>,
    /// Give up on a worker handshake after this long; `None` waits forever
    pub handshake_timeout_ms: Option<u32>,

    // --- Worker task ---
    /// Worker thread priority (ESP-IDF only)
    pub worker_priority: u8,
    /// Worker thread stack size (KiB)
    pub worker_stack_kb: usize,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            // Memory
            arena_bytes: 4096,

            // Dispatch
            mode: DispatchMode::DualCore,
            device_has_update: true,
            worker_poll_interval_ms: Some(10),
            handshake_timeout_ms: None,

            // Worker task
            worker_priority: 10,
            worker_stack_kb: 8,
        }
    }
}

impl ExpanderConfig {
    /// Single-core variant of the defaults.
    pub fn single_core() -> Self {
        Self {
            mode: DispatchMode::SingleCore,
            ..Self::default()
        }
    }

    /// Reject values that would make the core unusable.
    pub fn validate(&self) -> Result<()> {
        if self.arena_bytes == 0 {
            return Err(Error::Config("arena_bytes must be non-zero"));
        }
        if self.worker_stack_kb == 0 {
            return Err(Error::Config("worker_stack_kb must be non-zero"));
        }
        if self.worker_poll_interval_ms == Some(0) {
            return Err(Error::Config("worker_poll_interval_ms must be non-zero when set"));
        }
        if self.handshake_timeout_ms == Some(0) {
            return Err(Error::Config("handshake_timeout_ms must be non-zero when set"));
        }
        Ok(())
    }
}
