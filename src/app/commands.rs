//! Inbound commands to the device registry.
//!
//! These represent actions requested by the host protocol layer after it
//! decoded a command frame. The
//! [`DeviceRegistry`](super::service::DeviceRegistry) interprets them.

use super::ports::AttachParams;

/// Commands the host protocol can send into the registry.
#[derive(Debug, Clone)]
pub enum DeviceCommand {
    /// Carve a pool for `count` devices (start of a configuration load).
    SetupArray(u16),

    /// Register one more device.
    Add(AttachParams),

    /// Detach every device (a new configuration is about to be loaded).
    Clear,

    /// Deliver a raw (still escaped) value to device `index`. The text is
    /// kept whole; it is bounded only after unescaping.
    Set {
        index: i16,
        message_id: i16,
        raw: String,
    },

    /// Enter (true) or leave (false) power-saving mode.
    PowerSave(bool),

    /// Stop (true) or restart (false) periodic device updates.
    StopWorkerUpdates(bool),
}
