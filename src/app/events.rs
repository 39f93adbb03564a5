//! Outbound registry events.
//!
//! The [`DeviceRegistry`](super::service::DeviceRegistry) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on the
//! other side decide what to do with them: log to serial, report a status
//! line to the host, or record them in a test.

/// Structured events emitted by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A slot pool with `capacity` slots was carved from the arena.
    PoolReady { capacity: usize },

    /// The arena could not hold `requested` slots.
    PoolRejected { requested: usize },

    /// A device was attached at `index`.
    DeviceAdded { index: usize, pin: u16, device_type: u16 },

    /// An add was ignored because every slot is in use.
    RegistryFull { capacity: usize },

    /// All registered devices were detached.
    Cleared { detached: usize },

    /// A set request named an index outside the registered range.
    SetDropped { index: i16 },

    /// Power-saving notification broadcast (true = entering).
    PowerSave(bool),

    /// Periodic device updates stopped (true) or resumed (false).
    WorkerUpdates { stopped: bool },
}
