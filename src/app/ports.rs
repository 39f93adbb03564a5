//! Port traits: the boundary between the registry core and the outside world.
//!
//! ```text
//!   Host protocol ──▶ CommandArgs ──▶ DeviceRegistry ──▶ CustomDevice
//!                                         │
//!                                         └──▶ EventSink
//! ```
//!
//! Device implementations (stepper, servo, display, ...) implement
//! [`CustomDevice`]; the registry never knows which concrete peripheral
//! sits behind a slot. The serial command layer implements
//! [`CommandArgs`], the platform implements [`Clock`].

// ───────────────────────────────────────────────────────────────
// Device contract (domain → peripheral)
// ───────────────────────────────────────────────────────────────

/// Where a device reads its configuration block from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Configuration lives in persistent storage (flash).
    Persistent,
    /// Configuration lives in volatile memory (EEPROM image in RAM).
    Volatile,
}

impl ConfigSource {
    /// Map the host protocol's "config from flash" flag.
    pub fn from_flash(from_flash: bool) -> Self {
        if from_flash {
            Self::Persistent
        } else {
            Self::Volatile
        }
    }
}

/// Everything a slot was attached with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachParams {
    /// Address of the pin list in the configuration.
    pub pin: u16,
    /// Address of the device type string.
    pub device_type: u16,
    /// Address of the device configuration block.
    pub config: u16,
    pub source: ConfigSource,
}

impl AttachParams {
    pub fn new(pin: u16, device_type: u16, config: u16, config_from_flash: bool) -> Self {
        Self {
            pin,
            device_type,
            config,
            source: ConfigSource::from_flash(config_from_flash),
        }
    }
}

/// Uniform capability set every custom device exposes.
///
/// Message id [`MESSAGE_ID_POWER_SAVING`](crate::protocol::MESSAGE_ID_POWER_SAVING)
/// is reserved; implementations must not give it their own meaning.
pub trait CustomDevice {
    /// Bind hardware resources (pin modes, buses) for the given parameters.
    fn attach(&mut self, params: &AttachParams);

    /// Release everything `attach` acquired.
    fn detach(&mut self);

    /// Periodic work that does not depend on a new value from the host.
    fn update(&mut self);

    /// A new value for `message_id` arrived. `payload` is borrowed for the
    /// duration of the call only.
    fn set(&mut self, message_id: i16, payload: &str);
}

// ───────────────────────────────────────────────────────────────
// Command argument port (host protocol → domain)
// ───────────────────────────────────────────────────────────────

/// Reads typed arguments from the command frame currently being processed.
pub trait CommandArgs {
    fn read_i16_arg(&mut self) -> i16;

    /// Raw (still escaped) string argument.
    fn read_string_arg(&mut self) -> &str;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / host status)
// ───────────────────────────────────────────────────────────────

/// The registry emits [`RegistryEvent`](super::events::RegistryEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::RegistryEvent);
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock. Wraps at `u32::MAX`; compare with
/// `wrapping_sub`.
pub trait Clock {
    fn now_ms(&self) -> u32;
}
