//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing registry events to the `log`
//! facade (UART / USB-CDC on the board, nothing on host unless a test
//! installs a logger). A host-status adapter would implement the same
//! trait.

use log::{debug, info, warn};

use crate::app::events::RegistryEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`RegistryEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &RegistryEvent) {
        match event {
            RegistryEvent::PoolReady { capacity } => {
                info!("POOL  | ready, {} slots", capacity);
            }
            RegistryEvent::PoolRejected { requested } => {
                warn!("POOL  | rejected, {} slots do not fit", requested);
            }
            RegistryEvent::DeviceAdded {
                index,
                pin,
                device_type,
            } => {
                debug!("ADD   | #{} pin@{} type@{}", index, pin, device_type);
            }
            RegistryEvent::RegistryFull { capacity } => {
                warn!("ADD   | ignored, all {} slots in use", capacity);
            }
            RegistryEvent::Cleared { detached } => {
                info!("CLEAR | {} devices detached", detached);
            }
            RegistryEvent::SetDropped { index } => {
                debug!("SET   | dropped for index {}", index);
            }
            RegistryEvent::PowerSave(on) => {
                info!("POWER | saving {}", if *on { "on" } else { "off" });
            }
            RegistryEvent::WorkerUpdates { stopped } => {
                info!(
                    "POLL  | periodic updates {}",
                    if *stopped { "stopped" } else { "running" }
                );
            }
        }
    }
}

/// Install the platform logger.
///
/// On ESP-IDF this routes `log` to the IDF console. On host it does
/// nothing; tests that want output install their own logger.
#[cfg(target_os = "espidf")]
pub fn init_logger() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_logger() -> anyhow::Result<()> {
    Ok(())
}
