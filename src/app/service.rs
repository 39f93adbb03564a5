//! Device registry: the hexagonal core.
//!
//! [`DeviceRegistry`] owns the slot pool (through a [`SharedPool`] handle
//! the worker core may also hold), tracks how many slots are registered,
//! and routes host requests to devices by index. All delivery goes through
//! the injected [`Dispatcher`], so the same registry drives a single-core
//! build and the dual-core protocol.
//!
//! ```text
//!  CommandArgs ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!                  │     DeviceRegistry      │
//!    Arena ◀──────│ setup · add · clear · set│──▶ Dispatcher ──▶ devices
//!                  └─────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::arena::Arena;
use crate::dispatch::Dispatcher;
use crate::error::{DispatchError, Result};
use crate::protocol::{self, MESSAGE_ID_POWER_SAVING};
use crate::slots::{SharedPool, SlotPool};

use super::commands::DeviceCommand;
use super::events::RegistryEvent;
use super::ports::{AttachParams, CommandArgs, CustomDevice, EventSink};

// ───────────────────────────────────────────────────────────────
// DeviceRegistry
// ───────────────────────────────────────────────────────────────

pub struct DeviceRegistry<D, P, S> {
    pool: SharedPool<D>,
    dispatch: P,
    sink: S,
}

impl<D, P, S> DeviceRegistry<D, P, S>
where
    D: CustomDevice + Default,
    P: Dispatcher<D>,
    S: EventSink,
{
    /// Wrap an (usually empty) pool. Call [`setup_array`](Self::setup_array)
    /// before adding devices.
    pub fn new(pool: SharedPool<D>, dispatch: P, sink: S) -> Self {
        Self {
            pool,
            dispatch,
            sink,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Carve a pool for `count` devices from `arena`.
    ///
    /// Devices of a previous configuration are detached first. Space
    /// carved by earlier calls stays consumed. On failure the registry is
    /// left empty (capacity 0) and the error is returned.
    pub fn setup_array(&mut self, arena: &mut Arena, count: u16) -> Result<()> {
        let count = usize::from(count);
        let detached = self.pool.with(|p| p.detach_all());
        if detached > 0 {
            debug!("setup_array: detached {} devices of the previous pool", detached);
        }

        match SlotPool::<D>::carve(arena, count) {
            Ok(fresh) => {
                self.pool.with(|p| *p = fresh);
                info!("Device registry ready: {} slots", count);
                self.sink.emit(&RegistryEvent::PoolReady { capacity: count });
                Ok(())
            }
            Err(e) => {
                self.pool.with(|p| *p = SlotPool::empty());
                warn!("Device registry: cannot hold {} devices: {}", count, e);
                self.sink
                    .emit(&RegistryEvent::PoolRejected { requested: count });
                Err(e.into())
            }
        }
    }

    /// Register one more device. Returns its index, or `None` when every
    /// slot is already in use.
    pub fn add(&mut self, params: AttachParams) -> Option<usize> {
        let (added, capacity) = self.pool.with(|p| (p.attach_next(params), p.capacity()));
        match added {
            Some(index) => {
                debug!(
                    "Device {} attached (pin {}, type {})",
                    index, params.pin, params.device_type
                );
                self.sink.emit(&RegistryEvent::DeviceAdded {
                    index,
                    pin: params.pin,
                    device_type: params.device_type,
                });
            }
            None => {
                warn!("Device registry full ({} slots), add ignored", capacity);
                self.sink.emit(&RegistryEvent::RegistryFull { capacity });
            }
        }
        added
    }

    /// Detach every registered device in ascending index order.
    pub fn clear(&mut self) -> usize {
        let detached = self.pool.with(|p| p.detach_all());
        if detached > 0 {
            info!("Device registry cleared ({} detached)", detached);
            self.sink.emit(&RegistryEvent::Cleared { detached });
        }
        detached
    }

    /// Periodic device work on the control core.
    ///
    /// No-op when the worker core does the polling or when updates were
    /// stopped.
    pub fn update(&mut self) {
        if self.dispatch.updates_locally() {
            self.pool.with(|p| p.update_active());
        }
    }

    // ── Device values ─────────────────────────────────────────

    /// Deliver a raw (escaped) value to device `index`.
    ///
    /// Returns `Ok(false)` without touching any device when `index` is not
    /// registered.
    pub fn on_set(
        &mut self,
        index: i16,
        message_id: i16,
        raw: &str,
    ) -> core::result::Result<bool, DispatchError> {
        let Some(slot) = self.registered_index(index) else {
            return Ok(false);
        };

        let payload = protocol::unescape_into(raw);
        debug!("on_set: device {} id {} '{}'", slot, message_id, payload);

        self.dispatch
            .dispatch(&self.pool, slot, message_id, payload)?;
        Ok(true)
    }

    /// Read `index`, `message_id` and the raw value from the current
    /// command frame, then behave like [`on_set`](Self::on_set).
    ///
    /// The remaining arguments are left unread when the index is out of
    /// range.
    pub fn on_set_from(
        &mut self,
        args: &mut impl CommandArgs,
    ) -> core::result::Result<bool, DispatchError> {
        let index = args.read_i16_arg();
        if self.registered_index(index).is_none() {
            return Ok(false);
        }
        let message_id = args.read_i16_arg();
        let raw = args.read_string_arg();
        self.on_set(index, message_id, raw)
    }

    /// Broadcast the power-saving notification to every registered device.
    pub fn power_save(&mut self, enabled: bool) -> core::result::Result<(), DispatchError> {
        let value = if enabled { "1" } else { "0" };
        for index in 0..self.registered() {
            self.dispatch.dispatch(
                &self.pool,
                index,
                MESSAGE_ID_POWER_SAVING,
                protocol::payload_from(value),
            )?;
        }
        info!("Power saving {}", if enabled { "entered" } else { "left" });
        self.sink.emit(&RegistryEvent::PowerSave(enabled));
        Ok(())
    }

    /// Stop (true) or restart (false) periodic device updates.
    pub fn stop_worker_updates(&mut self, stop: bool) -> core::result::Result<(), DispatchError> {
        self.dispatch.stop_updates(stop)?;
        self.sink.emit(&RegistryEvent::WorkerUpdates { stopped: stop });
        Ok(())
    }

    /// Apply a decoded host command.
    pub fn handle_command(&mut self, cmd: DeviceCommand, arena: &mut Arena) -> Result<()> {
        match cmd {
            DeviceCommand::SetupArray(count) => self.setup_array(arena, count)?,
            DeviceCommand::Add(params) => {
                self.add(params);
            }
            DeviceCommand::Clear => {
                self.clear();
            }
            DeviceCommand::Set {
                index,
                message_id,
                raw,
            } => {
                self.on_set(index, message_id, &raw)?;
            }
            DeviceCommand::PowerSave(enabled) => self.power_save(enabled)?,
            DeviceCommand::StopWorkerUpdates(stop) => self.stop_worker_updates(stop)?,
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn registered(&self) -> usize {
        self.pool.registered()
    }

    /// Shared handle to the pool (for the worker core or inspection).
    pub fn pool(&self) -> &SharedPool<D> {
        &self.pool
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn dispatcher(&self) -> &P {
        &self.dispatch
    }

    // ── Internal ──────────────────────────────────────────────

    /// `index` as a slot position when it names a registered device.
    fn registered_index(&mut self, index: i16) -> Option<usize> {
        let registered = self.registered();
        match usize::try_from(index) {
            Ok(slot) if slot < registered => Some(slot),
            _ => {
                debug!(
                    "on_set: index {} outside 0..{}, dropped",
                    index, registered
                );
                self.sink.emit(&RegistryEvent::SetDropped { index });
                None
            }
        }
    }
}
