//! Device-update dispatch.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  DeviceRegistry                                            │
//! │       │ dispatch(index, message_id, payload)               │
//! │       ▼                                                    │
//! │  ┌───────────────┐            ┌─────────────────────────┐  │
//! │  │ LocalDispatch │            │ CoreLink                │  │
//! │  │ (single core) │            │ (dual core, control)    │  │
//! │  └──────┬────────┘            └──────┬──────────────────┘  │
//! │         │ direct call                │ mailbox + 3 words   │
//! │         ▼                            ▼                     │
//! │     SlotPool ◀──────────────── WorkerCore (second core)    │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod fifo;
pub mod frame;
pub mod link;
pub mod mailbox;

use crate::app::ports::CustomDevice;
use crate::error::DispatchError;
use crate::protocol::Payload;
use crate::slots::SharedPool;

/// How the registry gets a value to a device.
pub trait Dispatcher<D> {
    /// Deliver `set(message_id, payload)` to slot `index`.
    ///
    /// Returns only after the device's `set` has returned. `index` has
    /// already been checked against the registered range.
    fn dispatch(
        &mut self,
        pool: &SharedPool<D>,
        index: usize,
        message_id: i16,
        payload: Payload,
    ) -> Result<(), DispatchError>;

    /// Whether the control core should run periodic `update()` itself.
    fn updates_locally(&self) -> bool;

    /// Stop (true) or restart (false) periodic device updates.
    fn stop_updates(&mut self, stop: bool) -> Result<(), DispatchError>;
}

/// Single-core dispatch: call the device directly.
#[derive(Debug, Default)]
pub struct LocalDispatch {
    updates_stopped: bool,
}

impl LocalDispatch {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: CustomDevice + Default> Dispatcher<D> for LocalDispatch {
    fn dispatch(
        &mut self,
        pool: &SharedPool<D>,
        index: usize,
        message_id: i16,
        payload: Payload,
    ) -> Result<(), DispatchError> {
        pool.with(|p| p.set(index, message_id, &payload));
        Ok(())
    }

    fn updates_locally(&self) -> bool {
        !self.updates_stopped
    }

    fn stop_updates(&mut self, stop: bool) -> Result<(), DispatchError> {
        self.updates_stopped = stop;
        Ok(())
    }
}
