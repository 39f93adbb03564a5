//! Single-slot payload hand-off between the cores.
//!
//! The control core moves the payload in before pushing an update frame;
//! the worker moves it out when it pops the frame. A payload therefore has
//! exactly one owner at any time, and a second `put` before the worker's
//! `take` is refused instead of overwriting the pending value.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::error::DispatchError;
use crate::protocol::Payload;

pub struct PayloadMailbox {
    slot: Mutex<CriticalSectionRawMutex, RefCell<Option<Payload>>>,
}

impl Default for PayloadMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadMailbox {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(None)),
        }
    }

    /// Move `payload` in. Fails if the previous one was not taken yet.
    pub fn put(&self, payload: Payload) -> Result<(), DispatchError> {
        self.slot.lock(|cell| {
            let mut slot = cell.borrow_mut();
            if slot.is_some() {
                return Err(DispatchError::PayloadBusy);
            }
            *slot = Some(payload);
            Ok(())
        })
    }

    /// Move the pending payload out, leaving the mailbox empty.
    pub fn take(&self) -> Option<Payload> {
        self.slot.lock(|cell| cell.borrow_mut().take())
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock(|cell| cell.borrow().is_none())
    }
}
