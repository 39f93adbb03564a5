//! Device slot pool.
//!
//! A fixed-capacity array of [`DeviceSlot`]s carved once from the
//! [`Arena`]. Slots are addressed by index; the pool owns every device
//! instance and reuses slot storage in place when a configuration is
//! cleared and reloaded.
//!
//! ```text
//!  index:  0        1        2        3
//!        ┌────────┬────────┬────────┬────────┐
//!        │ active │ active │inactive│inactive│   registered = 2
//!        └────────┴────────┴────────┴────────┘   capacity   = 4
//! ```
//!
//! Both cores reach the pool through a [`SharedPool`]. The control core
//! mutates it (`attach_next`, `detach_all`); the worker core reads it
//! (`update_active`, `set`).

use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

use crate::app::ports::{AttachParams, CustomDevice};
use crate::arena::{Allocation, Arena};
use crate::error::ArenaError;

// ═══════════════════════════════════════════════════════════════
//  Slot
// ═══════════════════════════════════════════════════════════════

/// One fixed-position record holding a device instance.
#[derive(Debug, Default)]
pub struct DeviceSlot<D> {
    device: D,
    binding: Option<AttachParams>,
}

impl<D: CustomDevice + Default> DeviceSlot<D> {
    /// Put the slot back into its default, inactive state.
    fn reset(&mut self) {
        self.device = D::default();
        self.binding = None;
    }

    fn attach(&mut self, params: AttachParams) {
        self.device.attach(&params);
        self.binding = Some(params);
    }

    fn detach(&mut self) {
        self.device.detach();
        self.binding = None;
    }
}

impl<D> DeviceSlot<D> {
    pub fn is_active(&self) -> bool {
        self.binding.is_some()
    }

    /// Parameters the slot was attached with, if active.
    pub fn binding(&self) -> Option<&AttachParams> {
        self.binding.as_ref()
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

// ═══════════════════════════════════════════════════════════════
//  Pool
// ═══════════════════════════════════════════════════════════════

/// Fixed-capacity slot array plus the count of registered slots.
#[derive(Debug)]
pub struct SlotPool<D> {
    slots: Vec<DeviceSlot<D>>,
    registered: usize,
    region: Option<Allocation>,
}

impl<D> Default for SlotPool<D> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<D> SlotPool<D> {
    /// A pool with no slots (before `setup_array`).
    pub fn empty() -> Self {
        Self {
            slots: Vec::new(),
            registered: 0,
            region: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn registered(&self) -> usize {
        self.registered
    }

    pub fn is_full(&self) -> bool {
        self.registered == self.slots.len()
    }

    /// Arena region backing this pool.
    pub fn region(&self) -> Option<Allocation> {
        self.region
    }

    pub fn slot(&self, index: usize) -> Option<&DeviceSlot<D>> {
        self.slots.get(index)
    }

    /// Device at `index`, active or not.
    pub fn device(&self, index: usize) -> Option<&D> {
        self.slots.get(index).map(DeviceSlot::device)
    }
}

impl<D: CustomDevice + Default> SlotPool<D> {
    /// Bytes a pool of `count` slots takes from the arena.
    pub fn footprint(count: usize) -> Result<usize, ArenaError> {
        count
            .checked_mul(core::mem::size_of::<DeviceSlot<D>>())
            .ok_or(ArenaError::SizeOverflow)
    }

    /// Reserve space for `count` slots and construct them inactive.
    pub fn carve(arena: &mut Arena, count: usize) -> Result<Self, ArenaError> {
        let bytes = Self::footprint(count)?;
        let region = arena.allocate(bytes)?;

        let slots: Vec<DeviceSlot<D>> = (0..count).map(|_| DeviceSlot::default()).collect();
        debug!(
            "SlotPool: {} slots ({} B) at arena offset {}",
            count,
            bytes,
            region.offset()
        );

        Ok(Self {
            slots,
            registered: 0,
            region: Some(region),
        })
    }

    /// Re-initialize and attach the next free slot. Returns its index, or
    /// `None` when the pool is full.
    pub fn attach_next(&mut self, params: AttachParams) -> Option<usize> {
        let index = self.registered;
        let slot = self.slots.get_mut(index)?;
        slot.reset();
        slot.attach(params);
        self.registered += 1;
        Some(index)
    }

    /// Detach every registered slot in ascending order. Returns how many
    /// were detached.
    pub fn detach_all(&mut self) -> usize {
        let count = self.registered;
        for slot in &mut self.slots[..count] {
            slot.detach();
        }
        self.registered = 0;
        count
    }

    /// Run `update()` on every registered slot in index order.
    pub fn update_active(&mut self) {
        for slot in &mut self.slots[..self.registered] {
            slot.device.update();
        }
    }

    /// Forward a value to slot `index`. Returns `false` (and does nothing)
    /// when `index` is not registered.
    pub fn set(&mut self, index: usize, message_id: i16, payload: &str) -> bool {
        if index >= self.registered {
            return false;
        }
        self.slots[index].device.set(message_id, payload);
        true
    }
}

// ═══════════════════════════════════════════════════════════════
//  Shared handle
// ═══════════════════════════════════════════════════════════════

/// Cross-core handle to the pool.
///
/// The lock makes `attach`/`detach` on the control core and
/// `update`/`set` on the worker mutually exclusive. Nobody holds it while
/// waiting on the dispatch FIFO.
pub struct SharedPool<D>(Arc<Mutex<SlotPool<D>>>);

impl<D> Clone for SharedPool<D> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<D> Default for SharedPool<D> {
    fn default() -> Self {
        Self::new(SlotPool::empty())
    }
}

impl<D> SharedPool<D> {
    pub fn new(pool: SlotPool<D>) -> Self {
        Self(Arc::new(Mutex::new(pool)))
    }

    /// Run `f` with exclusive access to the pool. Lock poisoning is ignored.
    pub fn with<R>(&self, f: impl FnOnce(&mut SlotPool<D>) -> R) -> R {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn registered(&self) -> usize {
        self.with(|p| p.registered())
    }

    pub fn capacity(&self) -> usize {
        self.with(|p| p.capacity())
    }
}
