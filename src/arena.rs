//! Bump-pointer memory arena for device storage.
//!
//! The arena is the process-lifetime memory budget the registry carves its
//! slot pool from. It has a single cursor that only moves forward: there is
//! no way to free an individual allocation, only to ask whether a request
//! still fits.
//!
//! ```text
//!  0                      cursor                        size
//!  ├──────── used ───────────┼───────── remaining ───────┤
//! ```

use log::debug;

use crate::error::ArenaError;

/// Opaque handle for a region handed out by [`Arena::allocate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    offset: usize,
    len: usize,
}

impl Allocation {
    /// Byte offset of the region inside the arena.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the region in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Bump allocator with a fixed total size.
#[derive(Debug)]
pub struct Arena {
    size: usize,
    cursor: usize,
}

impl Arena {
    pub fn new(size: usize) -> Self {
        Self { size, cursor: 0 }
    }

    /// True iff `size` bytes remain between the cursor and the end.
    pub fn fits(&self, size: usize) -> bool {
        size <= self.remaining()
    }

    /// Advance the cursor by `size` and return the region it covered.
    ///
    /// Fails without touching the cursor when the request does not fit.
    pub fn allocate(&mut self, size: usize) -> Result<Allocation, ArenaError> {
        if !self.fits(size) {
            return Err(ArenaError::Exhausted {
                requested: size,
                remaining: self.remaining(),
            });
        }

        let offset = self.cursor;
        self.cursor += size;
        debug!(
            "Arena: {} B at offset {} ({} B left)",
            size,
            offset,
            self.remaining()
        );
        Ok(Allocation { offset, len: size })
    }

    /// Bytes remaining in the arena.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.size - self.cursor
    }

    /// Total capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.size
    }

    /// Bytes currently allocated.
    #[inline]
    pub fn used(&self) -> usize {
        self.cursor
    }
}
