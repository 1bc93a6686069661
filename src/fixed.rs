/*!
 * Fixed No-Free Allocator
 * Bump allocator over a fixed arena, used as a fallback source
 */

use crate::traits::FallbackAllocator;
use crate::types::{align_up, Address, Size};
use std::sync::atomic::{AtomicU64, Ordering};

/// Bump allocator over a fixed address range `[base, base + capacity)`.
///
/// Hands out strictly increasing, aligned addresses and never takes
/// them back: `free` is a no-op because the arena belongs to whoever
/// supplied it and cannot be returned piecemeal. A `ReuseAllocator`
/// layered on top provides the reuse.
///
/// The cursor is a single atomic, so concurrent carving is safe even
/// though the allocators built on top of this one are not synchronized.
#[derive(Debug)]
pub struct FixedNoFreeAllocator {
    base: Address,
    capacity: Size,
    /// Bytes consumed from the front of the arena
    cursor: AtomicU64,
}

impl FixedNoFreeAllocator {
    pub fn new(base: Address, capacity: Size) -> Self {
        Self {
            base,
            capacity,
            cursor: AtomicU64::new(0),
        }
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn capacity(&self) -> Size {
        self.capacity
    }

    /// Bytes consumed so far, alignment padding included
    pub fn allocated(&self) -> Size {
        self.cursor.load(Ordering::SeqCst).min(self.capacity)
    }
}

impl FallbackAllocator for FixedNoFreeAllocator {
    fn allocate_aligned(&self, size: Size, alignment: Size) -> Option<Address> {
        let alignment = alignment.max(1);
        let mut current = self.cursor.load(Ordering::SeqCst);

        loop {
            let aligned = align_up(self.base + current, alignment);
            let end = aligned.checked_add(size)?;
            if end > self.base + self.capacity {
                return None;
            }

            match self.cursor.compare_exchange_weak(
                current,
                end - self.base,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return Some(aligned),
                Err(observed) => current = observed,
            }
        }
    }

    fn free(&self, _address: Address) {
        // Memory is never returned to the arena provider.
    }
}
