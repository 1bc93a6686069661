/*!
 * Memory Pool
 * Self-contained arena: fixed bump source with a reuse allocator on top
 */

use crate::fixed::FixedNoFreeAllocator;
use crate::reuse::ReuseAllocator;
use crate::types::{Address, AllocResult, AllocatorStats, Size};
use log::info;
use std::sync::Arc;

/// A pre-sized memory arena.
///
/// Composes a [`FixedNoFreeAllocator`] carved from one externally
/// supplied region with a [`ReuseAllocator`] on top, so the region is
/// committed lazily from the front while freed blocks get recycled.
#[derive(Debug)]
pub struct MemoryPool {
    arena: Arc<FixedNoFreeAllocator>,
    reuse: ReuseAllocator<Arc<FixedNoFreeAllocator>>,
}

impl MemoryPool {
    /// Create a pool over `[base, base + size)`.
    pub fn new(base: Address, size: Size) -> Self {
        let arena = Arc::new(FixedNoFreeAllocator::new(base, size));
        let reuse = ReuseAllocator::new(Arc::clone(&arena));
        info!("memory pool initialized: {size} bytes at 0x{base:x}");
        Self { arena, reuse }
    }

    /// Create a pool and verify up front that the whole region is
    /// usable, by allocating and immediately freeing one block of the
    /// full pool size.
    ///
    /// Fails fast with `Err(OutOfMemory)` when the region is
    /// undersized; for the verification to pass, `size` must be a
    /// multiple of the 16-byte minimum block size.
    pub fn with_verification(base: Address, size: Size) -> AllocResult<Self> {
        let mut pool = Self::new(base, size);
        let probe = pool.reuse.allocate(size)?;
        pool.reuse.free(probe)?;
        Ok(pool)
    }

    pub fn allocate(&mut self, size: Size) -> AllocResult<Address> {
        self.reuse.allocate(size)
    }

    pub fn allocate_aligned(&mut self, size: Size, alignment: Size) -> AllocResult<Address> {
        self.reuse.allocate_aligned(size, alignment)
    }

    pub fn free(&mut self, address: impl Into<Option<Address>>) -> AllocResult<()> {
        self.reuse.free(address)
    }

    /// Size of the underlying region
    pub fn size(&self) -> Size {
        self.arena.capacity()
    }

    /// Bytes the reuse layer has drawn from the region so far
    pub fn committed(&self) -> Size {
        self.arena.allocated()
    }

    pub fn stats(&self) -> AllocatorStats {
        self.reuse.stats()
    }
}
