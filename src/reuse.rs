/*!
 * Reuse Allocator
 * Free-list sub-allocator with block splitting and fallback chaining
 */

use crate::free_list::FreeBlockSet;
use crate::traits::FallbackAllocator;
use crate::types::{align_up, Address, AllocError, AllocResult, AllocatorStats, MemoryBlock, Size};
use log::{debug, error, info, warn};
use std::collections::BTreeMap;

/// Minimum block size in bytes.
///
/// Requests are rounded up to a multiple of this so that every block,
/// including one backing a 0-byte request, stays large enough to be
/// worth reusing.
pub const MIN_BLOCK_SIZE: Size = 16;

/// Minimum alignment in bytes; requested alignments are rounded up to
/// a multiple of this.
pub const MIN_ALIGNMENT: Size = 16;

/// Sub-allocator that recycles freed blocks before asking its fallback
/// allocator for more memory.
///
/// Freed blocks land in an address-ordered free list and merge with
/// adjacent neighbors, so fragmentation stays bounded across
/// allocate/free churn. Allocation is first-fit in address order with
/// alignment-aware splitting.
///
/// The allocator is not internally synchronized: mutating operations
/// take `&mut self` and callers needing shared access wrap the whole
/// allocator in their own lock.
#[derive(Debug)]
pub struct ReuseAllocator<F: FallbackAllocator> {
    fallback: F,
    free_blocks: FreeBlockSet,
    /// User-visible address -> full reserved extent. The user address
    /// can sit past the block start when alignment padding was needed.
    allocated_blocks: BTreeMap<Address, MemoryBlock>,
    /// Raw addresses obtained from the fallback, released on drop
    fallback_allocations: Vec<Address>,
    capacity: Size,
    total_allocated: Size,
}

impl<F: FallbackAllocator> ReuseAllocator<F> {
    pub fn new(fallback: F) -> Self {
        Self {
            fallback,
            free_blocks: FreeBlockSet::new(),
            allocated_blocks: BTreeMap::new(),
            fallback_allocations: Vec::new(),
            capacity: 0,
            total_allocated: 0,
        }
    }

    /// Allocate `size` bytes with no alignment requirement beyond the
    /// 16-byte minimum.
    pub fn allocate(&mut self, size: Size) -> AllocResult<Address> {
        self.allocate_aligned(size, 1)
    }

    /// Allocate `size` bytes aligned to `alignment`.
    ///
    /// `size` is rounded up to a multiple of 16 and `alignment` to at
    /// least 16, so even a 0-byte request reserves a unique 16-byte
    /// block. Returns `Err(OutOfMemory)` when the free list has no
    /// fitting block and the fallback is exhausted; no internal state
    /// changes in that case.
    pub fn allocate_aligned(&mut self, size: Size, alignment: Size) -> AllocResult<Address> {
        let alignment = if alignment == 0 { 1 } else { alignment };

        // Keeping sizes and alignments rounded avoids seeding the free
        // list with tiny or badly misaligned blocks.
        let size = align_up(size.max(MIN_BLOCK_SIZE), MIN_BLOCK_SIZE);
        let alignment = align_up(alignment, MIN_ALIGNMENT);

        let block = match self.free_blocks.find_first_fit(size, alignment) {
            Some((block, aligned_size)) => self.carve(block, aligned_size),
            None => self.allocate_from_fallback(size, alignment)?,
        };

        let user_address = align_up(block.address, alignment);
        debug_assert!(
            user_address + size <= block.end(),
            "reserved extent must cover the aligned request"
        );
        debug_assert!(
            !self.allocated_blocks.contains_key(&user_address),
            "double registration of 0x{user_address:x}"
        );

        self.allocated_blocks.insert(user_address, block);
        self.total_allocated += block.size;

        debug!(
            "allocated {} bytes at 0x{:x} (block 0x{:x}+{}, alignment {})",
            size, user_address, block.address, block.size, alignment
        );
        Ok(user_address)
    }

    /// Return a block to the free list.
    ///
    /// `None` plays the role of the null pointer and is an Ok no-op.
    /// Freeing an address that is not currently allocated is a
    /// corruption signal: debug builds assert, release builds log a
    /// warning and return `Err(InvalidFree)` without touching any
    /// registry.
    pub fn free(&mut self, address: impl Into<Option<Address>>) -> AllocResult<()> {
        let Some(address) = address.into() else {
            return Ok(());
        };

        let Some(block) = self.allocated_blocks.remove(&address) else {
            debug_assert!(false, "invalid free of 0x{address:x}");
            warn!("attempted to free invalid or already freed address 0x{address:x}");
            return Err(AllocError::InvalidFree(address));
        };

        debug_assert!(block.size <= self.total_allocated);
        self.total_allocated -= block.size;
        self.free_blocks.insert(block);

        debug!(
            "freed {} bytes at 0x{:x} ({} bytes now reusable in {} free blocks)",
            block.size,
            address,
            self.free_blocks.total_bytes(),
            self.free_blocks.len()
        );
        Ok(())
    }

    /// Total bytes ever obtained from the fallback allocator
    pub fn capacity(&self) -> Size {
        self.capacity
    }

    /// Bytes currently outstanding to callers
    pub fn total_allocated(&self) -> Size {
        self.total_allocated
    }

    pub fn stats(&self) -> AllocatorStats {
        AllocatorStats {
            capacity: self.capacity,
            total_allocated: self.total_allocated,
            free_bytes: self.free_blocks.total_bytes(),
            free_block_count: self.free_blocks.len(),
            allocated_block_count: self.allocated_blocks.len(),
        }
    }

    /// Histogram of live allocations: reserved block size -> count
    pub fn allocation_histogram(&self) -> BTreeMap<Size, usize> {
        let mut histogram = BTreeMap::new();
        for block in self.allocated_blocks.values() {
            *histogram.entry(block.size).or_insert(0) += 1;
        }
        histogram
    }

    /// Log the live-allocation histogram, for fragmentation debugging
    pub fn print_allocations(&self) {
        for (size, count) in self.allocation_histogram() {
            info!("{size} : {count}");
        }
        info!("Total allocations: {}", self.allocated_blocks.len());
    }

    /// Free blocks in ascending address order (diagnostics/tests)
    pub fn free_blocks(&self) -> Vec<MemoryBlock> {
        self.free_blocks.iter().collect()
    }

    /// Reserved extents of live allocations, ascending by user address
    pub fn allocated_blocks(&self) -> Vec<MemoryBlock> {
        self.allocated_blocks.values().copied().collect()
    }

    /// Split `aligned_size` bytes off the front of a block taken from
    /// the free list. The remainder goes back only when it is big
    /// enough to ever be reused; otherwise the caller keeps the whole
    /// block.
    fn carve(&mut self, block: MemoryBlock, aligned_size: Size) -> MemoryBlock {
        let remaining = block.size - aligned_size;
        if remaining >= MIN_BLOCK_SIZE {
            self.free_blocks
                .insert(MemoryBlock::new(block.address + aligned_size, remaining));
            MemoryBlock::new(block.address, aligned_size)
        } else {
            block
        }
    }

    /// No free block fits: obtain a fresh one from the fallback.
    fn allocate_from_fallback(&mut self, size: Size, alignment: Size) -> AllocResult<MemoryBlock> {
        let size = align_up(size, alignment);
        let raw = self
            .fallback
            .allocate_aligned(size, alignment)
            .ok_or(AllocError::OutOfMemory {
                requested: size,
                alignment,
            })?;

        let user_address = align_up(raw, alignment);
        let mut block = MemoryBlock::new(user_address, size);

        // The fallback contract promises aligned addresses; if one
        // comes back misaligned anyway, the skipped range either
        // becomes a free block or is folded into the allocated extent.
        if raw != user_address {
            let padding = user_address - raw;
            if padding >= MIN_BLOCK_SIZE {
                self.free_blocks.insert(MemoryBlock::new(raw, padding));
                self.capacity += padding;
            } else {
                block.address -= padding;
                block.size += padding;
            }
        }

        self.capacity += block.size;
        self.fallback_allocations.push(raw);
        Ok(block)
    }
}

impl<F: FallbackAllocator> Drop for ReuseAllocator<F> {
    fn drop(&mut self) {
        // Outstanding allocations at teardown are a lifecycle bug in
        // the caller, but cleanup of the fallback memory proceeds
        // regardless.
        if !self.allocated_blocks.is_empty() {
            error!("{} blocks still allocated", self.allocated_blocks.len());
        }

        for &raw in &self.fallback_allocations {
            self.fallback.free(raw);
        }
    }
}
