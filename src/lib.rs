/*!
 * Reuse Allocator Library
 *
 * Free-list sub-allocator with address-ordered coalescing, layered on
 * top of a fallback allocator.
 *
 * ## Allocation
 *
 * [`ReuseAllocator`] serves `allocate(size, alignment)` requests from
 * an address-ordered free list using a **first-fit** policy:
 * - Sizes round up to a 16-byte minimum block size, alignments to a
 *   16-byte minimum, so every block stays reusable
 * - Oversized free blocks are **split**, keeping the remainder on the
 *   free list (unless it would drop below the minimum block size)
 * - When no free block fits, memory comes from a pluggable
 *   [`FallbackAllocator`]
 *
 * ## Deallocation
 *
 * Freed blocks are re-inserted in address order and **coalesced** with
 * adjacent neighbors, so free space consolidates instead of
 * fragmenting. Fallback memory is only returned wholesale when the
 * allocator is dropped.
 *
 * ## Synchronisation
 *
 * None, on purpose: mutating operations take `&mut self` and callers
 * that share an allocator serialize access with their own lock.
 *
 * [`MemoryPool`] bundles a fixed bump arena with a reuse layer for the
 * common self-contained case:
 *
 * ```
 * use reuse_alloc::MemoryPool;
 *
 * let mut pool = MemoryPool::new(0x1000, 64 * 1024);
 * let a = pool.allocate_aligned(100, 16).unwrap();
 * assert_eq!(a % 16, 0);
 * pool.free(a).unwrap();
 * ```
 */

mod fixed;
mod free_list;
mod pool;
mod reuse;
mod traits;
mod types;

// Re-exports
pub use fixed::FixedNoFreeAllocator;
pub use pool::MemoryPool;
pub use reuse::{ReuseAllocator, MIN_ALIGNMENT, MIN_BLOCK_SIZE};
pub use traits::FallbackAllocator;
pub use types::{Address, AllocError, AllocResult, AllocatorStats, MemoryBlock, Size};
