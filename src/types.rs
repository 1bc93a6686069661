/*!
 * Allocator Types
 * Common types for block allocation
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Address type: an offset into an abstract arena address space.
///
/// Addresses are opaque handles; they are never dereferenced by this
/// crate and only become real pointers at the arena boundary of the
/// embedding system.
pub type Address = u64;

/// Size type for block allocation
pub type Size = u64;

/// Allocation operation result
pub type AllocResult<T> = Result<T, AllocError>;

/// Allocation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error("out of memory: requested {requested} bytes at alignment {alignment}")]
    OutOfMemory { requested: Size, alignment: Size },

    #[error("invalid free: 0x{0:x} is not an allocated address")]
    InvalidFree(Address),
}

/// A contiguous byte range, ordered by address.
///
/// `size` is the full reserved extent, which may exceed the bytes the
/// caller asked for due to minimum-block rounding and alignment.
// Field order matters: the derived ordering is address-major, the
// registry sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemoryBlock {
    pub address: Address,
    pub size: Size,
}

impl MemoryBlock {
    pub fn new(address: Address, size: Size) -> Self {
        Self { address, size }
    }

    /// One past the last address covered by this block
    pub fn end(&self) -> Address {
        self.address + self.size
    }

    /// Whether `other` starts exactly where this block ends (or vice versa)
    pub fn is_adjacent(&self, other: &MemoryBlock) -> bool {
        self.end() == other.address || other.end() == self.address
    }

    pub fn overlaps(&self, other: &MemoryBlock) -> bool {
        self.address < other.end() && other.address < self.end()
    }
}

/// Allocator statistics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorStats {
    /// Total bytes ever obtained from the fallback allocator
    pub capacity: Size,
    /// Bytes currently outstanding to callers
    pub total_allocated: Size,
    /// Bytes sitting in the free list, available for reuse
    pub free_bytes: Size,
    pub free_block_count: usize,
    pub allocated_block_count: usize,
}

/// Round `value` up to the next multiple of `boundary`.
///
/// `boundary` does not need to be a power of two; the free-list scan
/// uses modular arithmetic, not bit masks.
pub(crate) fn align_up(value: u64, boundary: u64) -> u64 {
    debug_assert!(boundary > 0);
    value.div_ceil(boundary) * boundary
}
