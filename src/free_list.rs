/*!
 * Free Block Set
 * Address-ordered free list with coalescing insert
 */

use crate::types::{Address, MemoryBlock, Size};
use std::collections::BTreeMap;

/// Set of free blocks keyed by address.
///
/// The `BTreeMap` gives the lower-bound lookups that adjacency merging
/// needs in O(log n). Two invariants hold between operations: no two
/// resident blocks overlap, and no two resident blocks are adjacent
/// (adjacency is resolved by merging at insert time).
#[derive(Debug, Default)]
pub(crate) struct FreeBlockSet {
    blocks: BTreeMap<Address, Size>,
}

impl FreeBlockSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a block, merging it with its right and left neighbors
    /// when they are exactly adjacent.
    ///
    /// At most one merge per side can happen: the no-adjacency
    /// invariant guarantees merges never cascade.
    pub fn insert(&mut self, block: MemoryBlock) {
        let mut merged = block;

        // The smallest resident block at or above our address is the
        // right-neighbor candidate.
        if let Some((&right_addr, &right_size)) = self.blocks.range(block.address..).next() {
            debug_assert!(right_addr >= merged.end(), "free blocks must not overlap");
            if merged.end() == right_addr {
                merged.size += right_size;
                self.blocks.remove(&right_addr);
            }
        }

        if let Some((&left_addr, &left_size)) = self.blocks.range(..block.address).next_back() {
            debug_assert!(left_addr + left_size <= block.address, "free blocks must not overlap");
            if left_addr + left_size == block.address {
                merged.address = left_addr;
                merged.size += left_size;
                self.blocks.remove(&left_addr);
            }
        }

        self.blocks.insert(merged.address, merged.size);
    }

    /// First-fit scan in address order: remove and return the
    /// lowest-addressed block that can hold `size` bytes once its
    /// start is padded up to `alignment`, along with that padded size.
    pub fn find_first_fit(&mut self, size: Size, alignment: Size) -> Option<(MemoryBlock, Size)> {
        let (block, aligned_size) = self.blocks.iter().find_map(|(&address, &block_size)| {
            let extra = (alignment - address % alignment) % alignment;
            let aligned_size = size + extra;
            (block_size >= aligned_size)
                .then_some((MemoryBlock::new(address, block_size), aligned_size))
        })?;

        self.blocks.remove(&block.address);
        Some((block, aligned_size))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Sum of all free block sizes
    pub fn total_bytes(&self) -> Size {
        self.blocks.values().sum()
    }

    /// Blocks in ascending address order
    pub fn iter(&self) -> impl Iterator<Item = MemoryBlock> + '_ {
        self.blocks
            .iter()
            .map(|(&address, &size)| MemoryBlock::new(address, size))
    }
}
