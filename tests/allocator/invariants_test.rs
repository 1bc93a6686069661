/*!
 * Property Tests
 * Structural invariants under random allocate/free interleavings
 */

use proptest::prelude::*;
use reuse_alloc::{Address, FixedNoFreeAllocator, ReuseAllocator, Size};

const BUFFER_SIZE: Size = 8 * 1024 * 1024;

/// One step of a random workload
#[derive(Debug, Clone)]
enum Op {
    Allocate { size: Size, align_shift: u32 },
    Free { victim: prop::sample::Index },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u64..4096, 0u32..12).prop_map(|(size, align_shift)| Op::Allocate { size, align_shift }),
        any::<prop::sample::Index>().prop_map(|victim| Op::Free { victim }),
    ]
}

/// No two blocks across the free and allocated registries overlap,
/// no two free blocks are adjacent, and the byte counters balance.
fn check_invariants(
    allocator: &ReuseAllocator<&FixedNoFreeAllocator>,
) -> Result<(), TestCaseError> {
    let free = allocator.free_blocks();
    let allocated = allocator.allocated_blocks();

    let mut all = free.clone();
    all.extend(allocated.iter().copied());
    all.sort();
    for pair in all.windows(2) {
        prop_assert!(
            pair[0].end() <= pair[1].address,
            "blocks overlap: {:?} and {:?}",
            pair[0],
            pair[1]
        );
    }

    for pair in free.windows(2) {
        prop_assert!(
            pair[0].end() < pair[1].address,
            "unmerged adjacent free blocks: {:?} and {:?}",
            pair[0],
            pair[1]
        );
    }

    let stats = allocator.stats();
    let allocated_bytes: Size = allocated.iter().map(|b| b.size).sum();
    let free_bytes: Size = free.iter().map(|b| b.size).sum();
    prop_assert_eq!(stats.total_allocated, allocated_bytes);
    prop_assert_eq!(stats.free_bytes, free_bytes);
    prop_assert_eq!(stats.capacity, allocated_bytes + free_bytes);
    Ok(())
}

proptest! {
    #[test]
    fn random_workloads_preserve_registry_invariants(
        ops in prop::collection::vec(op_strategy(), 1..80)
    ) {
        let arena = FixedNoFreeAllocator::new(0, BUFFER_SIZE);
        let mut allocator = ReuseAllocator::new(&arena);
        let mut live: Vec<Address> = Vec::new();
        let mut last_capacity = 0;

        for op in ops {
            match op {
                Op::Allocate { size, align_shift } => {
                    let alignment: Size = 1 << align_shift;
                    let p = allocator
                        .allocate_aligned(size, alignment)
                        .expect("arena is sized to absorb the whole workload");
                    prop_assert_eq!(p % alignment.max(16), 0);
                    live.push(p);
                }
                Op::Free { victim } => {
                    if !live.is_empty() {
                        let p = live.swap_remove(victim.index(live.len()));
                        allocator.free(p).unwrap();
                    }
                }
            }

            prop_assert!(allocator.capacity() >= last_capacity, "capacity regressed");
            last_capacity = allocator.capacity();
            check_invariants(&allocator)?;
        }

        // Draining every outstanding block must leave all capacity on
        // the free list with no mergeable neighbors.
        for p in live.drain(..) {
            allocator.free(p).unwrap();
        }
        check_invariants(&allocator)?;

        let stats = allocator.stats();
        prop_assert_eq!(stats.total_allocated, 0);
        prop_assert_eq!(stats.allocated_block_count, 0);
        prop_assert_eq!(stats.free_bytes, stats.capacity);
    }

    #[test]
    fn aligned_requests_return_aligned_addresses(
        size in 0u64..100_000,
        align_shift in 0u32..16,
    ) {
        let arena = FixedNoFreeAllocator::new(0, BUFFER_SIZE);
        let mut allocator = ReuseAllocator::new(&arena);
        let alignment: Size = 1 << align_shift;

        let p = allocator.allocate_aligned(size, alignment).unwrap();
        prop_assert_eq!(p % alignment.max(16), 0);

        // The reserved extent covers the rounded request.
        let block = allocator.allocated_blocks()[0];
        prop_assert!(block.address <= p);
        prop_assert!(p + size.max(16).div_ceil(16) * 16 <= block.end());

        allocator.free(p).unwrap();
    }
}
