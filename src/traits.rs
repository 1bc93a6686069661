/*!
 * Allocator Traits
 * Fallback-allocator abstraction
 */

use crate::types::{Address, Size};
use std::sync::Arc;

/// Contract for the upstream source of raw memory.
///
/// A `ReuseAllocator` satisfies requests from its free list first and
/// only calls into the fallback when no free block fits. The fallback
/// instance must outlive the allocator built on top of it; the blanket
/// implementations below let callers hand the allocator a borrow, an
/// `Arc`, or a `Box` and let ownership enforce that.
pub trait FallbackAllocator {
    /// Obtain `size` bytes aligned to `alignment`.
    ///
    /// Returns `None` when exhausted. Must not panic on exhaustion.
    fn allocate_aligned(&self, size: Size, alignment: Size) -> Option<Address>;

    /// Release an address previously returned by `allocate_aligned`.
    fn free(&self, address: Address);
}

impl<T: FallbackAllocator + ?Sized> FallbackAllocator for &T {
    fn allocate_aligned(&self, size: Size, alignment: Size) -> Option<Address> {
        (**self).allocate_aligned(size, alignment)
    }

    fn free(&self, address: Address) {
        (**self).free(address)
    }
}

impl<T: FallbackAllocator + ?Sized> FallbackAllocator for Arc<T> {
    fn allocate_aligned(&self, size: Size, alignment: Size) -> Option<Address> {
        (**self).allocate_aligned(size, alignment)
    }

    fn free(&self, address: Address) {
        (**self).free(address)
    }
}

impl<T: FallbackAllocator + ?Sized> FallbackAllocator for Box<T> {
    fn allocate_aligned(&self, size: Size, alignment: Size) -> Option<Address> {
        (**self).allocate_aligned(size, alignment)
    }

    fn free(&self, address: Address) {
        (**self).free(address)
    }
}
