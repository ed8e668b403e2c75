//! Benchmark setup helpers for Retrofit.
//!
//! - [`populated_registry`]: a registry holding `n` tracked allocations,
//!   so lookups can be measured in either storage tier.
//! - [`erased_pair`]: the same buffer position behind open and
//!   closed-set erasure.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use retrofit_buffer::allocate;
use retrofit_erasure::{AnyRef, NullableAnyRef, PolyRef};
use retrofit_refs::{Buffer, SeqIter};
use retrofit_registry::{AllocationRegistry, RegistryConfig};

/// A registry with `n` live allocations of 64 bytes each, plus the
/// references keeping their addresses meaningful.
pub fn populated_registry(
    fast_capacity: usize,
    n: usize,
) -> (AllocationRegistry, Vec<NullableAnyRef<u64>>) {
    let config = RegistryConfig::new().with_fast_capacity(fast_capacity);
    let mut registry =
        AllocationRegistry::new(config).expect("bench registry config must be valid");
    let refs = (0..n).map(|_| allocate(&mut registry, 64)).collect();
    (registry, refs)
}

/// An `AnyRef` and a `PolyRef` over the start of a fresh `len`-element buffer.
pub fn erased_pair(len: usize) -> (AnyRef<u64>, PolyRef<u64>) {
    let buf = Buffer::from_vec((0..len as u64).collect());
    (
        AnyRef::new(SeqIter::<u64>::new(buf.clone())),
        PolyRef::new(SeqIter::<u64>::new(buf)),
    )
}
