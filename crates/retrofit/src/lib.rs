//! Retrofit: memory-safe stand-ins for raw pointers.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Retrofit sub-crates. For most users, adding `retrofit` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use retrofit::prelude::*;
//!
//! let mut registry = AllocationRegistry::with_defaults();
//!
//! // Four u32 elements: one 16-byte record in fast storage.
//! let mut p: NullableAnyRef<u32> = allocate(&mut registry, 16);
//! assert_eq!(registry.fast_len(), 1);
//!
//! p.write_at(2, 7).unwrap();
//! let mut q = p.clone();
//! q.advance(2).unwrap();
//! assert_eq!(*q.try_deref().unwrap(), 7);
//! assert_eq!(q.distance(&p), Ok(2));
//!
//! // Running off the end is an error, not undefined behaviour.
//! assert!(q.read_at(2).is_err());
//!
//! free(&mut registry, &mut p);
//! assert!(p == Null);
//! assert!(registry.is_empty());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `retrofit-core` | `RefError`, capability markers, the `BackingRef` contract |
//! | [`refs`] | `retrofit-refs` | Bounds-checked buffers, iterators and registered pointers |
//! | [`erasure`] | `retrofit-erasure` | `AnyRef`, `PolyRef`, `UntypedRef`, `Nullable` |
//! | [`registry`] | `retrofit-registry` | Two-tier allocation registry |
//! | [`buffer`] | `retrofit-buffer` | allocate/reallocate/free, `mem*`, `str*`, `strto*` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Error taxonomy, capability markers and the backing-reference contract
/// (`retrofit-core`).
pub use retrofit_core as types;

/// Concrete backing references (`retrofit-refs`).
///
/// [`refs::SeqIter`] and [`refs::VecIter`] are random-access;
/// [`refs::SharedRef`] and [`refs::RegisteredRef`] point at one item.
pub use retrofit_refs as refs;

/// Open and closed-set erasure (`retrofit-erasure`).
pub use retrofit_erasure as erasure;

/// Allocation tracking (`retrofit-registry`).
pub use retrofit_registry as registry;

/// Tracked allocation and C-style buffer functions (`retrofit-buffer`).
pub use retrofit_buffer as buffer;

/// Common imports for typical Retrofit usage.
///
/// ```rust
/// use retrofit::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use retrofit_core::{Access, BackingRef, Mutable, Null, ReadOnly, RefError};

    // Backing references
    pub use retrofit_refs::{
        Buffer, Registered, RegisteredRef, SeqIter, SharedRef, SharedVec, VecIter,
    };

    // Erasure
    pub use retrofit_erasure::{
        AnyConstRef, AnyRef, Erasure, Nullable, NullableAnyRef, NullablePolyRef, PolyConstRef,
        PolyRef, PolyTag, UntypedRef,
    };

    // Registry
    pub use retrofit_registry::{AllocationRegistry, RegistryConfig, StorageTier};

    // Buffer API
    pub use retrofit_buffer::{
        allocate, allocate_zeroed, free, memcmp, memcpy, memset, reallocate, strcmp, strcpy,
        strlen, strtod, strtol, Allocatable,
    };
}
