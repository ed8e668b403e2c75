//! Type erasure over safe references.
//!
//! Two erasure strategies share one operation surface, the [`Erasure`]
//! trait:
//!
//! - [`AnyRef`]: open erasure. Any [`BackingRef`](retrofit_core::BackingRef)
//!   can be stored behind a boxed [`CommonRef`] adapter, decided per call
//!   site.
//! - [`PolyRef`]: closed-set erasure. A native enum over a fixed list of
//!   backing kinds, with no per-value heap allocation.
//!
//! [`Nullable`] wraps either one with an explicit absent state, and
//! [`UntypedRef`] forgets the element type as well.
//!
//! # Comparison rules
//!
//! Equality is total: references whose backing types cannot be reconciled
//! are simply unequal, even when they alias the same item. Distance and
//! ordering are partial and fail with
//! [`RefError::IncompatibleBackingType`](retrofit_core::RefError::IncompatibleBackingType).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod any;
pub mod common;
pub mod erasure;
pub mod nullable;
pub mod poly;
pub mod untyped;

#[cfg(test)]
pub(crate) mod compliance;

pub use any::{AnyConstRef, AnyRef};
pub use common::{Adapter, CommonRef};
pub use erasure::Erasure;
pub use nullable::{Nullable, NullableAnyRef, NullablePolyRef};
pub use poly::{PolyConstRef, PolyKind, PolyRef, PolyTag};
pub use untyped::UntypedRef;
