//! Concrete safe reference types for Retrofit.
//!
//! These are the backing references the erasure layer wraps. Each one
//! implements [`BackingRef`](retrofit_core::BackingRef) at both capability
//! levels and rejects null, out-of-bounds and dangling access with a
//! [`RefError`](retrofit_core::RefError) instead of undefined behaviour.
//!
//! | Type | Storage | Random access | Native null | Container lookup |
//! |------|---------|---------------|-------------|------------------|
//! | [`SeqIter`] | fixed [`Buffer`] | yes | no | yes |
//! | [`VecIter`] | growable [`SharedVec`] | yes | no | yes |
//! | [`SharedRef`] | one [`Buffer`] element | no | no | no |
//! | [`RegisteredRef`] | a [`Registered`] target | no | yes | no |
//!
//! All storage is single-threaded (`Rc` + `RefCell`): dereference hands
//! out runtime-checked `Ref`/`RefMut` guards.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffer;
pub mod registered;
pub mod seq_iter;
pub mod shared;
pub mod vec_iter;

pub use buffer::Buffer;
pub use registered::{ConstRegisteredRef, Registered, RegisteredRef};
pub use seq_iter::{ConstSeqIter, SeqIter};
pub use shared::{ConstSharedRef, SharedRef};
pub use vec_iter::{ConstVecIter, SharedVec, VecIter};
