//! Core types and traits for the Retrofit memory-safety layer.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other Retrofit crate: the error
//! taxonomy, the mutable/read-only capability markers, the
//! [`BackingRef`] contract that concrete reference types implement, and
//! the [`Null`] literal used for null comparisons.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod access;
pub mod backing;
pub mod error;
pub mod null;

pub use access::{Access, Grants, Mutable, ReadOnly};
pub use backing::{BackingRef, SequenceInfo};
pub use error::RefError;
pub use null::Null;
