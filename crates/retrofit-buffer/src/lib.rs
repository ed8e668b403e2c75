//! Registry-tracked allocation and C-style buffer functions over erased
//! references.
//!
//! - [`alloc`]: `allocate`, `allocate_zeroed`, `reallocate` and `free`,
//!   recording every allocation in an explicit
//!   [`AllocationRegistry`](retrofit_registry::AllocationRegistry).
//! - [`local`]: the same functions against the calling thread's registry.
//! - [`mem`]: `memcpy`, `memmove`, `memcmp`, `memset` and `memchr`, plus
//!   untyped forms that recover the element type from a known list.
//! - [`string`]: `strlen`, `strcpy`, `strcmp` and friends over
//!   [`CodeUnit`] strings.
//! - [`strto`]: `strtol`, `strtoul` and `strtod`.
//!
//! Byte counts are converted to element counts by the element size and
//! every access goes through the erased interface, so no function here
//! can read or write outside the backing storage.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod alloc;
pub mod local;
pub mod mem;
pub mod string;
pub mod strto;

pub use alloc::{allocate, allocate_zeroed, free, reallocate, try_allocate, Allocatable};
pub use mem::{
    element_count, memchr, memcmp, memcmp_untyped, memcmp_with_untyped, memcpy,
    memcpy_from_untyped, memcpy_to_untyped, memcpy_untyped, memmove, memset, FillByte,
};
pub use string::{strchr, strcmp, strcpy, strlen, strncmp, strncpy, strnlen, CodeUnit};
pub use strto::{strtod, strtol, strtoul, Parsed};
