//! Test fixtures for Retrofit development.
//!
//! Provides pre-filled buffers, C-string builders and a drop-counting
//! owner token for registry tests. See [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{cstr, filled, iota, wide_cstr, DropCounter, DropToken};
