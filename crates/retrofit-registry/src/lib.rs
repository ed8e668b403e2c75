//! Allocation registry for Retrofit.
//!
//! [`AllocationRegistry`] tracks live allocations by address in two tiers:
//! a small linearly scanned array of recent records and an address-keyed
//! overflow map. Each [`AllocationRecord`] owns the handle that keeps its
//! allocation alive, so releasing the record is what frees the memory.
//!
//! Registries are single-threaded. [`context`] binds one to each thread.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod error;
pub mod record;
pub mod registry;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use record::{AllocationInfo, AllocationRecord};
pub use registry::{AllocationRegistry, StorageTier};
