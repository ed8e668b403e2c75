//! One registry per thread.
//!
//! The explicit [`AllocationRegistry`] is the primary API. This module
//! binds a lazily created registry to the calling thread for call sites
//! that have no registry handle to thread through. The registry is torn
//! down with the thread, or earlier via [`teardown`].

use std::cell::RefCell;

use tracing::debug;

use crate::error::RegistryError;
use crate::registry::AllocationRegistry;

thread_local! {
    static REGISTRY: RefCell<Option<AllocationRegistry>> = const { RefCell::new(None) };
}

/// Run `f` against this thread's registry, creating it on first use.
///
/// Fails with [`RegistryError::ContextBusy`] when called from inside
/// another `with_registry` on the same thread.
pub fn with_registry<R>(f: impl FnOnce(&mut AllocationRegistry) -> R) -> Result<R, RegistryError> {
    REGISTRY
        .try_with(|cell| {
            let mut slot = cell.try_borrow_mut().map_err(|_| RegistryError::ContextBusy)?;
            let registry = slot.get_or_insert_with(AllocationRegistry::with_defaults);
            Ok::<_, RegistryError>(f(registry))
        })
        .map_err(|_| RegistryError::ContextUnavailable)?
}

/// Replace this thread's registry, returning the previous one if any.
///
/// Use this to give the thread a registry built from a non-default
/// [`RegistryConfig`](crate::RegistryConfig).
pub fn install(registry: AllocationRegistry) -> Result<Option<AllocationRegistry>, RegistryError> {
    REGISTRY
        .try_with(|cell| {
            let mut slot = cell.try_borrow_mut().map_err(|_| RegistryError::ContextBusy)?;
            Ok::<_, RegistryError>(slot.replace(registry))
        })
        .map_err(|_| RegistryError::ContextUnavailable)?
}

/// Destroy this thread's registry, releasing every record.
///
/// Returns how many records were released. The next [`with_registry`]
/// starts from a fresh registry.
pub fn teardown() -> Result<usize, RegistryError> {
    let taken = REGISTRY
        .try_with(|cell| {
            cell.try_borrow_mut()
                .map(|mut slot| slot.take())
                .map_err(|_| RegistryError::ContextBusy)
        })
        .map_err(|_| RegistryError::ContextUnavailable)??;
    let released = match taken {
        Some(mut registry) => registry.clear(),
        None => 0,
    };
    debug!(released, "thread allocation registry torn down");
    Ok(released)
}
