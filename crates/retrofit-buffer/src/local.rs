//! The allocation family bound to the calling thread's registry.
//!
//! Same contracts as [`crate::alloc`], using
//! [`retrofit_registry::context`] instead of an explicit registry. If the
//! thread's registry is unreachable (already borrowed, or torn down at
//! thread exit) allocation yields null and `free` only resets.

use retrofit_registry::context;
use tracing::warn;

use crate::alloc::{self, Allocatable};

/// [`alloc::allocate`] against the thread registry.
pub fn allocate<R>(bytes: usize) -> R
where
    R: Allocatable,
    R::Target: Default,
{
    context::with_registry(|reg| alloc::allocate(reg, bytes)).unwrap_or_else(|e| {
        warn!(bytes, error = %e, "thread registry unavailable");
        R::null()
    })
}

/// [`alloc::allocate_zeroed`] against the thread registry.
pub fn allocate_zeroed<R>(count: usize, size: usize) -> R
where
    R: Allocatable,
    R::Target: Default,
{
    context::with_registry(|reg| alloc::allocate_zeroed(reg, count, size)).unwrap_or_else(|e| {
        warn!(count, size, error = %e, "thread registry unavailable");
        R::null()
    })
}

/// [`alloc::reallocate`] against the thread registry.
pub fn reallocate<R>(r: &R, bytes: usize) -> R
where
    R: Allocatable,
    R::Target: Clone + Default,
{
    context::with_registry(|reg| alloc::reallocate(reg, r, bytes)).unwrap_or_else(|e| {
        warn!(bytes, error = %e, "thread registry unavailable");
        R::null()
    })
}

/// [`alloc::free`] against the thread registry.
pub fn free<R: Allocatable>(r: &mut R) {
    if let Err(e) = context::with_registry(|reg| alloc::free(reg, r)) {
        warn!(error = %e, "thread registry unavailable");
        *r = R::null();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrofit_erasure::{Erasure, NullableAnyRef};

    #[test]
    fn round_trip_through_the_thread_registry() {
        context::teardown().unwrap();
        let mut r: NullableAnyRef<u32> = allocate(16);
        let address = r.address().unwrap();
        let size = context::with_registry(|reg| reg.info(address).map(|i| i.size)).unwrap();
        assert_eq!(size, Some(16));

        let grown = reallocate(&r, 32);
        free(&mut r);
        assert_eq!(context::with_registry(|reg| reg.len()), Ok(1));
        let mut grown = grown;
        free(&mut grown);
        assert_eq!(context::with_registry(|reg| reg.is_empty()), Ok(true));
    }

    #[test]
    fn busy_registry_yields_null() {
        let nested: NullableAnyRef<u8> =
            context::with_registry(|_| allocate::<NullableAnyRef<u8>>(4)).unwrap();
        assert!(!nested.has_value());
    }
}
