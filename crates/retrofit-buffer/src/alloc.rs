//! Registry-tracked allocation.
//!
//! [`allocate`], [`reallocate`] and [`free`] mirror the native allocator
//! contract over erased references: failure is reported by returning a
//! null reference, never by an error. Every successful allocation is
//! recorded in an [`AllocationRegistry`] whose record owns the buffer
//! handle, so freeing is releasing that record.

use std::mem::size_of;

use retrofit_core::RefError;
use retrofit_erasure::{Erasure, Nullable};
use retrofit_refs::{Buffer, SeqIter};
use retrofit_registry::AllocationRegistry;
use tracing::{debug, trace, warn};

/// An erased representation that the allocation family can produce.
///
/// Implemented for every [`Nullable`] whose erasure can wrap a
/// [`SeqIter`], which covers `Nullable<AnyRef<T>>` and
/// `Nullable<PolyRef<T>>`.
pub trait Allocatable: Erasure {
    /// Wrap an iterator at the start of freshly allocated storage.
    fn from_seq(iter: SeqIter<Self::Target>) -> Self;

    /// The null value returned on failure.
    fn null() -> Self;
}

impl<E> Allocatable for Nullable<E>
where
    E: Erasure + From<SeqIter<<E as Erasure>::Target>>,
{
    fn from_seq(iter: SeqIter<Self::Target>) -> Self {
        Nullable::new(E::from(iter))
    }

    fn null() -> Self {
        Nullable::null()
    }
}

/// Number of `T` needed to hold `bytes` bytes, rounded up.
fn elements_for<T>(bytes: usize) -> Option<usize> {
    match size_of::<T>() {
        0 => None,
        size => Some(bytes.div_ceil(size)),
    }
}

fn new_buffer<T: Default>(bytes: usize) -> Result<Buffer<T>, RefError> {
    let count = match elements_for::<T>(bytes) {
        Some(count) if count > 0 => count,
        _ => return Err(RefError::AllocationFailure { byte_count: bytes }),
    };
    Buffer::try_with_len(count).ok_or(RefError::AllocationFailure { byte_count: bytes })
}

/// Address of the tracked allocation `r` points into, if any.
///
/// The owning container's start is used when `r` can name it. An advanced
/// reference is then still found, and a one-past-the-end address that
/// coincides with another allocation is never mistaken for it.
fn tracked_base<R: Erasure>(registry: &AllocationRegistry, r: &R) -> Option<usize> {
    let base = match r.sequence() {
        Some(seq) => seq.start,
        None => r.address()?,
    };
    registry.contains(base).then_some(base)
}

/// Allocate room for `bytes` bytes worth of elements and track it.
///
/// The element count is `bytes / size_of::<T>()` rounded up, and the
/// elements start out default-initialised.
pub fn try_allocate<R>(registry: &mut AllocationRegistry, bytes: usize) -> Result<R, RefError>
where
    R: Allocatable,
    R::Target: Default,
{
    let buf = new_buffer::<R::Target>(bytes)?;
    let address = buf.base_address();
    trace!(address, bytes, len = buf.len(), "allocated");
    registry.track(address, bytes, buf.clone());
    Ok(R::from_seq(SeqIter::new(buf)))
}

/// Like [`try_allocate`], but returns a null reference on failure.
///
/// Zero bytes and zero-sized element types also yield null.
pub fn allocate<R>(registry: &mut AllocationRegistry, bytes: usize) -> R
where
    R: Allocatable,
    R::Target: Default,
{
    try_allocate(registry, bytes).unwrap_or_else(|e| {
        warn!(bytes, error = %e, "allocation failed");
        R::null()
    })
}

/// Allocate `count` elements of `size` bytes each.
///
/// Returns null if the product overflows.
pub fn allocate_zeroed<R>(registry: &mut AllocationRegistry, count: usize, size: usize) -> R
where
    R: Allocatable,
    R::Target: Default,
{
    match count.checked_mul(size) {
        Some(bytes) => allocate(registry, bytes),
        None => {
            warn!(count, size, "zeroed allocation size overflows");
            R::null()
        }
    }
}

/// Resize the allocation `r` refers to.
///
/// - A null `r` behaves as [`allocate`].
/// - Zero bytes behaves as [`free`] and returns null.
/// - An `r` pointing anywhere into a tracked allocation gets a fresh
///   allocation. The first `min(old, new)` elements of the old allocation
///   are copied over one at a time, then the old record is released and
///   the new one registered.
/// - An untracked non-null `r` gets an unregistered copy of as much of its
///   remaining sequence as fits.
///
/// On failure the result is null and `r` is left untouched.
pub fn reallocate<R>(registry: &mut AllocationRegistry, r: &R, bytes: usize) -> R
where
    R: Allocatable,
    R::Target: Clone + Default,
{
    let Some(address) = r.address() else {
        return allocate(registry, bytes);
    };
    if bytes == 0 {
        let mut old = r.clone();
        free(registry, &mut old);
        return R::null();
    }
    let result = match tracked_base(registry, r)
        .and_then(|base| registry.get(base))
        .and_then(|record| record.owner::<Buffer<R::Target>>())
        .cloned()
    {
        Some(old) => reallocate_tracked(registry, &old, bytes),
        None => reallocate_untracked(r, bytes),
    };
    result.unwrap_or_else(|e| {
        warn!(address, bytes, error = %e, "reallocation failed");
        R::null()
    })
}

fn reallocate_tracked<R>(
    registry: &mut AllocationRegistry,
    old: &Buffer<R::Target>,
    bytes: usize,
) -> Result<R, RefError>
where
    R: Allocatable,
    R::Target: Clone + Default,
{
    let buf = new_buffer::<R::Target>(bytes)?;
    let keep = old.len().min(buf.len());
    for i in 0..keep as isize {
        buf.set(i, old.get(i)?.clone())?;
    }
    trace!(
        from = old.base_address(),
        to = buf.base_address(),
        elements = keep,
        "transferred allocation prefix"
    );
    registry.unregister(old.base_address());
    registry.track(buf.base_address(), bytes, buf.clone());
    Ok(R::from_seq(SeqIter::new(buf)))
}

fn reallocate_untracked<R>(r: &R, bytes: usize) -> Result<R, RefError>
where
    R: Allocatable,
    R::Target: Clone + Default,
{
    let buf = new_buffer::<R::Target>(bytes)?;
    let remaining = r
        .sequence()
        .map(|s| (s.len as isize - s.index).max(0) as usize)
        .unwrap_or(1);
    let keep = remaining.min(buf.len());
    debug!(
        address = r.address(),
        bytes,
        elements = keep,
        "reallocating untracked reference"
    );
    for i in 0..keep as isize {
        buf.set(i, r.read_at(i)?)?;
    }
    Ok(R::from_seq(SeqIter::new(buf)))
}

/// Release the allocation `r` points into and reset `r` to null.
///
/// A reference advanced past the start still releases its whole
/// allocation. Untracked references are only reset.
pub fn free<R: Allocatable>(registry: &mut AllocationRegistry, r: &mut R) {
    let address = r.address();
    match tracked_base(registry, r) {
        Some(base) => {
            if address != Some(base) {
                warn!(address, base, "freeing from inside an allocation");
            }
            registry.unregister(base);
        }
        None if address.is_some() => debug!(address, "freeing untracked reference"),
        None => {}
    }
    *r = R::null();
}
