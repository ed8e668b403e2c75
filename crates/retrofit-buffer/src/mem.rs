//! `mem*` functions over erased references.
//!
//! Byte counts are converted to element counts first; the operation then
//! runs element by element through the erased interface, never as a raw
//! byte copy.

use std::cmp::Ordering;
use std::mem::size_of;

use retrofit_core::RefError;
use retrofit_erasure::{Erasure, UntypedRef};

/// Convert `bytes` to an element count.
///
/// The left element size is tried first, then the right. If `bytes` is a
/// whole number of elements for neither, the caller's intent is ambiguous
/// and this fails with [`RefError::SizeMismatch`].
pub fn element_count(bytes: usize, left_size: usize, right_size: usize) -> Result<usize, RefError> {
    if bytes == 0 {
        return Ok(0);
    }
    for size in [left_size, right_size] {
        if size != 0 && bytes % size == 0 {
            return Ok(bytes / size);
        }
    }
    Err(RefError::SizeMismatch {
        byte_count: bytes,
        left_size,
        right_size,
    })
}

fn typed_count<T>(bytes: usize) -> Result<usize, RefError> {
    element_count(bytes, size_of::<T>(), size_of::<T>())
}

/// `count` as a signed offset range over `e`.
///
/// No sequence holds more than `isize::MAX` elements, so a larger count is
/// out of bounds before anything is touched.
pub(crate) fn span<E: Erasure>(e: &E, count: usize) -> Result<isize, RefError> {
    isize::try_from(count).map_err(|_| RefError::OutOfBounds {
        index: isize::MAX,
        len: e.sequence().map_or(0, |s| s.len),
    })
}

/// Like [`span`], but also checks that all `count` positions of `dst` are
/// writable, so a failing operation leaves `dst` untouched.
pub(crate) fn writable_span<E: Erasure>(dst: &E, count: usize) -> Result<isize, RefError> {
    let n = span(dst, count)?;
    if n > 0 {
        drop(dst.try_index_mut(n - 1)?);
    }
    Ok(n)
}

/// Copy `bytes` bytes worth of elements from `src` to `dst`.
///
/// The destination is checked for room and the source range is read in
/// full before anything is written, so a failed copy leaves `dst` as it was
/// and overlapping ranges behave like `memmove`.
pub fn memcpy<D, S>(dst: &D, src: &S, bytes: usize) -> Result<(), RefError>
where
    D: Erasure,
    S: Erasure<Target = D::Target>,
    D::Target: Clone,
{
    let n = writable_span(dst, typed_count::<D::Target>(bytes)?)?;
    let staged = (0..n)
        .map(|i| src.read_at(i))
        .collect::<Result<Vec<_>, _>>()?;
    for (i, value) in (0..n).zip(staged) {
        dst.write_at(i, value)?;
    }
    Ok(())
}

/// Alias of [`memcpy`], which is already overlap-safe.
pub fn memmove<D, S>(dst: &D, src: &S, bytes: usize) -> Result<(), RefError>
where
    D: Erasure,
    S: Erasure<Target = D::Target>,
    D::Target: Clone,
{
    memcpy(dst, src, bytes)
}

fn sign(ordering: Ordering) -> i32 {
    match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// Compare `bytes` bytes worth of elements.
///
/// Returns -1, 0 or 1 from the first differing element. Unordered pairs
/// (such as a NaN) count as greater.
pub fn memcmp<L, R>(left: &L, right: &R, bytes: usize) -> Result<i32, RefError>
where
    L: Erasure,
    R: Erasure<Target = L::Target>,
    L::Target: PartialOrd,
{
    let n = span(left, typed_count::<L::Target>(bytes)?)?;
    for i in 0..n {
        let a = left.try_index(i)?;
        let b = right.try_index(i)?;
        match (*a).partial_cmp(&*b) {
            Some(Ordering::Equal) => {}
            Some(ordering) => return Ok(sign(ordering)),
            None => return Ok(1),
        }
    }
    Ok(0)
}

/// An element type that can be filled from a repeated byte.
pub trait FillByte: Sized {
    /// The value whose every byte is `byte`.
    fn from_fill_byte(byte: u8) -> Self;
}

macro_rules! fill_int {
    ($($ty:ty),*) => {$(
        impl FillByte for $ty {
            fn from_fill_byte(byte: u8) -> Self {
                <$ty>::from_ne_bytes([byte; size_of::<$ty>()])
            }
        }
    )*};
}

fill_int!(u8, i8, u16, i16, u32, i32, u64, i64, u128, i128, usize, isize);

impl FillByte for f32 {
    fn from_fill_byte(byte: u8) -> Self {
        f32::from_bits(u32::from_fill_byte(byte))
    }
}

impl FillByte for f64 {
    fn from_fill_byte(byte: u8) -> Self {
        f64::from_bits(u64::from_fill_byte(byte))
    }
}

impl FillByte for bool {
    fn from_fill_byte(byte: u8) -> Self {
        byte != 0
    }
}

/// Set `bytes` bytes worth of elements to the pattern `byte`.
///
/// Nothing is written unless `dst` has room for every element.
pub fn memset<D>(dst: &D, byte: u8, bytes: usize) -> Result<(), RefError>
where
    D: Erasure,
    D::Target: FillByte,
{
    let n = writable_span(dst, typed_count::<D::Target>(bytes)?)?;
    for i in 0..n {
        dst.write_at(i, D::Target::from_fill_byte(byte))?;
    }
    Ok(())
}

/// Find the first element equal to `value` within `bytes` bytes worth.
///
/// Returns a copy of `hay` moved to the match.
pub fn memchr<E>(hay: &E, value: &E::Target, bytes: usize) -> Result<Option<E>, RefError>
where
    E: Erasure,
    E::Target: PartialEq,
{
    let n = span(hay, typed_count::<E::Target>(bytes)?)?;
    for i in 0..n {
        if *hay.try_index(i)? == *value {
            let mut found = hay.clone();
            found.advance(i)?;
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Run `$body` with `$elem` aliased to the first known primitive type
/// both untyped references hold, or fail with
/// [`RefError::UnsupportedConversion`].
macro_rules! with_common_primitive {
    ($left:ident, $right:ident, $elem:ident => $body:block) => {
        with_common_primitive!(@each $left, $right, $elem, $body;
            u8, i8, u16, i16, u32, i32, u64, i64, usize, isize, f32, f64, char, bool)
    };
    (@each $left:ident, $right:ident, $elem:ident, $body:block; $($ty:ty),*) => {{
        $(
            if $left.holds::<$ty>() && $right.holds::<$ty>() {
                type $elem = $ty;
                return $body;
            }
        )*
        Err(RefError::UnsupportedConversion {
            type_name: $left.elem_type_name(),
        })
    }};
}

/// [`memcpy`] between two fully erased references.
///
/// The element type is recovered by trying the known primitive types;
/// both sides must hold the same one.
pub fn memcpy_untyped(dst: &UntypedRef, src: &UntypedRef, bytes: usize) -> Result<(), RefError> {
    element_count(bytes, dst.elem_size(), src.elem_size())?;
    with_common_primitive!(dst, src, Elem => {
        memcpy(&dst.recover::<Elem>()?, &src.recover_read_only::<Elem>()?, bytes)
    })
}

/// [`memcmp`] between two fully erased references.
pub fn memcmp_untyped(left: &UntypedRef, right: &UntypedRef, bytes: usize) -> Result<i32, RefError> {
    element_count(bytes, left.elem_size(), right.elem_size())?;
    with_common_primitive!(left, right, Elem => {
        memcmp(
            &left.recover_read_only::<Elem>()?,
            &right.recover_read_only::<Elem>()?,
            bytes,
        )
    })
}

/// [`memcpy`] from a fully erased source into a typed destination.
///
/// The element type is taken from `dst`; `src` must hold the same one.
pub fn memcpy_from_untyped<D>(dst: &D, src: &UntypedRef, bytes: usize) -> Result<(), RefError>
where
    D: Erasure,
    D::Target: Clone,
{
    element_count(bytes, size_of::<D::Target>(), src.elem_size())?;
    memcpy(dst, &src.recover_read_only::<D::Target>()?, bytes)
}

/// [`memcpy`] from a typed source into a fully erased destination.
pub fn memcpy_to_untyped<S>(dst: &UntypedRef, src: &S, bytes: usize) -> Result<(), RefError>
where
    S: Erasure,
    S::Target: Clone,
{
    element_count(bytes, dst.elem_size(), size_of::<S::Target>())?;
    memcpy(&dst.recover::<S::Target>()?, src, bytes)
}

/// [`memcmp`] of a typed reference against a fully erased one.
pub fn memcmp_with_untyped<L>(left: &L, right: &UntypedRef, bytes: usize) -> Result<i32, RefError>
where
    L: Erasure,
    L::Target: PartialOrd,
{
    element_count(bytes, size_of::<L::Target>(), right.elem_size())?;
    memcmp(left, &right.recover_read_only::<L::Target>()?, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrofit_erasure::{AnyConstRef, AnyRef, Nullable, NullablePolyRef, PolyRef};
    use retrofit_refs::{Buffer, SeqIter};
    use retrofit_test_utils::{filled, iota};

    fn any<T: 'static>(buf: &Buffer<T>, at: usize) -> AnyRef<T> {
        AnyRef::new(SeqIter::<T>::at(buf.clone(), at).unwrap())
    }

    #[test]
    fn element_count_prefers_left_then_right() {
        assert_eq!(element_count(12, 4, 8), Ok(3));
        assert_eq!(element_count(12, 8, 4), Ok(3));
        assert_eq!(element_count(16, 8, 4), Ok(2));
        assert_eq!(element_count(0, 0, 0), Ok(0));
        assert_eq!(
            element_count(6, 4, 8),
            Err(RefError::SizeMismatch {
                byte_count: 6,
                left_size: 4,
                right_size: 8
            })
        );
    }

    #[test]
    fn memcpy_copies_elementwise() {
        let src = iota(4);
        let dst = filled(0i32, 4);
        memcpy(&any(&dst, 0), &any(&src, 1), 12).unwrap();
        assert_eq!(dst.to_vec().unwrap(), vec![1, 2, 3, 0]);
    }

    #[test]
    fn memcpy_overlapping_forward() {
        let buf = iota(5);
        memcpy(&any(&buf, 1), &any(&buf, 0), 16).unwrap();
        assert_eq!(buf.to_vec().unwrap(), vec![0, 0, 1, 2, 3]);
    }

    #[test]
    fn memcpy_rejects_partial_elements_and_overruns() {
        let buf = iota(2);
        assert!(matches!(
            memcpy(&any(&buf, 0), &any(&buf, 0), 6),
            Err(RefError::SizeMismatch { .. })
        ));
        assert!(matches!(
            memcpy(&any(&buf, 0), &any(&buf, 0), 12),
            Err(RefError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn memcpy_into_a_short_destination_writes_nothing() {
        let src = Buffer::from_vec(vec![7i32; 4]);
        let dst = filled(0i32, 2);
        assert_eq!(
            memcpy(&any(&dst, 0), &any(&src, 0), 16),
            Err(RefError::OutOfBounds { index: 3, len: 2 })
        );
        assert_eq!(dst.to_vec().unwrap(), vec![0, 0]);

        let ro: AnyConstRef<i32> = AnyRef::new(SeqIter::<i32>::new(dst.clone()));
        assert_eq!(memcpy(&ro, &any(&src, 0), 8), Err(RefError::ReadOnly));
        assert_eq!(dst.to_vec().unwrap(), vec![0, 0]);
    }

    #[test]
    fn counts_beyond_isize_are_out_of_bounds() {
        let a = Buffer::from_vec(vec![1u8, 2]);
        let b = Buffer::from_vec(vec![9u8, 9]);
        assert!(matches!(
            memcmp(&any(&a, 0), &any(&b, 0), usize::MAX),
            Err(RefError::OutOfBounds { index: isize::MAX, len: 2 })
        ));
        assert!(matches!(
            memcpy(&any(&a, 0), &any(&b, 0), usize::MAX),
            Err(RefError::OutOfBounds { .. })
        ));
        assert!(matches!(
            memset(&any(&a, 0), 0, usize::MAX),
            Err(RefError::OutOfBounds { .. })
        ));
        assert!(matches!(
            memchr(&any(&a, 0), &9, usize::MAX),
            Err(RefError::OutOfBounds { .. })
        ));
        assert_eq!(a.to_vec().unwrap(), vec![1, 2]);
    }

    #[test]
    fn memcmp_orders_by_first_difference() {
        let a = Buffer::from_vec(vec![1u16, 2, 3]);
        let b = Buffer::from_vec(vec![1u16, 2, 4]);
        let ro: AnyConstRef<u16> = AnyRef::new(SeqIter::<u16>::new(b.clone()));
        assert_eq!(memcmp(&any(&a, 0), &any(&b, 0), 4), Ok(0));
        assert_eq!(memcmp(&any(&a, 0), &any(&b, 0), 6), Ok(-1));
        assert_eq!(memcmp(&ro, &any(&a, 0), 6), Ok(1));
        let nan = Buffer::from_vec(vec![f64::NAN]);
        assert_eq!(memcmp(&any(&nan, 0), &any(&nan, 0), 8), Ok(1));
    }

    #[test]
    fn memset_fills_the_byte_pattern() {
        let words = filled(0u32, 3);
        memset(&any(&words, 0), 0xab, 8).unwrap();
        assert_eq!(words.to_vec().unwrap(), vec![0xabab_abab, 0xabab_abab, 0]);

        let floats = filled(1.0f32, 1);
        let poly: NullablePolyRef<f32> = Nullable::new(PolyRef::from(SeqIter::<f32>::new(floats)));
        memset(&poly, 0, 4).unwrap();
        assert_eq!(poly.read_at(0), Ok(0.0));
    }

    #[test]
    fn memset_past_the_end_writes_nothing() {
        let words = filled(1u16, 2);
        assert_eq!(
            memset(&any(&words, 1), 0, 4),
            Err(RefError::OutOfBounds { index: 2, len: 2 })
        );
        assert_eq!(words.to_vec().unwrap(), vec![1, 1]);
    }

    #[test]
    fn memchr_returns_a_moved_copy() {
        let buf = iota(6);
        let hay = any(&buf, 1);
        let found = memchr(&hay, &4, 20).unwrap().unwrap();
        assert_eq!(found.distance(&hay), Ok(3));
        assert!(memchr(&hay, &4, 8).unwrap().is_none());
    }

    #[test]
    fn untyped_forms_recover_the_common_element_type() {
        let src = Buffer::from_vec(vec![7u64, 8]);
        let dst = filled(0u64, 2);
        let s = UntypedRef::new(any(&src, 0));
        let d = UntypedRef::new(any(&dst, 0));
        memcpy_untyped(&d, &s, 16).unwrap();
        assert_eq!(dst.to_vec().unwrap(), vec![7, 8]);
        assert_eq!(memcmp_untyped(&d, &s, 16), Ok(0));

        let bytes = UntypedRef::new(any(&filled(0u8, 16), 0));
        assert_eq!(
            memcpy_untyped(&bytes, &s, 16),
            Err(RefError::UnsupportedConversion { type_name: "u8" })
        );

        #[derive(Clone, Default, PartialEq, PartialOrd)]
        struct Opaque(u64);
        let opaque = Buffer::from_vec(vec![Opaque(1)]);
        let o = UntypedRef::new(any(&opaque, 0));
        assert!(matches!(
            memcmp_untyped(&o, &o, 8),
            Err(RefError::UnsupportedConversion { .. })
        ));
    }

    #[test]
    fn one_sided_untyped_forms_take_the_type_from_the_typed_side() {
        let src = Buffer::from_vec(vec![3i16, 4]);
        let dst = filled(0i16, 2);
        let erased_src = UntypedRef::new(any(&src, 0));
        memcpy_from_untyped(&any(&dst, 0), &erased_src, 4).unwrap();
        assert_eq!(dst.to_vec().unwrap(), vec![3, 4]);
        assert_eq!(memcmp_with_untyped(&any(&dst, 0), &erased_src, 4), Ok(0));

        let back = filled(0i16, 2);
        memcpy_to_untyped(&UntypedRef::new(any(&back, 0)), &any(&src, 1), 2).unwrap();
        assert_eq!(back.to_vec().unwrap(), vec![4, 0]);

        let words = UntypedRef::new(any(&filled(0u16, 2), 0));
        assert_eq!(
            memcpy_from_untyped(&any(&dst, 0), &words, 4),
            Err(RefError::UnsupportedConversion { type_name: "u16" })
        );
        assert!(matches!(
            memcmp_with_untyped(&any(&dst, 0), &words, 3),
            Err(RefError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn untyped_size_mismatch_checked_first() {
        let a = UntypedRef::new(any(&filled(0u32, 4), 0));
        let b = UntypedRef::new(any(&filled(0u64, 4), 0));
        assert_eq!(
            memcpy_untyped(&a, &b, 6),
            Err(RefError::SizeMismatch {
                byte_count: 6,
                left_size: 4,
                right_size: 8
            })
        );
    }
}
