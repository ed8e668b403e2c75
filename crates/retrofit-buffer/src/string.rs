//! NUL-terminated string functions over erased references.
//!
//! Strings are sequences of [`CodeUnit`]s ending at the first NUL unit.
//! Every read goes through the erased interface, so a string that runs
//! off the end of its backing sequence reports
//! [`RefError::OutOfBounds`] instead of reading past it.

use std::cmp::Ordering;

use retrofit_core::RefError;
use retrofit_erasure::Erasure;

use crate::mem::writable_span;

/// One unit of a NUL-terminated string.
pub trait CodeUnit: Copy + Eq + 'static {
    /// The terminator.
    const NUL: Self;

    /// Unsigned value used for ordering, as C compares `unsigned char`.
    fn to_u32(self) -> u32;

    /// Whether this is the terminator.
    fn is_nul(self) -> bool {
        self == Self::NUL
    }
}

impl CodeUnit for u8 {
    const NUL: Self = 0;

    fn to_u32(self) -> u32 {
        u32::from(self)
    }
}

impl CodeUnit for i8 {
    const NUL: Self = 0;

    fn to_u32(self) -> u32 {
        u32::from(self as u8)
    }
}

impl CodeUnit for u16 {
    const NUL: Self = 0;

    fn to_u32(self) -> u32 {
        u32::from(self)
    }
}

impl CodeUnit for u32 {
    const NUL: Self = 0;

    fn to_u32(self) -> u32 {
        self
    }
}

impl CodeUnit for char {
    const NUL: Self = '\0';

    fn to_u32(self) -> u32 {
        u32::from(self)
    }
}

fn unit_at<E>(s: &E, i: usize) -> Result<E::Target, RefError>
where
    E: Erasure,
    E::Target: CodeUnit,
{
    let i = isize::try_from(i).map_err(|_| RefError::OutOfBounds {
        index: isize::MAX,
        len: 0,
    })?;
    Ok(*s.try_index(i)?)
}

/// Number of units before the terminator.
pub fn strlen<E>(s: &E) -> Result<usize, RefError>
where
    E: Erasure,
    E::Target: CodeUnit,
{
    let mut n = 0;
    while !unit_at(s, n)?.is_nul() {
        n += 1;
    }
    Ok(n)
}

/// Number of units before the terminator, looking at no more than `max`.
pub fn strnlen<E>(s: &E, max: usize) -> Result<usize, RefError>
where
    E: Erasure,
    E::Target: CodeUnit,
{
    for n in 0..max {
        if unit_at(s, n)?.is_nul() {
            return Ok(n);
        }
    }
    Ok(max)
}

/// Copy `src` including its terminator into `dst`.
///
/// Returns the length of the copied string. The whole source is read and
/// `dst` is checked for room before anything is written, so a failed copy
/// leaves `dst` unchanged.
pub fn strcpy<D, S>(dst: &D, src: &S) -> Result<usize, RefError>
where
    D: Erasure,
    S: Erasure<Target = D::Target>,
    D::Target: CodeUnit,
{
    let len = strlen(src)?;
    let staged = (0..=len)
        .map(|i| unit_at(src, i))
        .collect::<Result<Vec<_>, _>>()?;
    writable_span(dst, staged.len())?;
    for (i, unit) in (0..).zip(staged) {
        dst.write_at(i, unit)?;
    }
    Ok(len)
}

/// Copy at most `n` units of `src` into `dst`, padding with NUL up to `n`.
///
/// As in C, `dst` is not terminated when `src` has `n` or more units.
pub fn strncpy<D, S>(dst: &D, src: &S, n: usize) -> Result<(), RefError>
where
    D: Erasure,
    S: Erasure<Target = D::Target>,
    D::Target: CodeUnit,
{
    let count = writable_span(dst, n)?;
    let len = strnlen(src, n)?;
    let staged = (0..len)
        .map(|i| unit_at(src, i))
        .collect::<Result<Vec<_>, _>>()?;
    let padding = std::iter::repeat(D::Target::NUL);
    for (i, unit) in (0..count).zip(staged.into_iter().chain(padding)) {
        dst.write_at(i, unit)?;
    }
    Ok(())
}

fn compare<L, R>(left: &L, right: &R, limit: Option<usize>) -> Result<i32, RefError>
where
    L: Erasure,
    R: Erasure<Target = L::Target>,
    L::Target: CodeUnit,
{
    let mut i = 0;
    while limit.is_none_or(|n| i < n) {
        let a = unit_at(left, i)?;
        let b = unit_at(right, i)?;
        match a.to_u32().cmp(&b.to_u32()) {
            Ordering::Less => return Ok(-1),
            Ordering::Greater => return Ok(1),
            Ordering::Equal if a.is_nul() => return Ok(0),
            Ordering::Equal => i += 1,
        }
    }
    Ok(0)
}

/// Compare two strings; -1, 0 or 1.
pub fn strcmp<L, R>(left: &L, right: &R) -> Result<i32, RefError>
where
    L: Erasure,
    R: Erasure<Target = L::Target>,
    L::Target: CodeUnit,
{
    compare(left, right, None)
}

/// Compare at most `n` units of two strings; -1, 0 or 1.
pub fn strncmp<L, R>(left: &L, right: &R, n: usize) -> Result<i32, RefError>
where
    L: Erasure,
    R: Erasure<Target = L::Target>,
    L::Target: CodeUnit,
{
    compare(left, right, Some(n))
}

/// Find the first `unit` in `s`, returning a copy of `s` moved to it.
///
/// Searching for NUL finds the terminator.
pub fn strchr<E>(s: &E, unit: E::Target) -> Result<Option<E>, RefError>
where
    E: Erasure,
    E::Target: CodeUnit,
{
    let mut i = 0;
    loop {
        let u = unit_at(s, i)?;
        if u == unit {
            let mut found = s.clone();
            found.advance(i as isize)?;
            return Ok(Some(found));
        }
        if u.is_nul() {
            return Ok(None);
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrofit_erasure::{AnyRef, Nullable, NullableAnyRef};
    use retrofit_refs::{Buffer, SeqIter};
    use retrofit_test_utils::{cstr, filled, wide_cstr};

    fn at<T: 'static>(buf: &Buffer<T>, i: usize) -> AnyRef<T> {
        AnyRef::new(SeqIter::<T>::at(buf.clone(), i).unwrap())
    }

    #[test]
    fn strlen_stops_at_terminator() {
        assert_eq!(strlen(&at(&cstr("hello", 3), 0)), Ok(5));
        assert_eq!(strlen(&at(&cstr("hello", 0), 2)), Ok(3));
        assert_eq!(strlen(&at(&wide_cstr("héllo", 0), 0)), Ok(5));
        assert_eq!(strnlen(&at(&cstr("hello", 0), 0), 3), Ok(3));
        assert_eq!(strnlen(&at(&cstr("hi", 0), 0), 9), Ok(2));
    }

    #[test]
    fn unterminated_string_is_out_of_bounds() {
        let raw = Buffer::from_vec(b"abc".to_vec());
        assert_eq!(
            strlen(&at(&raw, 0)),
            Err(RefError::OutOfBounds { index: 3, len: 3 })
        );
    }

    #[test]
    fn strcpy_copies_the_terminator() {
        let dst = filled(b'x', 6);
        assert_eq!(strcpy(&at(&dst, 0), &at(&cstr("abc", 0), 0)), Ok(3));
        assert_eq!(dst.to_vec().unwrap(), b"abc\0xx".to_vec());
    }

    #[test]
    fn copies_into_a_short_destination_write_nothing() {
        let short = filled(b'x', 2);
        assert_eq!(
            strcpy(&at(&short, 0), &at(&cstr("abc", 0), 0)),
            Err(RefError::OutOfBounds { index: 3, len: 2 })
        );
        assert_eq!(short.to_vec().unwrap(), b"xx".to_vec());

        assert_eq!(
            strncpy(&at(&short, 1), &at(&cstr("ab", 0), 0), 4),
            Err(RefError::OutOfBounds { index: 4, len: 2 })
        );
        assert_eq!(short.to_vec().unwrap(), b"xx".to_vec());

        assert!(matches!(
            strncpy(&at(&short, 0), &at(&cstr("ab", 0), 0), usize::MAX),
            Err(RefError::OutOfBounds { .. })
        ));
        assert_eq!(short.to_vec().unwrap(), b"xx".to_vec());
    }

    #[test]
    fn strncpy_pads_or_truncates() {
        let dst = filled(b'x', 6);
        strncpy(&at(&dst, 0), &at(&cstr("ab", 0), 0), 5).unwrap();
        assert_eq!(dst.to_vec().unwrap(), b"ab\0\0\0x".to_vec());

        let dst = filled(b'x', 4);
        strncpy(&at(&dst, 0), &at(&cstr("abcdef", 0), 0), 3).unwrap();
        assert_eq!(dst.to_vec().unwrap(), b"abcx".to_vec());
    }

    #[test]
    fn strcmp_compares_as_unsigned() {
        let abc = cstr("abc", 0);
        let abd = cstr("abd", 0);
        let ab = cstr("ab", 0);
        assert_eq!(strcmp(&at(&abc, 0), &at(&abc, 0)), Ok(0));
        assert_eq!(strcmp(&at(&abc, 0), &at(&abd, 0)), Ok(-1));
        assert_eq!(strcmp(&at(&abc, 0), &at(&ab, 0)), Ok(1));
        assert_eq!(strncmp(&at(&abc, 0), &at(&abd, 0), 2), Ok(0));

        let high = Buffer::from_vec(vec![-1i8, 0]);
        let low = Buffer::from_vec(vec![1i8, 0]);
        assert_eq!(strcmp(&at(&high, 0), &at(&low, 0)), Ok(1));
    }

    #[test]
    fn strchr_finds_units_and_the_terminator() {
        let s = cstr("hello", 0);
        let base = at(&s, 0);
        let l = strchr(&base, b'l').unwrap().unwrap();
        assert_eq!(l.distance(&base), Ok(2));
        let end = strchr(&base, 0).unwrap().unwrap();
        assert_eq!(end.distance(&base), Ok(5));
        assert!(strchr(&base, b'z').unwrap().is_none());
    }

    #[test]
    fn works_through_nullable_adapters() {
        let s = cstr("xy", 0);
        let n: NullableAnyRef<u8> = Nullable::new(at(&s, 0));
        assert_eq!(strlen(&n), Ok(2));
        let empty: NullableAnyRef<u8> = Nullable::null();
        assert_eq!(strlen(&empty), Err(RefError::NullDereference));
    }
}
