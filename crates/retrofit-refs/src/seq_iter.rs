//! Random-access iterator into a fixed [`Buffer`].

use std::cell::{Ref, RefMut};
use std::fmt;
use std::marker::PhantomData;

use retrofit_core::{Access, BackingRef, Mutable, ReadOnly, RefError, SequenceInfo};

use crate::buffer::Buffer;

/// Bounds-checked iterator into a [`Buffer`].
///
/// The position may range over `0..=len` (one-past-the-end is a valid
/// position); dereference is only permitted in `0..len`. Arithmetic that
/// would leave `0..=len` is rejected immediately rather than producing a
/// wild position.
pub struct SeqIter<T, A = Mutable> {
    buf: Buffer<T>,
    index: isize,
    _access: PhantomData<A>,
}

/// Read-only [`SeqIter`].
pub type ConstSeqIter<T> = SeqIter<T, ReadOnly>;

impl<T, A> Clone for SeqIter<T, A> {
    fn clone(&self) -> Self {
        Self {
            buf: self.buf.clone(),
            index: self.index,
            _access: PhantomData,
        }
    }
}

impl<T: 'static, A: Access> SeqIter<T, A> {
    /// Iterator at the first element of `buf`.
    pub fn new(buf: Buffer<T>) -> Self {
        Self {
            buf,
            index: 0,
            _access: PhantomData,
        }
    }

    /// Iterator at position `index` of `buf`.
    pub fn at(buf: Buffer<T>, index: usize) -> Result<Self, RefError> {
        if index > buf.len() {
            return Err(RefError::OutOfBounds {
                index: index as isize,
                len: buf.len(),
            });
        }
        Ok(Self {
            buf,
            index: index as isize,
            _access: PhantomData,
        })
    }

    /// One-past-the-end iterator of `buf`.
    pub fn end(buf: Buffer<T>) -> Self {
        let index = buf.len() as isize;
        Self {
            buf,
            index,
            _access: PhantomData,
        }
    }

    /// The underlying storage.
    pub fn buffer(&self) -> &Buffer<T> {
        &self.buf
    }

    /// Current position.
    pub fn position(&self) -> isize {
        self.index
    }

    fn checked_position(&self, n: isize) -> Result<isize, RefError> {
        let len = self.buf.len();
        match self.index.checked_add(n) {
            Some(i) if i >= 0 && i as usize <= len => Ok(i),
            Some(i) => Err(RefError::OutOfBounds { index: i, len }),
            None => Err(RefError::OutOfBounds {
                index: if n < 0 { isize::MIN } else { isize::MAX },
                len,
            }),
        }
    }
}

impl<T: 'static, A: Access> BackingRef for SeqIter<T, A> {
    type Target = T;
    type Access = A;
    type ReadOnlyTwin = SeqIter<T, ReadOnly>;

    fn read_only(&self) -> SeqIter<T, ReadOnly> {
        SeqIter {
            buf: self.buf.clone(),
            index: self.index,
            _access: PhantomData,
        }
    }

    fn try_deref(&self) -> Result<Ref<'_, T>, RefError> {
        self.buf.get(self.index)
    }

    fn try_deref_mut(&self) -> Result<RefMut<'_, T>, RefError> {
        if !A::WRITABLE {
            return Err(RefError::ReadOnly);
        }
        self.buf.get_mut(self.index)
    }

    fn address(&self) -> Option<usize> {
        Some(self.buf.element_address(self.index))
    }

    // A one-past-the-end address may coincide with the start of another
    // buffer.
    fn same_item(&self, other: &Self) -> bool {
        self == other
    }

    fn try_index(&self, n: isize) -> Result<Ref<'_, T>, RefError> {
        let i = self.index.checked_add(n).ok_or(RefError::OutOfBounds {
            index: n,
            len: self.buf.len(),
        })?;
        self.buf.get(i)
    }

    fn try_index_mut(&self, n: isize) -> Result<RefMut<'_, T>, RefError> {
        if !A::WRITABLE {
            return Err(RefError::ReadOnly);
        }
        let i = self.index.checked_add(n).ok_or(RefError::OutOfBounds {
            index: n,
            len: self.buf.len(),
        })?;
        self.buf.get_mut(i)
    }

    fn try_advance(&mut self, n: isize) -> Result<(), RefError> {
        self.index = self.checked_position(n)?;
        Ok(())
    }

    fn try_distance(&self, other: &Self) -> Result<isize, RefError> {
        if !self.buf.ptr_eq(&other.buf) {
            return Err(RefError::DifferentSequences);
        }
        Ok(self.index - other.index)
    }

    fn sequence(&self) -> Option<SequenceInfo> {
        Some(SequenceInfo {
            start: self.buf.base_address(),
            index: self.index,
            item: self.buf.element_address(self.index),
            len: self.buf.len(),
        })
    }
}

impl<T, A> PartialEq for SeqIter<T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.buf.ptr_eq(&other.buf) && self.index == other.index
    }
}

impl<T, A: Access> fmt::Debug for SeqIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeqIter")
            .field("access", &A::NAME)
            .field("index", &self.index)
            .field("len", &self.buf.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iota(n: u32) -> Buffer<u32> {
        Buffer::from_vec((0..n).collect())
    }

    #[test]
    fn deref_and_index() {
        let it: SeqIter<u32> = SeqIter::at(iota(5), 2).unwrap();
        assert_eq!(*it.try_deref().unwrap(), 2);
        assert_eq!(*it.try_index(2).unwrap(), 4);
        assert_eq!(*it.try_index(-2).unwrap(), 0);
        assert!(matches!(
            it.try_index(3),
            Err(RefError::OutOfBounds { index: 5, len: 5 })
        ));
    }

    #[test]
    fn advance_allows_end_but_not_beyond() {
        let mut it: SeqIter<u32> = SeqIter::new(iota(3));
        it.try_advance(3).unwrap();
        assert!(it.try_deref().is_err());
        assert!(matches!(
            it.try_advance(1),
            Err(RefError::OutOfBounds { index: 4, len: 3 })
        ));
        assert!(matches!(
            it.try_advance(-4),
            Err(RefError::OutOfBounds { index: -1, len: 3 })
        ));
        // Failed arithmetic leaves the position untouched.
        assert_eq!(it.position(), 3);
    }

    #[test]
    fn read_only_rejects_writes() {
        let it: ConstSeqIter<u32> = SeqIter::new(iota(2));
        assert_eq!(it.try_deref_mut().err(), Some(RefError::ReadOnly));
        assert_eq!(it.try_index_mut(1).err(), Some(RefError::ReadOnly));
    }

    #[test]
    fn mutable_writes_through() {
        let buf = iota(2);
        let it: SeqIter<u32> = SeqIter::new(buf.clone());
        *it.try_index_mut(1).unwrap() = 40;
        assert_eq!(*buf.get(1).unwrap(), 40);
    }

    #[test]
    fn distance_requires_same_buffer() {
        let buf = iota(4);
        let a: SeqIter<u32> = SeqIter::at(buf.clone(), 3).unwrap();
        let b: SeqIter<u32> = SeqIter::at(buf, 1).unwrap();
        assert_eq!(a.try_distance(&b), Ok(2));
        assert_eq!(b.try_distance(&a), Ok(-2));

        let c: SeqIter<u32> = SeqIter::new(iota(4));
        assert_eq!(a.try_distance(&c), Err(RefError::DifferentSequences));
    }

    #[test]
    fn end_is_never_the_same_item_as_another_buffer() {
        let a = iota(2);
        let b = iota(2);
        let end: SeqIter<u32> = SeqIter::at(a.clone(), 2).unwrap();
        let other: SeqIter<u32> = SeqIter::new(b);
        assert!(!end.same_item(&other));
        assert!(end.same_item(&SeqIter::at(a, 2).unwrap()));
    }

    #[test]
    fn read_only_twin_points_at_same_item() {
        let it: SeqIter<u32> = SeqIter::at(iota(4), 1).unwrap();
        let ro = it.read_only();
        assert_eq!(it.address(), ro.address());
        assert_eq!(*ro.try_deref().unwrap(), 1);
    }

    #[test]
    fn sequence_reports_container() {
        let buf = iota(4);
        let it: SeqIter<u32> = SeqIter::at(buf.clone(), 2).unwrap();
        let info = it.sequence().unwrap();
        assert_eq!(info.start, buf.base_address());
        assert_eq!(info.index, 2);
        assert_eq!(info.item, buf.element_address(2));
        assert_eq!(info.len, 4);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn position_stays_within_bounds(
                len in 0u32..32,
                steps in proptest::collection::vec(-40isize..40, 0..20),
            ) {
                let mut it: SeqIter<u32> = SeqIter::new(iota(len));
                for n in steps {
                    let _ = it.try_advance(n);
                    prop_assert!(it.position() >= 0);
                    prop_assert!(it.position() as usize <= len as usize);
                }
            }
        }
    }
}
