//! Growable shared vector and its random-access iterator.
//!
//! Unlike [`Buffer`](crate::Buffer), a [`SharedVec`] can grow and shrink
//! after iterators into it exist. [`VecIter`] therefore checks bounds
//! against the length at the moment of dereference, so an iterator that a
//! `truncate` left behind reports [`RefError::OutOfBounds`] instead of
//! reading freed memory.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use retrofit_core::{Access, BackingRef, Mutable, ReadOnly, RefError, SequenceInfo};

/// Reference-counted, growable vector storage.
pub struct SharedVec<T> {
    inner: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for SharedVec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> SharedVec<T> {
    /// Take ownership of `values`.
    pub fn new(values: Vec<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(values)),
        }
    }

    /// Current length.
    pub fn len(&self) -> Result<usize, RefError> {
        Ok(self.borrow()?.len())
    }

    /// Whether the vector is currently empty.
    pub fn is_empty(&self) -> Result<bool, RefError> {
        Ok(self.borrow()?.is_empty())
    }

    /// Append an element.
    pub fn push(&self, value: T) -> Result<(), RefError> {
        self.borrow_mut()?.push(value);
        Ok(())
    }

    /// Shorten the vector to `len` elements.
    pub fn truncate(&self, len: usize) -> Result<(), RefError> {
        self.borrow_mut()?.truncate(len);
        Ok(())
    }

    /// Iterator at the first element.
    pub fn begin<A: Access>(&self) -> VecIter<T, A> {
        VecIter {
            vec: self.clone(),
            index: 0,
            _access: PhantomData,
        }
    }

    /// One-past-the-end iterator at the current length.
    pub fn end<A: Access>(&self) -> Result<VecIter<T, A>, RefError> {
        Ok(VecIter {
            vec: self.clone(),
            index: self.len()? as isize,
            _access: PhantomData,
        })
    }

    fn borrow(&self) -> Result<Ref<'_, Vec<T>>, RefError> {
        self.inner.try_borrow().map_err(|_| RefError::BorrowConflict)
    }

    fn borrow_mut(&self) -> Result<RefMut<'_, Vec<T>>, RefError> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| RefError::BorrowConflict)
    }

    // Identity of the container, not of its heap block: the block moves on
    // growth, the container does not.
    fn base_address(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }

    fn stride() -> usize {
        std::mem::size_of::<T>().max(1)
    }

    fn get(&self, index: isize) -> Result<Ref<'_, T>, RefError> {
        let vec = self.borrow()?;
        let len = vec.len();
        let i = usize::try_from(index).map_err(|_| RefError::OutOfBounds { index, len })?;
        Ref::filter_map(vec, |v| v.get(i)).map_err(|_| RefError::OutOfBounds { index, len })
    }

    fn get_mut(&self, index: isize) -> Result<RefMut<'_, T>, RefError> {
        let vec = self.borrow_mut()?;
        let len = vec.len();
        let i = usize::try_from(index).map_err(|_| RefError::OutOfBounds { index, len })?;
        RefMut::filter_map(vec, |v| v.get_mut(i)).map_err(|_| RefError::OutOfBounds { index, len })
    }
}

/// Iterator into a [`SharedVec`].
///
/// Mutable dereference borrows the whole vector for the lifetime of the
/// guard, so two live mutable guards into one vector conflict.
pub struct VecIter<T, A = Mutable> {
    vec: SharedVec<T>,
    index: isize,
    _access: PhantomData<A>,
}

/// Read-only [`VecIter`].
pub type ConstVecIter<T> = VecIter<T, ReadOnly>;

impl<T, A> Clone for VecIter<T, A> {
    fn clone(&self) -> Self {
        Self {
            vec: self.vec.clone(),
            index: self.index,
            _access: PhantomData,
        }
    }
}

impl<T: 'static, A: Access> VecIter<T, A> {
    /// Current position.
    pub fn position(&self) -> isize {
        self.index
    }
}

impl<T: 'static, A: Access> BackingRef for VecIter<T, A> {
    type Target = T;
    type Access = A;
    type ReadOnlyTwin = VecIter<T, ReadOnly>;

    fn read_only(&self) -> VecIter<T, ReadOnly> {
        VecIter {
            vec: self.vec.clone(),
            index: self.index,
            _access: PhantomData,
        }
    }

    fn try_deref(&self) -> Result<Ref<'_, T>, RefError> {
        self.vec.get(self.index)
    }

    fn try_deref_mut(&self) -> Result<RefMut<'_, T>, RefError> {
        if !A::WRITABLE {
            return Err(RefError::ReadOnly);
        }
        self.vec.get_mut(self.index)
    }

    // Container-relative: only meaningful next to another iterator into the
    // same vector. Identity comparisons go through `same_item`.
    fn address(&self) -> Option<usize> {
        Some(
            self.vec
                .base_address()
                .wrapping_add_signed(self.index.wrapping_mul(SharedVec::<T>::stride() as isize)),
        )
    }

    fn same_item(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.vec.inner, &other.vec.inner) && self.index == other.index
    }

    fn try_index(&self, n: isize) -> Result<Ref<'_, T>, RefError> {
        self.vec.get(self.index.saturating_add(n))
    }

    fn try_index_mut(&self, n: isize) -> Result<RefMut<'_, T>, RefError> {
        if !A::WRITABLE {
            return Err(RefError::ReadOnly);
        }
        self.vec.get_mut(self.index.saturating_add(n))
    }

    fn try_advance(&mut self, n: isize) -> Result<(), RefError> {
        let len = self.vec.len()?;
        match self.index.checked_add(n) {
            Some(i) if i >= 0 && i as usize <= len => {
                self.index = i;
                Ok(())
            }
            other => Err(RefError::OutOfBounds {
                index: other.unwrap_or(isize::MAX),
                len,
            }),
        }
    }

    fn try_distance(&self, other: &Self) -> Result<isize, RefError> {
        if !Rc::ptr_eq(&self.vec.inner, &other.vec.inner) {
            return Err(RefError::DifferentSequences);
        }
        Ok(self.index - other.index)
    }

    fn sequence(&self) -> Option<SequenceInfo> {
        let len = self.vec.len().ok()?;
        Some(SequenceInfo {
            start: self.vec.base_address(),
            index: self.index,
            item: self.address()?,
            len,
        })
    }
}

impl<T, A: Access> fmt::Debug for VecIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VecIter")
            .field("access", &A::NAME)
            .field("index", &self.index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deref_tracks_current_length() {
        let v = SharedVec::new(vec![1, 2, 3]);
        let mut it: VecIter<i32> = v.begin();
        it.try_advance(2).unwrap();
        assert_eq!(*it.try_deref().unwrap(), 3);

        v.truncate(2).unwrap();
        assert_eq!(
            it.try_deref().err(),
            Some(RefError::OutOfBounds { index: 2, len: 2 })
        );

        v.push(30).unwrap();
        assert_eq!(*it.try_deref().unwrap(), 30);
    }

    #[test]
    fn address_is_stable_across_growth() {
        let v = SharedVec::new(vec![0u8; 1]);
        let it: VecIter<u8> = v.begin();
        let before = it.address();
        for i in 0..64 {
            v.push(i).unwrap();
        }
        assert_eq!(it.address(), before);
    }

    #[test]
    fn same_item_never_crosses_vectors() {
        for _ in 0..200 {
            let a = SharedVec::new(vec![0u64; 64]);
            let b = SharedVec::new(vec![9u64; 1]);
            let theirs: VecIter<u64> = b.begin();
            let mut ours: VecIter<u64> = a.begin();
            for k in 0..64 {
                assert!(!ours.same_item(&theirs), "a[{k}] aliased b[0]");
                ours.try_advance(1).unwrap();
            }
        }
    }

    #[test]
    fn same_item_within_one_vector() {
        let v = SharedVec::new(vec![1u8, 2]);
        let a: VecIter<u8> = v.begin();
        let mut b: VecIter<u8> = v.begin();
        assert!(a.same_item(&b));
        assert!(a.read_only().same_item(&b.read_only()));
        b.try_advance(1).unwrap();
        assert!(!a.same_item(&b));
    }

    #[test]
    fn live_mutable_guard_blocks_push() {
        let v = SharedVec::new(vec![1u8]);
        let it: VecIter<u8> = v.begin();
        let guard = it.try_deref_mut().unwrap();
        assert_eq!(v.push(2).err(), Some(RefError::BorrowConflict));
        drop(guard);
        v.push(2).unwrap();
        assert_eq!(v.len(), Ok(2));
    }

    #[test]
    fn distance_and_end() {
        let v = SharedVec::new(vec![5u8; 4]);
        let begin: VecIter<u8> = v.begin();
        let end: VecIter<u8> = v.end().unwrap();
        assert_eq!(end.try_distance(&begin), Ok(4));

        let other = SharedVec::new(vec![5u8; 4]);
        let foreign: VecIter<u8> = other.begin();
        assert_eq!(
            begin.try_distance(&foreign),
            Err(RefError::DifferentSequences)
        );
    }

    #[test]
    fn read_only_level_rejects_writes() {
        let v = SharedVec::new(vec![1u8]);
        let it: ConstVecIter<u8> = v.begin();
        assert_eq!(it.try_deref_mut().err(), Some(RefError::ReadOnly));
        assert_eq!(it.sequence().map(|s| s.len), Some(1));
    }
}
