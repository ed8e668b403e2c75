//! Fixed-length, reference-counted element storage.
//!
//! A [`Buffer`] is the storage behind [`SeqIter`](crate::SeqIter) and
//! [`SharedRef`](crate::SharedRef), and the unit of allocation handed out
//! by the generic allocator. Each element sits in its own `RefCell`, so
//! distinct elements can be borrowed mutably at the same time while
//! aliasing violations on one element are reported as
//! [`RefError::BorrowConflict`].

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use retrofit_core::RefError;

/// Shared, fixed-length storage with stable element addresses.
///
/// Cloning a `Buffer` clones the handle, not the elements.
pub struct Buffer<T> {
    cells: Rc<[RefCell<T>]>,
}

impl<T> Clone for Buffer<T> {
    fn clone(&self) -> Self {
        Self {
            cells: Rc::clone(&self.cells),
        }
    }
}

impl<T> Buffer<T> {
    /// Take ownership of `values` as a buffer.
    pub fn from_vec(values: Vec<T>) -> Self {
        Self {
            cells: values.into_iter().map(RefCell::new).collect(),
        }
    }

    /// Allocate `len` default-initialised elements.
    ///
    /// Returns `None` if the element storage cannot be reserved.
    pub fn try_with_len(len: usize) -> Option<Self>
    where
        T: Default,
    {
        let mut cells: Vec<RefCell<T>> = Vec::new();
        cells.try_reserve_exact(len).ok()?;
        cells.extend(std::iter::repeat_with(|| RefCell::new(T::default())).take(len));
        Some(Self {
            cells: Rc::from(cells),
        })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the buffer has no elements.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Address of element 0 (or of the empty allocation).
    pub fn base_address(&self) -> usize {
        self.cells.as_ptr() as usize
    }

    /// Distance in address units between consecutive elements.
    pub fn stride() -> usize {
        std::mem::size_of::<RefCell<T>>()
    }

    /// Address of the element at `index`.
    ///
    /// Defined for any index, including one-past-the-end; only
    /// `0..len` may be dereferenced.
    pub fn element_address(&self, index: isize) -> usize {
        self.base_address()
            .wrapping_add_signed(index.wrapping_mul(Self::stride() as isize))
    }

    fn cell(&self, index: isize) -> Result<&RefCell<T>, RefError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.cells.get(i))
            .ok_or(RefError::OutOfBounds {
                index,
                len: self.cells.len(),
            })
    }

    /// Borrow the element at `index`.
    pub fn get(&self, index: isize) -> Result<Ref<'_, T>, RefError> {
        self.cell(index)?
            .try_borrow()
            .map_err(|_| RefError::BorrowConflict)
    }

    /// Mutably borrow the element at `index`.
    pub fn get_mut(&self, index: isize) -> Result<RefMut<'_, T>, RefError> {
        self.cell(index)?
            .try_borrow_mut()
            .map_err(|_| RefError::BorrowConflict)
    }

    /// Overwrite the element at `index`.
    pub fn set(&self, index: isize, value: T) -> Result<(), RefError> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    /// Copy all elements out.
    pub fn to_vec(&self) -> Result<Vec<T>, RefError>
    where
        T: Clone,
    {
        self.cells
            .iter()
            .map(|c| {
                c.try_borrow()
                    .map(|v| v.clone())
                    .map_err(|_| RefError::BorrowConflict)
            })
            .collect()
    }

    /// Whether both handles share the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cells, &other.cells)
    }

    /// Number of live handles to this storage.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.cells)
    }
}

impl<T> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("base", &format_args!("{:#x}", self.base_address()))
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_with_len_default_initialises() {
        let buf: Buffer<u32> = Buffer::try_with_len(4).unwrap();
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.to_vec().unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn out_of_bounds_get_is_an_error() {
        let buf = Buffer::from_vec(vec![1u8, 2, 3]);
        assert_eq!(
            buf.get(3).err(),
            Some(RefError::OutOfBounds { index: 3, len: 3 })
        );
        assert_eq!(
            buf.get(-1).err(),
            Some(RefError::OutOfBounds { index: -1, len: 3 })
        );
    }

    #[test]
    fn distinct_elements_borrow_independently() {
        let buf = Buffer::from_vec(vec![1u8, 2]);
        let mut a = buf.get_mut(0).unwrap();
        let mut b = buf.get_mut(1).unwrap();
        std::mem::swap(&mut *a, &mut *b);
        drop((a, b));
        assert_eq!(buf.to_vec().unwrap(), vec![2, 1]);
    }

    #[test]
    fn aliasing_mutable_borrow_conflicts() {
        let buf = Buffer::from_vec(vec![1u8]);
        let _guard = buf.get(0).unwrap();
        assert_eq!(buf.get_mut(0).err(), Some(RefError::BorrowConflict));
    }

    #[test]
    fn element_addresses_are_strided() {
        let buf = Buffer::from_vec(vec![0u64; 3]);
        let stride = Buffer::<u64>::stride();
        assert_eq!(buf.element_address(0), buf.base_address());
        assert_eq!(buf.element_address(2), buf.base_address() + 2 * stride);
    }

    #[test]
    fn clone_shares_storage() {
        let buf = Buffer::from_vec(vec![7i32]);
        let other = buf.clone();
        assert!(buf.ptr_eq(&other));
        assert_eq!(buf.handle_count(), 2);
        other.set(0, 9).unwrap();
        assert_eq!(*buf.get(0).unwrap(), 9);
    }
}
