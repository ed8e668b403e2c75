//! Reference-counted pointer to a single element.

use std::cell::{Ref, RefMut};
use std::fmt;
use std::marker::PhantomData;

use retrofit_core::{Access, BackingRef, Mutable, ReadOnly, RefError};

use crate::buffer::Buffer;

/// Keeps one element of a [`Buffer`] alive and points at it.
///
/// Either owns a fresh one-element buffer ([`SharedRef::new`]) or aliases
/// an element of an existing buffer ([`SharedRef::aliasing`]). Not
/// random-access and exposes no container lookup: pointer arithmetic and
/// debug introspection through an erased `SharedRef` report
/// "unsupported" / "unavailable".
pub struct SharedRef<T, A = Mutable> {
    buf: Buffer<T>,
    index: isize,
    _access: PhantomData<A>,
}

/// Read-only [`SharedRef`].
pub type ConstSharedRef<T> = SharedRef<T, ReadOnly>;

impl<T, A> Clone for SharedRef<T, A> {
    fn clone(&self) -> Self {
        Self {
            buf: self.buf.clone(),
            index: self.index,
            _access: PhantomData,
        }
    }
}

impl<T: 'static, A: Access> SharedRef<T, A> {
    /// Allocate `value` and point at it.
    pub fn new(value: T) -> Self {
        Self {
            buf: Buffer::from_vec(vec![value]),
            index: 0,
            _access: PhantomData,
        }
    }

    /// Point at element `index` of `buf`, keeping the buffer alive.
    pub fn aliasing(buf: &Buffer<T>, index: usize) -> Result<Self, RefError> {
        if index >= buf.len() {
            return Err(RefError::OutOfBounds {
                index: index as isize,
                len: buf.len(),
            });
        }
        Ok(Self {
            buf: buf.clone(),
            index: index as isize,
            _access: PhantomData,
        })
    }

    /// Number of live handles to the underlying storage.
    pub fn handle_count(&self) -> usize {
        self.buf.handle_count()
    }
}

impl<T: 'static, A: Access> BackingRef for SharedRef<T, A> {
    type Target = T;
    type Access = A;
    type ReadOnlyTwin = SharedRef<T, ReadOnly>;

    fn read_only(&self) -> SharedRef<T, ReadOnly> {
        SharedRef {
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
}

impl<T, A: Access> fmt::Debug for SharedRef<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRef")
            .field("access", &A::NAME)
            .field("index", &self.index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_owns_its_value() {
        let r: SharedRef<String> = SharedRef::new("hello".to_owned());
        r.try_deref_mut().unwrap().push('!');
        assert_eq!(&*r.try_deref().unwrap(), "hello!");
        assert_eq!(r.handle_count(), 1);
    }

    #[test]
    fn aliasing_shares_buffer() {
        let buf = Buffer::from_vec(vec![1u16, 2, 3]);
        let r: SharedRef<u16> = SharedRef::aliasing(&buf, 2).unwrap();
        assert_eq!(r.address(), Some(buf.element_address(2)));
        assert_eq!(buf.handle_count(), 2);
        drop(buf);
        assert_eq!(*r.try_deref().unwrap(), 3);
    }

    #[test]
    fn aliasing_past_end_is_rejected() {
        let buf = Buffer::from_vec(vec![1u16]);
        assert!(SharedRef::<u16>::aliasing(&buf, 1).is_err());
    }

    #[test]
    fn no_pointer_arithmetic() {
        let mut r: SharedRef<u8> = SharedRef::new(1);
        assert!(matches!(
            r.try_advance(1),
            Err(RefError::Unsupported { operation: "advance", .. })
        ));
        assert!(r.sequence().is_none());
    }
}
