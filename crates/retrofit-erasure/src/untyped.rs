//! Fully erased references: [`UntypedRef`].
//!
//! An `UntypedRef` forgets even the element type. The element type is
//! recovered by naming it; the buffer API tries a fixed list of
//! primitive types this way before giving up.

use std::any::{type_name, Any};
use std::fmt;
use std::mem::size_of;

use retrofit_core::{Access, Mutable, ReadOnly, RefError};

use crate::any::{AnyConstRef, AnyRef};

trait UntypedCommon: Any {
    fn elem_type_name(&self) -> &'static str;
    fn elem_size(&self) -> usize;
    fn address(&self) -> Option<usize>;
    fn is_writable(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn clone_box(&self) -> Box<dyn UntypedCommon>;
}

impl<T: 'static, A: Access> UntypedCommon for AnyRef<T, A> {
    fn elem_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn elem_size(&self) -> usize {
        size_of::<T>()
    }

    fn address(&self) -> Option<usize> {
        AnyRef::address(self)
    }

    fn is_writable(&self) -> bool {
        A::WRITABLE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn UntypedCommon> {
        Box::new(self.clone())
    }
}

/// A reference whose element type has been erased too.
pub struct UntypedRef {
    inner: Box<dyn UntypedCommon>,
}

impl UntypedRef {
    /// Forget the element type of `r`.
    pub fn new<T: 'static, A: Access>(r: AnyRef<T, A>) -> Self {
        Self { inner: Box::new(r) }
    }

    /// Whether the element type is `T`.
    pub fn holds<T: 'static>(&self) -> bool {
        let any = self.inner.as_any();
        any.is::<AnyRef<T, Mutable>>() || any.is::<AnyRef<T, ReadOnly>>()
    }

    /// Recover a mutable reference to `T`.
    ///
    /// A mismatched `T` fails with [`RefError::UnsupportedConversion`]
    /// naming the stored element type. Fails with [`RefError::ReadOnly`] if the element type matches but the
    /// reference was erased from a read-only one.
    pub fn recover<T: 'static>(&self) -> Result<AnyRef<T>, RefError> {
        let any = self.inner.as_any();
        if let Some(r) = any.downcast_ref::<AnyRef<T, Mutable>>() {
            return Ok(r.clone());
        }
        if any.is::<AnyRef<T, ReadOnly>>() {
            return Err(RefError::ReadOnly);
        }
        Err(RefError::UnsupportedConversion {
            type_name: self.elem_type_name(),
        })
    }

    /// Recover a read-only reference to `T`, from either capability level.
    pub fn recover_read_only<T: 'static>(&self) -> Result<AnyConstRef<T>, RefError> {
        let any = self.inner.as_any();
        if let Some(r) = any.downcast_ref::<AnyRef<T, ReadOnly>>() {
            return Ok(r.clone());
        }
        if let Some(r) = any.downcast_ref::<AnyRef<T, Mutable>>() {
            return Ok(r.clone().into_read_only());
        }
        Err(RefError::UnsupportedConversion {
            type_name: self.elem_type_name(),
        })
    }

    /// Name of the erased element type.
    pub fn elem_type_name(&self) -> &'static str {
        self.inner.elem_type_name()
    }

    /// Size in bytes of the erased element type.
    pub fn elem_size(&self) -> usize {
        self.inner.elem_size()
    }

    /// Identity of the referenced item, `None` when natively null.
    pub fn address(&self) -> Option<usize> {
        self.inner.address()
    }

    /// Whether the reference was erased from a mutable one.
    pub fn is_writable(&self) -> bool {
        self.inner.is_writable()
    }
}

impl<T: 'static, A: Access> From<AnyRef<T, A>> for UntypedRef {
    fn from(r: AnyRef<T, A>) -> Self {
        Self::new(r)
    }
}

impl Clone for UntypedRef {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_box(),
        }
    }
}

impl fmt::Debug for UntypedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UntypedRef")
            .field("element", &self.elem_type_name())
            .field("writable", &self.is_writable())
            .field("address", &self.address())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrofit_refs::{Buffer, SeqIter};

    #[test]
    fn recovers_by_element_type() {
        let buf = Buffer::from_vec(vec![1u32, 2, 3]);
        let u = UntypedRef::from(AnyRef::<u32>::new(SeqIter::<u32>::new(buf)));
        assert!(u.holds::<u32>());
        assert!(!u.holds::<i32>());
        assert_eq!(u.elem_size(), 4);

        let r = u.recover::<u32>().unwrap();
        *r.try_deref_mut().unwrap() = 9;
        assert_eq!(*u.recover_read_only::<u32>().unwrap().try_deref().unwrap(), 9);
        assert_eq!(
            u.recover::<i32>().err(),
            Some(RefError::UnsupportedConversion { type_name: "u32" })
        );
        assert_eq!(
            u.recover_read_only::<u64>().err(),
            Some(RefError::UnsupportedConversion { type_name: "u32" })
        );
    }

    #[test]
    fn read_only_never_widens() {
        let buf = Buffer::from_vec(vec![1u8]);
        let u = UntypedRef::new(AnyConstRef::<u8>::new(SeqIter::<u8>::new(buf)));
        assert!(!u.is_writable());
        assert_eq!(u.recover::<u8>().err(), Some(RefError::ReadOnly));
        assert!(u.recover_read_only::<u8>().is_ok());
    }

    #[test]
    fn clone_shares_the_item() {
        let buf = Buffer::from_vec(vec![0i64; 2]);
        let u = UntypedRef::new(AnyRef::<i64>::new(SeqIter::<i64>::new(buf)));
        assert_eq!(u.clone().address(), u.address());
    }
}
