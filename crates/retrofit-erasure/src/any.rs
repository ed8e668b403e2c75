//! Open type erasure: [`AnyRef`].
//!
//! An `AnyRef<T>` owns exactly one backing reference, fixed at
//! construction, behind a boxed [`CommonRef`] adapter. Any
//! [`BackingRef`] with element type `T` can be stored; the concrete value
//! is recoverable only through [`AnyRef::recover`], which checks the
//! dynamic type.

use std::any::type_name;
use std::cell::{Ref, RefMut};
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use retrofit_core::{Access, BackingRef, Grants, Mutable, Null, ReadOnly, RefError, SequenceInfo};

use retrofit_refs::{RegisteredRef, SeqIter, SharedRef, VecIter};

use crate::common::{Adapter, CommonRef};
use crate::erasure::Erasure;

/// A type-erased reference to `T` at capability level `A`.
///
/// `AnyRef<T>` may read and write; [`AnyConstRef<T>`] may only read and
/// accepts both mutable and read-only backing references. Values of the
/// two levels compare with each other directly.
pub struct AnyRef<T: 'static, A = Mutable> {
    inner: Box<dyn CommonRef<T>>,
    _access: PhantomData<A>,
}

/// Read-only [`AnyRef`].
pub type AnyConstRef<T> = AnyRef<T, ReadOnly>;

impl<T: 'static, A: Access> AnyRef<T, A> {
    /// Erase `backing`.
    ///
    /// A read-only backing reference cannot be erased into a mutable
    /// `AnyRef`; this is enforced at compile time through [`Grants`].
    pub fn new<B>(backing: B) -> Self
    where
        B: BackingRef<Target = T>,
        B::Access: Grants<A>,
    {
        Self {
            inner: Box::new(Adapter(backing)),
            _access: PhantomData,
        }
    }

    /// Recover the concrete backing reference.
    ///
    /// Succeeds on an exact dynamic-type match, or when `B` is the
    /// read-only twin of the stored type. Never widens access: a read-only
    /// `AnyRef` only yields read-only backing references.
    pub fn recover<B>(&self) -> Option<B>
    where
        B: BackingRef<Target = T>,
        A: Grants<B::Access>,
    {
        if let Some(adapter) = self.inner.downcast_ref::<Adapter<B>>() {
            return Some(adapter.0.clone());
        }
        self.inner.read_only_twin().downcast::<B>().ok().map(|b| *b)
    }

    /// Borrow the referenced item.
    pub fn try_deref(&self) -> Result<Ref<'_, T>, RefError> {
        self.inner.try_deref()
    }

    /// Mutably borrow the referenced item.
    pub fn try_deref_mut(&self) -> Result<RefMut<'_, T>, RefError> {
        if !A::WRITABLE {
            return Err(RefError::ReadOnly);
        }
        self.inner.try_deref_mut()
    }

    /// Borrow the item `n` positions away.
    pub fn try_index(&self, n: isize) -> Result<Ref<'_, T>, RefError> {
        self.inner.try_index(n)
    }

    /// Mutably borrow the item `n` positions away.
    pub fn try_index_mut(&self, n: isize) -> Result<RefMut<'_, T>, RefError> {
        if !A::WRITABLE {
            return Err(RefError::ReadOnly);
        }
        self.inner.try_index_mut(n)
    }

    /// Move by `n` positions.
    pub fn advance(&mut self, n: isize) -> Result<(), RefError> {
        self.inner.advance(n)
    }

    /// A copy moved by `n` positions.
    pub fn offset(&self, n: isize) -> Result<Self, RefError> {
        let mut moved = self.clone();
        moved.advance(n)?;
        Ok(moved)
    }

    /// Signed positions from `other` to `self`.
    pub fn distance<A2: Access>(&self, other: &AnyRef<T, A2>) -> Result<isize, RefError> {
        self.inner.distance(&*other.inner)
    }

    /// Order by position; fails where [`distance`](Self::distance) fails.
    pub fn try_cmp<A2: Access>(&self, other: &AnyRef<T, A2>) -> Result<Ordering, RefError> {
        Ok(self.distance(other)?.cmp(&0))
    }

    /// Identity of the referenced item, `None` when natively null.
    pub fn address(&self) -> Option<usize> {
        self.inner.address()
    }

    /// Whether the backing reference is natively null.
    pub fn is_null(&self) -> bool {
        self.inner.is_null()
    }

    /// Name of the concrete backing type.
    pub fn backing_type_name(&self) -> &'static str {
        self.inner.backing_type_name()
    }

    /// Owning-container lookup, when the backing type has one.
    pub fn sequence(&self) -> Option<SequenceInfo> {
        self.inner.sequence()
    }

    /// Address of the first element of the owning container.
    pub fn sequence_start(&self) -> Option<usize> {
        self.sequence().map(|s| s.start)
    }

    /// Index of the referenced item within its owning container.
    pub fn index_in_sequence(&self) -> Option<isize> {
        self.sequence().map(|s| s.index)
    }

    /// Address of the referenced item, as seen by the owning container.
    pub fn item_address(&self) -> Option<usize> {
        self.sequence().map(|s| s.item)
    }

    /// Length of the owning container.
    pub fn sequence_span(&self) -> Option<usize> {
        self.sequence().map(|s| s.len)
    }

    /// Narrow to the read-only level, keeping the same backing reference.
    pub fn into_read_only(self) -> AnyConstRef<T> {
        AnyRef {
            inner: self.inner,
            _access: PhantomData,
        }
    }
}

impl<T: 'static, A> Clone for AnyRef<T, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_box(),
            _access: PhantomData,
        }
    }
}

impl<T: 'static> From<AnyRef<T, Mutable>> for AnyConstRef<T> {
    fn from(value: AnyRef<T, Mutable>) -> Self {
        value.into_read_only()
    }
}

macro_rules! erase_from {
    ($($ty:ident),*) => {$(
        impl<T: 'static, A: Access> From<$ty<T, A>> for AnyRef<T, A>
        where
            A: Grants<A>,
        {
            fn from(backing: $ty<T, A>) -> Self {
                Self::new(backing)
            }
        }
    )*};
}

erase_from!(SeqIter, VecIter, SharedRef, RegisteredRef);

impl<T: 'static, A: Access, A2: Access> PartialEq<AnyRef<T, A2>> for AnyRef<T, A> {
    fn eq(&self, other: &AnyRef<T, A2>) -> bool {
        self.inner.equals(&*other.inner)
    }
}

impl<T: 'static, A: Access> PartialEq<Null> for AnyRef<T, A> {
    fn eq(&self, _: &Null) -> bool {
        self.is_null()
    }
}

impl<T: 'static, A: Access> PartialEq<usize> for AnyRef<T, A> {
    fn eq(&self, address: &usize) -> bool {
        self.address().unwrap_or(0) == *address
    }
}

impl<T: 'static, A: Access> fmt::Debug for AnyRef<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyRef")
            .field("element", &type_name::<T>())
            .field("access", &A::NAME)
            .field("backing", &self.backing_type_name())
            .field("address", &self.address())
            .finish()
    }
}

impl<T: 'static, A: Access> Erasure for AnyRef<T, A> {
    type Target = T;

    fn try_deref(&self) -> Result<Ref<'_, T>, RefError> {
        AnyRef::try_deref(self)
    }

    fn try_deref_mut(&self) -> Result<RefMut<'_, T>, RefError> {
        AnyRef::try_deref_mut(self)
    }

    fn try_index(&self, n: isize) -> Result<Ref<'_, T>, RefError> {
        AnyRef::try_index(self, n)
    }

    fn try_index_mut(&self, n: isize) -> Result<RefMut<'_, T>, RefError> {
        AnyRef::try_index_mut(self, n)
    }

    fn advance(&mut self, n: isize) -> Result<(), RefError> {
        AnyRef::advance(self, n)
    }

    fn distance(&self, other: &Self) -> Result<isize, RefError> {
        AnyRef::distance(self, other)
    }

    fn equals(&self, other: &Self) -> bool {
        self == other
    }

    fn address(&self) -> Option<usize> {
        AnyRef::address(self)
    }

    fn is_null(&self) -> bool {
        AnyRef::is_null(self)
    }

    fn sequence(&self) -> Option<SequenceInfo> {
        AnyRef::sequence(self)
    }

    fn erased_type_name(&self) -> &'static str {
        self.backing_type_name()
    }
}
