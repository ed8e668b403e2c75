//! The operation surface shared by every erased reference.
//!
//! [`AnyRef`](crate::AnyRef), [`PolyRef`](crate::PolyRef) and
//! [`Nullable`](crate::Nullable) all implement [`Erasure`], which is what
//! the nullable adapter wraps and what the generic buffer functions
//! operate on.

use std::cell::{Ref, RefMut};

use retrofit_core::{RefError, SequenceInfo};

/// A type-erased reference to elements of type [`Target`](Self::Target).
pub trait Erasure: Clone {
    /// Element type.
    type Target: 'static;

    /// Borrow the referenced item.
    fn try_deref(&self) -> Result<Ref<'_, Self::Target>, RefError>;

    /// Mutably borrow the referenced item.
    fn try_deref_mut(&self) -> Result<RefMut<'_, Self::Target>, RefError>;

    /// Borrow the item `n` positions away.
    fn try_index(&self, n: isize) -> Result<Ref<'_, Self::Target>, RefError>;

    /// Mutably borrow the item `n` positions away.
    fn try_index_mut(&self, n: isize) -> Result<RefMut<'_, Self::Target>, RefError>;

    /// Move by `n` positions.
    fn advance(&mut self, n: isize) -> Result<(), RefError>;

    /// Signed positions from `other` to `self`.
    fn distance(&self, other: &Self) -> Result<isize, RefError>;

    /// Whether both refer to the same item. Never fails.
    fn equals(&self, other: &Self) -> bool;

    /// Identity of the referenced item, `None` when null.
    fn address(&self) -> Option<usize>;

    /// Whether the reference is null.
    fn is_null(&self) -> bool {
        self.address().is_none()
    }

    /// Owning-container lookup, when available.
    fn sequence(&self) -> Option<SequenceInfo>;

    /// Name of the concrete type beneath the erasure.
    fn erased_type_name(&self) -> &'static str;

    /// Element `n` positions away, cloned out.
    fn read_at(&self, n: isize) -> Result<Self::Target, RefError>
    where
        Self::Target: Clone,
    {
        Ok(self.try_index(n)?.clone())
    }

    /// Overwrite the element `n` positions away.
    fn write_at(&self, n: isize, value: Self::Target) -> Result<(), RefError> {
        *self.try_index_mut(n)? = value;
        Ok(())
    }
}
