//! Nullable adapters.
//!
//! [`Nullable`] adds an explicit absent state on top of any [`Erasure`],
//! independent of whether the wrapped backing type has a native null.

use std::cell::{Ref, RefMut};
use std::fmt;

use retrofit_core::{Null, RefError, SequenceInfo};

use crate::any::AnyRef;
use crate::erasure::Erasure;
use crate::poly::PolyRef;

/// An erased reference that may hold no value.
#[derive(Clone)]
pub struct Nullable<E> {
    value: Option<E>,
}

/// Nullable open erasure.
pub type NullableAnyRef<T> = Nullable<AnyRef<T>>;

/// Nullable closed-set erasure.
pub type NullablePolyRef<T> = Nullable<PolyRef<T>>;

impl<E: Erasure> Nullable<E> {
    /// Wrap a present value.
    pub fn new(value: E) -> Self {
        Self { value: Some(value) }
    }

    /// The absent state.
    pub fn null() -> Self {
        Self { value: None }
    }

    /// Whether a value is held.
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Borrow the held value.
    pub fn as_ref(&self) -> Option<&E> {
        self.value.as_ref()
    }

    /// Mutably borrow the held value.
    pub fn as_mut(&mut self) -> Option<&mut E> {
        self.value.as_mut()
    }

    /// Move the held value out, leaving the adapter empty.
    pub fn take(&mut self) -> Option<E> {
        self.value.take()
    }

    /// Drop the held value.
    pub fn reset(&mut self) {
        self.value = None;
    }

    /// Replace the held value.
    pub fn set(&mut self, value: E) {
        self.value = Some(value);
    }

    /// Unwrap into the held value.
    pub fn into_inner(self) -> Option<E> {
        self.value
    }

    fn present(&self) -> Result<&E, RefError> {
        self.value.as_ref().ok_or(RefError::NullDereference)
    }
}

impl<E: Erasure> Erasure for Nullable<E> {
    type Target = E::Target;

    fn try_deref(&self) -> Result<Ref<'_, Self::Target>, RefError> {
        self.present()?.try_deref()
    }

    fn try_deref_mut(&self) -> Result<RefMut<'_, Self::Target>, RefError> {
        self.present()?.try_deref_mut()
    }

    fn try_index(&self, n: isize) -> Result<Ref<'_, Self::Target>, RefError> {
        self.present()?.try_index(n)
    }

    fn try_index_mut(&self, n: isize) -> Result<RefMut<'_, Self::Target>, RefError> {
        self.present()?.try_index_mut(n)
    }

    fn advance(&mut self, n: isize) -> Result<(), RefError> {
        match &mut self.value {
            Some(value) => value.advance(n),
            None => Err(RefError::NullArithmetic),
        }
    }

    fn distance(&self, other: &Self) -> Result<isize, RefError> {
        match (&self.value, &other.value) {
            (Some(a), Some(b)) => a.distance(b),
            _ => Err(RefError::NullArithmetic),
        }
    }

    fn equals(&self, other: &Self) -> bool {
        match (&self.value, &other.value) {
            (Some(a), Some(b)) => a.equals(b),
            (None, None) => true,
            _ => false,
        }
    }

    fn address(&self) -> Option<usize> {
        self.value.as_ref().and_then(Erasure::address)
    }

    fn is_null(&self) -> bool {
        self.value.is_none()
    }

    fn sequence(&self) -> Option<SequenceInfo> {
        self.value.as_ref().and_then(Erasure::sequence)
    }

    fn erased_type_name(&self) -> &'static str {
        match &self.value {
            Some(value) => value.erased_type_name(),
            None => "null",
        }
    }
}

impl<E: Erasure> PartialEq for Nullable<E> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl<E: Erasure> PartialEq<Null> for Nullable<E> {
    fn eq(&self, _: &Null) -> bool {
        !self.has_value()
    }
}

impl<E: Erasure> PartialEq<usize> for Nullable<E> {
    /// Zero means "holds no value"; any other literal compares by address.
    fn eq(&self, address: &usize) -> bool {
        match &self.value {
            None => *address == 0,
            Some(value) => value.address() == Some(*address),
        }
    }
}

impl<E> Default for Nullable<E> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<E> From<E> for Nullable<E> {
    fn from(value: E) -> Self {
        Self { value: Some(value) }
    }
}

impl<E: Erasure> fmt::Debug for Nullable<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => f
                .debug_struct("Nullable")
                .field("erased", &value.erased_type_name())
                .field("address", &value.address())
                .finish(),
            None => f.write_str("Nullable(null)"),
        }
    }
}
