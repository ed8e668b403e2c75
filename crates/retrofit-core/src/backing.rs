//! The capability contract every concrete backing reference implements.
//!
//! A [`BackingRef`] is the concrete pointer, iterator or array adapter an
//! erased wrapper holds beneath its uniform interface. Only dereference,
//! address identity and the read-only twin are required; random access,
//! native nullability and the owning-container lookup are optional and
//! default to "unsupported" or "unavailable".

use std::cell::{Ref, RefMut};

use crate::access::{Access, ReadOnly};
use crate::error::RefError;

/// Position of a reference within its owning container.
///
/// Only available when the backing type can name the container it points
/// into. Addresses are identity values, not dereferenceable pointers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceInfo {
    /// Address of the first element of the container.
    pub start: usize,
    /// Index of the referenced item within the container.
    pub index: isize,
    /// Address of the referenced item.
    pub item: usize,
    /// Number of elements in the container.
    pub len: usize,
}

/// A concrete reference-like value that can sit behind an erased wrapper.
///
/// # Capability levels
///
/// `Access` is the capability level of this type. `ReadOnlyTwin` is the
/// read-only level of the same logical type (for a read-only type, usually
/// `Self`). Erased comparison falls back to comparing read-only twins when
/// the two operands are different capability levels of one family.
///
/// # Optional capabilities
///
/// The `try_*` methods other than [`try_deref`](Self::try_deref) default
/// to [`RefError::Unsupported`]. Random-access types override
/// `try_index`, `try_advance` and `try_distance`.
pub trait BackingRef: Clone + 'static {
    /// Element type.
    type Target: 'static;

    /// Capability level of this reference.
    type Access: Access;

    /// The read-only capability level of the same logical reference type.
    type ReadOnlyTwin: BackingRef<Target = Self::Target, Access = ReadOnly>;

    /// Narrow to the read-only twin, pointing at the same item.
    fn read_only(&self) -> Self::ReadOnlyTwin;

    /// Borrow the referenced item.
    fn try_deref(&self) -> Result<Ref<'_, Self::Target>, RefError>;

    /// Mutably borrow the referenced item.
    fn try_deref_mut(&self) -> Result<RefMut<'_, Self::Target>, RefError> {
        Err(RefError::ReadOnly)
    }

    /// Identity of the referenced item, `None` when natively null.
    fn address(&self) -> Option<usize>;

    /// Whether `self` and `other` refer to the same item.
    ///
    /// Defaults to address equality. Types whose addresses are only
    /// meaningful within one container compare container identity too.
    fn same_item(&self, other: &Self) -> bool {
        self.address() == other.address()
    }

    /// Whether the reference is natively null.
    fn is_null(&self) -> bool {
        self.address().is_none()
    }

    /// Borrow the item `n` positions away.
    fn try_index(&self, n: isize) -> Result<Ref<'_, Self::Target>, RefError> {
        let _ = n;
        Err(RefError::unsupported::<Self>("index"))
    }

    /// Mutably borrow the item `n` positions away.
    fn try_index_mut(&self, n: isize) -> Result<RefMut<'_, Self::Target>, RefError> {
        let _ = n;
        Err(RefError::unsupported::<Self>("index"))
    }

    /// Move the reference by `n` positions.
    fn try_advance(&mut self, n: isize) -> Result<(), RefError> {
        let _ = n;
        Err(RefError::unsupported::<Self>("advance"))
    }

    /// Signed number of positions from `other` to `self`.
    fn try_distance(&self, other: &Self) -> Result<isize, RefError> {
        let _ = other;
        Err(RefError::unsupported::<Self>("distance"))
    }

    /// Owning-container lookup for debug introspection.
    fn sequence(&self) -> Option<SequenceInfo> {
        None
    }
}
