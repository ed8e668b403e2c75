//! Closed-set type erasure: [`PolyRef`].
//!
//! A `PolyRef` holds one of a fixed list of backing kinds in place, with
//! no per-value heap allocation. The enum discriminant is the type tag;
//! [`PolyRef::Empty`] is the "invalid" tag. Admitting a new kind means
//! extending the enum.
//!
//! Switching kinds is always destroy-then-construct: the held value is
//! dropped before the new one is stored, so alternatives with
//! registration side effects (such as [`RegisteredRef`]) unregister before
//! the replacement registers.

use std::cell::{Ref, RefMut};
use std::cmp::Ordering;
use std::fmt;

use retrofit_core::{Access, BackingRef, Mutable, Null, ReadOnly, RefError, SequenceInfo};
use retrofit_refs::{RegisteredRef, SeqIter, SharedRef, VecIter};

use crate::erasure::Erasure;

/// Discriminant of a [`PolyRef`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PolyTag {
    /// Holding nothing.
    Empty,
    /// A [`SeqIter`].
    Seq,
    /// A [`VecIter`].
    Vec,
    /// A [`SharedRef`].
    Shared,
    /// A [`RegisteredRef`].
    Registered,
}

impl PolyTag {
    /// Short name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Seq => "seq_iter",
            Self::Vec => "vec_iter",
            Self::Shared => "shared_ref",
            Self::Registered => "registered_ref",
        }
    }
}

impl fmt::Display for PolyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A closed-set erased reference to `T` at capability level `A`.
pub enum PolyRef<T: 'static, A = Mutable> {
    /// Holding nothing.
    Empty,
    /// Iterator into a fixed buffer.
    Seq(SeqIter<T, A>),
    /// Iterator into a growable vector.
    Vec(VecIter<T, A>),
    /// Reference-counted single-element pointer.
    Shared(SharedRef<T, A>),
    /// Registered pointer.
    Registered(RegisteredRef<T, A>),
}

/// Read-only [`PolyRef`].
pub type PolyConstRef<T> = PolyRef<T, ReadOnly>;

/// A backing kind admitted by [`PolyRef`].
pub trait PolyKind<T: 'static, A: Access>: BackingRef<Target = T, Access = A> {
    /// The tag this kind is stored under.
    const TAG: PolyTag;

    /// Wrap as a `PolyRef`.
    fn into_poly(self) -> PolyRef<T, A>;

    /// Borrow out of `poly` if it holds this kind.
    fn peek(poly: &PolyRef<T, A>) -> Option<&Self>;

    /// Mutably borrow out of `poly` if it holds this kind.
    fn peek_mut(poly: &mut PolyRef<T, A>) -> Option<&mut Self>;
}

macro_rules! poly_kind {
    ($ty:ident, $variant:ident) => {
        impl<T: 'static, A: Access> PolyKind<T, A> for $ty<T, A> {
            const TAG: PolyTag = PolyTag::$variant;

            fn into_poly(self) -> PolyRef<T, A> {
                PolyRef::$variant(self)
            }

            fn peek(poly: &PolyRef<T, A>) -> Option<&Self> {
                match poly {
                    PolyRef::$variant(r) => Some(r),
                    _ => None,
                }
            }

            fn peek_mut(poly: &mut PolyRef<T, A>) -> Option<&mut Self> {
                match poly {
                    PolyRef::$variant(r) => Some(r),
                    _ => None,
                }
            }
        }

        impl<T: 'static, A: Access> From<$ty<T, A>> for PolyRef<T, A> {
            fn from(value: $ty<T, A>) -> Self {
                PolyRef::$variant(value)
            }
        }
    };
}

poly_kind!(SeqIter, Seq);
poly_kind!(VecIter, Vec);
poly_kind!(SharedRef, Shared);
poly_kind!(RegisteredRef, Registered);

/// Apply `$body` to whichever alternative is live, or `$empty` if none.
macro_rules! dispatch {
    ($poly:expr, $r:ident => $body:expr, empty => $empty:expr) => {
        match $poly {
            PolyRef::Empty => $empty,
            PolyRef::Seq($r) => $body,
            PolyRef::Vec($r) => $body,
            PolyRef::Shared($r) => $body,
            PolyRef::Registered($r) => $body,
        }
    };
}

impl<T: 'static, A: Access> PolyRef<T, A> {
    /// Wrap `value`.
    pub fn new<K: PolyKind<T, A>>(value: K) -> Self {
        value.into_poly()
    }

    /// The live tag.
    pub fn tag(&self) -> PolyTag {
        match self {
            Self::Empty => PolyTag::Empty,
            Self::Seq(_) => PolyTag::Seq,
            Self::Vec(_) => PolyTag::Vec,
            Self::Shared(_) => PolyTag::Shared,
            Self::Registered(_) => PolyTag::Registered,
        }
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Destroy the held value, leaving the `Empty` tag.
    pub fn clear(&mut self) {
        *self = Self::Empty;
    }

    /// Destroy the held value, then store `value`.
    pub fn set<K: PolyKind<T, A>>(&mut self, value: K) {
        self.clear();
        *self = value.into_poly();
    }

    /// Destroy the held value, then construct a replacement with `make`.
    ///
    /// `make` runs after the old value is gone, so it observes no trace of
    /// it (for example, no lingering registration).
    pub fn set_with<K: PolyKind<T, A>>(&mut self, make: impl FnOnce() -> K) {
        self.clear();
        *self = make().into_poly();
    }

    /// Borrow the held value as kind `K`.
    pub fn get<K: PolyKind<T, A>>(&self) -> Result<&K, RefError> {
        let found = self.tag();
        K::peek(self).ok_or(RefError::BadVariantAccess {
            expected: K::TAG.name(),
            found: found.name(),
        })
    }

    /// Mutably borrow the held value as kind `K`.
    pub fn get_mut<K: PolyKind<T, A>>(&mut self) -> Result<&mut K, RefError> {
        let found = self.tag();
        K::peek_mut(self).ok_or(RefError::BadVariantAccess {
            expected: K::TAG.name(),
            found: found.name(),
        })
    }

    /// Borrow the referenced item.
    pub fn try_deref(&self) -> Result<Ref<'_, T>, RefError> {
        dispatch!(self, r => r.try_deref(), empty => Err(RefError::NullDereference))
    }

    /// Mutably borrow the referenced item.
    pub fn try_deref_mut(&self) -> Result<RefMut<'_, T>, RefError> {
        dispatch!(self, r => r.try_deref_mut(), empty => Err(RefError::NullDereference))
    }

    /// Borrow the item `n` positions away.
    pub fn try_index(&self, n: isize) -> Result<Ref<'_, T>, RefError> {
        dispatch!(self, r => r.try_index(n), empty => Err(RefError::NullDereference))
    }

    /// Mutably borrow the item `n` positions away.
    pub fn try_index_mut(&self, n: isize) -> Result<RefMut<'_, T>, RefError> {
        dispatch!(self, r => r.try_index_mut(n), empty => Err(RefError::NullDereference))
    }

    /// Move by `n` positions.
    pub fn advance(&mut self, n: isize) -> Result<(), RefError> {
        dispatch!(self, r => r.try_advance(n), empty => Err(RefError::NullArithmetic))
    }

    /// A copy moved by `n` positions.
    pub fn offset(&self, n: isize) -> Result<Self, RefError> {
        let mut moved = self.clone();
        moved.advance(n)?;
        Ok(moved)
    }

    /// Identity of the referenced item, `None` when empty or natively null.
    pub fn address(&self) -> Option<usize> {
        dispatch!(self, r => r.address(), empty => None)
    }

    /// Owning-container lookup, when the live kind has one.
    pub fn sequence(&self) -> Option<SequenceInfo> {
        dispatch!(self, r => r.sequence(), empty => None)
    }

    /// The same alternative at the read-only level.
    pub fn read_only(&self) -> PolyConstRef<T> {
        dispatch!(self, r => r.read_only().into_poly(), empty => PolyRef::Empty)
    }

    /// Signed positions from `other` to `self`.
    ///
    /// Only defined between two references of the same kind.
    pub fn distance<A2: Access>(&self, other: &PolyRef<T, A2>) -> Result<isize, RefError> {
        match (self.read_only(), other.read_only()) {
            (PolyRef::Empty, _) | (_, PolyRef::Empty) => Err(RefError::NullArithmetic),
            (PolyRef::Seq(a), PolyRef::Seq(b)) => a.try_distance(&b),
            (PolyRef::Vec(a), PolyRef::Vec(b)) => a.try_distance(&b),
            (PolyRef::Shared(a), PolyRef::Shared(b)) => a.try_distance(&b),
            (PolyRef::Registered(a), PolyRef::Registered(b)) => a.try_distance(&b),
            (a, b) => Err(RefError::IncompatibleBackingType {
                left: a.tag().name(),
                right: b.tag().name(),
            }),
        }
    }

    /// Order by position; fails where [`distance`](Self::distance) fails.
    pub fn try_cmp<A2: Access>(&self, other: &PolyRef<T, A2>) -> Result<Ordering, RefError> {
        Ok(self.distance(other)?.cmp(&0))
    }
}

impl<T: 'static, A> Clone for PolyRef<T, A> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Seq(r) => Self::Seq(r.clone()),
            Self::Vec(r) => Self::Vec(r.clone()),
            Self::Shared(r) => Self::Shared(r.clone()),
            Self::Registered(r) => Self::Registered(r.clone()),
        }
    }
}

impl<T: 'static, A> Default for PolyRef<T, A> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T: 'static, A: Access, A2: Access> PartialEq<PolyRef<T, A2>> for PolyRef<T, A> {
    /// Equal when both are empty, or both hold the same kind referring to
    /// the same item. Different kinds are never equal.
    fn eq(&self, other: &PolyRef<T, A2>) -> bool {
        match (self.read_only(), other.read_only()) {
            (PolyRef::Empty, PolyRef::Empty) => true,
            (PolyRef::Seq(a), PolyRef::Seq(b)) => a.same_item(&b),
            (PolyRef::Vec(a), PolyRef::Vec(b)) => a.same_item(&b),
            (PolyRef::Shared(a), PolyRef::Shared(b)) => a.same_item(&b),
            (PolyRef::Registered(a), PolyRef::Registered(b)) => a.same_item(&b),
            _ => false,
        }
    }
}

impl<T: 'static, A: Access> PartialEq<Null> for PolyRef<T, A> {
    fn eq(&self, _: &Null) -> bool {
        self.address().is_none()
    }
}

impl<T: 'static, A: Access> fmt::Debug for PolyRef<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolyRef")
            .field("tag", &self.tag())
            .field("access", &A::NAME)
            .field("address", &self.address())
            .finish()
    }
}

impl<T: 'static, A: Access> Erasure for PolyRef<T, A> {
    type Target = T;

    fn try_deref(&self) -> Result<Ref<'_, T>, RefError> {
        PolyRef::try_deref(self)
    }

    fn try_deref_mut(&self) -> Result<RefMut<'_, T>, RefError> {
        PolyRef::try_deref_mut(self)
    }

    fn try_index(&self, n: isize) -> Result<Ref<'_, T>, RefError> {
        PolyRef::try_index(self, n)
    }

    fn try_index_mut(&self, n: isize) -> Result<RefMut<'_, T>, RefError> {
        PolyRef::try_index_mut(self, n)
    }

    fn advance(&mut self, n: isize) -> Result<(), RefError> {
        PolyRef::advance(self, n)
    }

    fn distance(&self, other: &Self) -> Result<isize, RefError> {
        PolyRef::distance(self, other)
    }

    fn equals(&self, other: &Self) -> bool {
        self == other
    }

    fn address(&self) -> Option<usize> {
        PolyRef::address(self)
    }

    fn sequence(&self) -> Option<SequenceInfo> {
        PolyRef::sequence(self)
    }

    fn erased_type_name(&self) -> &'static str {
        self.tag().name()
    }
}
