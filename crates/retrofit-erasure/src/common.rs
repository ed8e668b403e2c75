//! The common interface every backing reference is adapted to.
//!
//! [`CommonRef`] is the object-safe operation surface the erased wrappers
//! touch. A single generic [`Adapter`] implements it for every
//! [`BackingRef`], so the set of erasable types is open: anything meeting
//! the contract can be boxed, decided per call site.
//!
//! # Cross-type comparison
//!
//! Equality and distance first try an exact concrete-type match by
//! downcasting the other operand. Failing that, the other operand is asked
//! for its read-only twin and the comparison is retried between read-only
//! twins, which lets a mutable and a read-only reference of the same
//! family meet. If neither matches, equality is `false` and distance is
//! [`RefError::IncompatibleBackingType`].

use std::any::{type_name, Any};
use std::cell::{Ref, RefMut};

use retrofit_core::{BackingRef, RefError, SequenceInfo};

/// Object-safe operation surface over one backing reference.
///
/// `T` is the element type. Implementations other than [`Adapter`] are
/// possible but not needed: the adapter covers every [`BackingRef`].
pub trait CommonRef<T: 'static>: Any + 'static {
    /// Borrow the referenced item.
    fn try_deref(&self) -> Result<Ref<'_, T>, RefError>;

    /// Mutably borrow the referenced item.
    fn try_deref_mut(&self) -> Result<RefMut<'_, T>, RefError>;

    /// Borrow the item `n` positions away.
    fn try_index(&self, n: isize) -> Result<Ref<'_, T>, RefError>;

    /// Mutably borrow the item `n` positions away.
    fn try_index_mut(&self, n: isize) -> Result<RefMut<'_, T>, RefError>;

    /// Move by `n` positions.
    fn advance(&mut self, n: isize) -> Result<(), RefError>;

    /// Signed positions from `other` to `self`.
    ///
    /// Fails with [`RefError::IncompatibleBackingType`] when the backing
    /// types cannot be reconciled.
    fn distance(&self, other: &dyn CommonRef<T>) -> Result<isize, RefError>;

    /// Whether both refer to the same item. Never fails: `false` when
    /// the backing types cannot be reconciled.
    fn equals(&self, other: &dyn CommonRef<T>) -> bool;

    /// Identity of the referenced item, `None` when natively null.
    fn address(&self) -> Option<usize>;

    /// Whether the backing reference is natively null.
    fn is_null(&self) -> bool;

    /// Owning-container lookup, when the backing type has one.
    fn sequence(&self) -> Option<SequenceInfo>;

    /// Name of the concrete backing type.
    fn backing_type_name(&self) -> &'static str;

    /// The backing reference's read-only twin, boxed for downcasting.
    fn read_only_twin(&self) -> Box<dyn Any>;

    /// Duplicate the adapter and its backing reference.
    fn clone_box(&self) -> Box<dyn CommonRef<T>>;
}

impl<T: 'static> dyn CommonRef<T> {
    /// Attempt to downcast to a concrete adapter type.
    pub fn downcast_ref<C: CommonRef<T>>(&self) -> Option<&C> {
        (self as &dyn Any).downcast_ref::<C>()
    }
}

/// Adapts one concrete [`BackingRef`] to [`CommonRef`].
pub struct Adapter<B>(pub B);

impl<B: BackingRef> CommonRef<B::Target> for Adapter<B> {
    fn try_deref(&self) -> Result<Ref<'_, B::Target>, RefError> {
        self.0.try_deref()
    }

    fn try_deref_mut(&self) -> Result<RefMut<'_, B::Target>, RefError> {
        self.0.try_deref_mut()
    }

    fn try_index(&self, n: isize) -> Result<Ref<'_, B::Target>, RefError> {
        self.0.try_index(n)
    }

    fn try_index_mut(&self, n: isize) -> Result<RefMut<'_, B::Target>, RefError> {
        self.0.try_index_mut(n)
    }

    fn advance(&mut self, n: isize) -> Result<(), RefError> {
        self.0.try_advance(n)
    }

    fn distance(&self, other: &dyn CommonRef<B::Target>) -> Result<isize, RefError> {
        if let Some(other) = other.downcast_ref::<Adapter<B>>() {
            return self.0.try_distance(&other.0);
        }
        let twin = other.read_only_twin();
        if let Some(other_twin) = twin.downcast_ref::<B::ReadOnlyTwin>() {
            return self.0.read_only().try_distance(other_twin);
        }
        Err(RefError::IncompatibleBackingType {
            left: type_name::<B>(),
            right: other.backing_type_name(),
        })
    }

    fn equals(&self, other: &dyn CommonRef<B::Target>) -> bool {
        if let Some(other) = other.downcast_ref::<Adapter<B>>() {
            return self.0.same_item(&other.0);
        }
        let twin = other.read_only_twin();
        match twin.downcast_ref::<B::ReadOnlyTwin>() {
            Some(other_twin) => self.0.read_only().same_item(other_twin),
            None => false,
        }
    }

    fn address(&self) -> Option<usize> {
        self.0.address()
    }

    fn is_null(&self) -> bool {
        self.0.is_null()
    }

    fn sequence(&self) -> Option<SequenceInfo> {
        self.0.sequence()
    }

    fn backing_type_name(&self) -> &'static str {
        type_name::<B>()
    }

    fn read_only_twin(&self) -> Box<dyn Any> {
        Box::new(self.0.read_only())
    }

    fn clone_box(&self) -> Box<dyn CommonRef<B::Target>> {
        Box::new(Adapter(self.0.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrofit_core::{Mutable, ReadOnly};
    use retrofit_refs::{Buffer, ConstSeqIter, SeqIter, SharedRef, SharedVec};

    fn boxed<B: BackingRef>(b: B) -> Box<dyn CommonRef<B::Target>> {
        Box::new(Adapter(b))
    }

    #[test]
    fn same_type_equality_is_item_identity() {
        let buf = Buffer::from_vec(vec![1u32, 2, 3]);
        let a = boxed(SeqIter::<u32>::at(buf.clone(), 1).unwrap());
        let b = boxed(SeqIter::<u32>::at(buf.clone(), 1).unwrap());
        let c = boxed(SeqIter::<u32>::at(buf, 2).unwrap());
        assert!(a.equals(&*b));
        assert!(!a.equals(&*c));
    }

    #[test]
    fn iterators_into_different_vectors_never_compare_equal() {
        for _ in 0..200 {
            let a = SharedVec::new(vec![0u64; 64]);
            let b = SharedVec::new(vec![9u64; 1]);
            let theirs = boxed(b.begin::<Mutable>());
            let theirs_ro = boxed(b.begin::<ReadOnly>());
            let mut it = a.begin::<Mutable>();
            for _ in 0..64 {
                let ours = boxed(it.clone());
                assert!(!ours.equals(&*theirs));
                assert!(!ours.equals(&*theirs_ro));
                it.try_advance(1).unwrap();
            }
        }
    }

    #[test]
    fn access_levels_meet_through_read_only_twin() {
        let buf = Buffer::from_vec(vec![1u32, 2, 3]);
        let m = boxed(SeqIter::<u32>::at(buf.clone(), 2).unwrap());
        let r = boxed(ConstSeqIter::<u32>::at(buf, 0).unwrap());
        assert_eq!(m.distance(&*r), Ok(2));
        assert_eq!(r.distance(&*m), Ok(-2));
    }

    #[test]
    fn unrelated_types_are_unequal_and_have_no_distance() {
        let buf = Buffer::from_vec(vec![1u32, 2]);
        let it = boxed(SeqIter::<u32>::new(buf.clone()));
        let sp = boxed(SharedRef::<u32>::aliasing(&buf, 0).unwrap());
        // Same address, different families.
        assert_eq!(it.address(), sp.address());
        assert!(!it.equals(&*sp));
        assert!(matches!(
            it.distance(&*sp),
            Err(RefError::IncompatibleBackingType { .. })
        ));
    }

    #[test]
    fn downcast_recovers_adapter() {
        let it = boxed(SeqIter::<u8>::new(Buffer::from_vec(vec![9])));
        let adapter = it.downcast_ref::<Adapter<SeqIter<u8>>>().unwrap();
        assert_eq!(adapter.0.position(), 0);
        assert!(it.downcast_ref::<Adapter<ConstSeqIter<u8>>>().is_none());
    }
}
