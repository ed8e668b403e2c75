//! Registered pointers: references that know when their target is gone.
//!
//! A [`Registered`] target counts the [`RegisteredRef`]s pointing at it.
//! Every clone of a reference registers itself and every drop unregisters,
//! so the count is exact. When the target is dropped, all outstanding
//! references become natively null and dereference fails with
//! [`RefError::Dangling`].

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use retrofit_core::{Access, BackingRef, Mutable, ReadOnly, RefError};

struct Slot<T> {
    value: RefCell<T>,
    alive: Cell<bool>,
    referrers: Cell<usize>,
}

/// An object that registered references may point at.
pub struct Registered<T: 'static> {
    slot: Rc<Slot<T>>,
}

impl<T: 'static> Registered<T> {
    /// Wrap `value` as a registration target.
    pub fn new(value: T) -> Self {
        Self {
            slot: Rc::new(Slot {
                value: RefCell::new(value),
                alive: Cell::new(true),
                referrers: Cell::new(0),
            }),
        }
    }

    /// Create a reference to this target.
    pub fn make_ref<A: Access>(&self) -> RegisteredRef<T, A> {
        RegisteredRef::register(Rc::clone(&self.slot))
    }

    /// Number of references currently registered with this target.
    pub fn referrer_count(&self) -> usize {
        self.slot.referrers.get()
    }

    /// Borrow the target value directly.
    pub fn borrow(&self) -> Result<Ref<'_, T>, RefError> {
        self.slot
            .value
            .try_borrow()
            .map_err(|_| RefError::BorrowConflict)
    }
}

impl<T: 'static> Drop for Registered<T> {
    fn drop(&mut self) {
        self.slot.alive.set(false);
    }
}

/// A reference to a [`Registered`] target.
///
/// Natively nullable: [`RegisteredRef::null`] and references whose target
/// has been destroyed report `is_null()`.
pub struct RegisteredRef<T: 'static, A = Mutable> {
    slot: Option<Rc<Slot<T>>>,
    _access: PhantomData<A>,
}

/// Read-only [`RegisteredRef`].
pub type ConstRegisteredRef<T> = RegisteredRef<T, ReadOnly>;

impl<T: 'static, A> RegisteredRef<T, A> {
    fn register(slot: Rc<Slot<T>>) -> Self {
        slot.referrers.set(slot.referrers.get() + 1);
        Self {
            slot: Some(slot),
            _access: PhantomData,
        }
    }

    /// A reference to nothing.
    pub fn null() -> Self {
        Self {
            slot: None,
            _access: PhantomData,
        }
    }

    fn live_slot(&self) -> Result<&Slot<T>, RefError> {
        let slot = self.slot.as_deref().ok_or(RefError::NullDereference)?;
        if !slot.alive.get() {
            return Err(RefError::Dangling);
        }
        Ok(slot)
    }
}

impl<T: 'static, A> Clone for RegisteredRef<T, A> {
    fn clone(&self) -> Self {
        match &self.slot {
            Some(slot) => Self::register(Rc::clone(slot)),
            None => Self::null(),
        }
    }
}

impl<T: 'static, A> Drop for RegisteredRef<T, A> {
    fn drop(&mut self) {
        if let Some(slot) = &self.slot {
            slot.referrers.set(slot.referrers.get().saturating_sub(1));
        }
    }
}

impl<T: 'static, A: Access> BackingRef for RegisteredRef<T, A> {
    type Target = T;
    type Access = A;
    type ReadOnlyTwin = RegisteredRef<T, ReadOnly>;

    fn read_only(&self) -> RegisteredRef<T, ReadOnly> {
        match &self.slot {
            Some(slot) => RegisteredRef::register(Rc::clone(slot)),
            None => RegisteredRef::null(),
        }
    }

    fn try_deref(&self) -> Result<Ref<'_, T>, RefError> {
        self.live_slot()?
            .value
            .try_borrow()
            .map_err(|_| RefError::BorrowConflict)
    }

    fn try_deref_mut(&self) -> Result<RefMut<'_, T>, RefError> {
        if !A::WRITABLE {
            return Err(RefError::ReadOnly);
        }
        self.live_slot()?
            .value
            .try_borrow_mut()
            .map_err(|_| RefError::BorrowConflict)
    }

    fn address(&self) -> Option<usize> {
        self.slot
            .as_ref()
            .filter(|slot| slot.alive.get())
            .map(|slot| Rc::as_ptr(slot) as usize)
    }
}

impl<T: 'static, A: Access> fmt::Debug for RegisteredRef<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredRef")
            .field("access", &A::NAME)
            .field("null", &self.is_null())
            .finish()
    }
}
