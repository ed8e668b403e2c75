//! Allocation records.
//!
//! A record owns the handle that keeps a tracked allocation alive. Releasing
//! the record drops that handle; a record that is simply discarded has the
//! same effect, so an erased record never leaks.

use std::any::{type_name, Any};
use std::fmt;

use tracing::trace;

/// One tracked allocation.
pub struct AllocationRecord {
    size: usize,
    owner: Box<dyn Any>,
    owner_type: &'static str,
}

impl AllocationRecord {
    /// A record of `size` bytes kept alive by `owner`.
    pub fn new<O: Any>(size: usize, owner: O) -> Self {
        Self {
            size,
            owner: Box::new(owner),
            owner_type: type_name::<O>(),
        }
    }

    /// Size in bytes requested when the allocation was made.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Name of the owning handle's type.
    pub fn owner_type(&self) -> &'static str {
        self.owner_type
    }

    /// Borrow the owning handle, if it is an `O`.
    pub fn owner<O: Any>(&self) -> Option<&O> {
        self.owner.downcast_ref::<O>()
    }

    /// Take the owning handle back out, if it is an `O`.
    pub fn into_owner<O: Any>(self) -> Result<O, Self> {
        let Self {
            size,
            owner,
            owner_type,
        } = self;
        match owner.downcast::<O>() {
            Ok(owner) => Ok(*owner),
            Err(owner) => Err(Self {
                size,
                owner,
                owner_type,
            }),
        }
    }

    /// Drop the owning handle, releasing whatever it keeps alive.
    pub fn release(self) {
        trace!(size = self.size, owner = self.owner_type, "releasing allocation");
        drop(self.owner);
    }

    /// Snapshot of the record's metadata.
    pub fn info(&self) -> AllocationInfo {
        AllocationInfo {
            size: self.size,
            owner_type: self.owner_type,
        }
    }
}

impl fmt::Debug for AllocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocationRecord")
            .field("size", &self.size)
            .field("owner", &self.owner_type)
            .finish()
    }
}

/// Metadata of a tracked allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocationInfo {
    /// Size in bytes requested when the allocation was made.
    pub size: usize,
    /// Name of the owning handle's type.
    pub owner_type: &'static str,
}
