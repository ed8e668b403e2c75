//! Mutable and read-only capability markers.
//!
//! Every reference type in Retrofit comes in two capability levels of the
//! same logical type, distinguished by a zero-sized marker parameter. The
//! read-only level is the "const" twin of the mutable level: both point at
//! the same storage the same way, only the permitted access differs.

use std::fmt;

/// A capability level: [`Mutable`] or [`ReadOnly`].
pub trait Access: Copy + Default + fmt::Debug + Eq + 'static {
    /// Whether references at this level may hand out mutable borrows.
    const WRITABLE: bool;

    /// Short name used in diagnostics.
    const NAME: &'static str;
}

/// Read-write capability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Mutable;

/// Read-only capability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ReadOnly;

impl Access for Mutable {
    const WRITABLE: bool = true;
    const NAME: &'static str = "mut";
}

impl Access for ReadOnly {
    const WRITABLE: bool = false;
    const NAME: &'static str = "const";
}

/// `Self` may be narrowed to capability `A`.
///
/// A mutable reference can be erased into a read-only box, never the
/// reverse.
pub trait Grants<A: Access>: Access {}

impl Grants<Mutable> for Mutable {}
impl Grants<ReadOnly> for Mutable {}
impl Grants<ReadOnly> for ReadOnly {}

#[cfg(test)]
mod tests {
    use super::*;

    fn grants<From: Grants<To>, To: Access>() -> bool {
        From::WRITABLE || !To::WRITABLE
    }

    #[test]
    fn writable_flags() {
        assert!(Mutable::WRITABLE);
        assert!(!ReadOnly::WRITABLE);
    }

    #[test]
    fn narrowing_never_widens() {
        assert!(grants::<Mutable, Mutable>());
        assert!(grants::<Mutable, ReadOnly>());
        assert!(grants::<ReadOnly, ReadOnly>());
    }
}
