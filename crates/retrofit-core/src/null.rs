//! The null literal.

use std::fmt;

/// The null literal, for `reference == Null` comparisons.
///
/// Nullable adapters compare equal to `Null` (and to the address `0usize`)
/// exactly when they hold no value, whether or not the backing type has a
/// null state of its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Null;

impl fmt::Display for Null {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "null")
    }
}
