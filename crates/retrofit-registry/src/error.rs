//! Registry-specific error types.

use std::error::Error;
use std::fmt;

/// Errors raised when configuring or reaching an allocation registry.
///
/// Registration itself never fails; these cover setup and the per-thread
/// binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// `fast_capacity` outside `1..=max`.
    InvalidFastCapacity {
        /// The rejected capacity.
        requested: usize,
        /// Largest accepted capacity.
        max: usize,
    },
    /// The thread's registry is already borrowed further up the stack.
    ContextBusy,
    /// The thread's registry has already been destroyed (thread exit).
    ContextUnavailable,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFastCapacity { requested, max } => {
                write!(f, "invalid fast capacity {requested}: must be between 1 and {max}")
            }
            Self::ContextBusy => write!(f, "thread allocation registry is already in use"),
            Self::ContextUnavailable => {
                write!(f, "thread allocation registry has been torn down")
            }
        }
    }
}

impl Error for RegistryError {}
