//! Error types for the Retrofit memory-safety layer.
//!
//! Organized by the kind of contract violation: null misuse, backing-type
//! mismatches, closed-set tag mismatches, buffer sizing, and bounds or
//! borrow violations raised by the backing references themselves.

use std::error::Error;
use std::fmt;

/// Errors raised by safe-reference operations.
///
/// Equality never produces one of these; ordering, distance, dereference
/// and arithmetic on invalid state do, at the call site that broke the
/// contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefError {
    /// Dereference of a nullable adapter that holds no value.
    NullDereference,
    /// Pointer arithmetic on a nullable adapter that holds no value.
    NullArithmetic,
    /// Distance or ordering between erased references whose backing
    /// types cannot be reconciled.
    IncompatibleBackingType {
        /// Backing type of the left operand.
        left: &'static str,
        /// Backing type of the right operand.
        right: &'static str,
    },
    /// A closed-set variant was accessed as the wrong alternative.
    BadVariantAccess {
        /// The alternative the caller asked for.
        expected: &'static str,
        /// The alternative actually held.
        found: &'static str,
    },
    /// A byte count is not a whole number of elements for either operand.
    SizeMismatch {
        /// The byte count passed by the caller.
        byte_count: usize,
        /// Element size of the left (destination) operand.
        left_size: usize,
        /// Element size of the right (source) operand.
        right_size: usize,
    },
    /// Storage could not be acquired.
    AllocationFailure {
        /// Number of bytes requested.
        byte_count: usize,
    },
    /// No concrete element type could be recovered from an untyped reference.
    UnsupportedConversion {
        /// Element type actually stored behind the untyped reference.
        type_name: &'static str,
    },
    /// An index or offset fell outside the backing sequence.
    OutOfBounds {
        /// The offending index.
        index: isize,
        /// Length of the backing sequence.
        len: usize,
    },
    /// Distance between iterators into different sequences.
    DifferentSequences,
    /// Mutable access through a read-only reference.
    ReadOnly,
    /// The element is already borrowed in a conflicting way.
    BorrowConflict,
    /// The target of a registered reference has been destroyed.
    Dangling,
    /// The backing type does not provide an optional capability.
    Unsupported {
        /// The operation that was attempted.
        operation: &'static str,
        /// The backing type that lacks it.
        type_name: &'static str,
    },
}

impl RefError {
    /// Shorthand for [`RefError::Unsupported`] on backing type `B`.
    pub fn unsupported<B: ?Sized>(operation: &'static str) -> Self {
        Self::Unsupported {
            operation,
            type_name: std::any::type_name::<B>(),
        }
    }
}

impl fmt::Display for RefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullDereference => write!(f, "dereference of a null reference"),
            Self::NullArithmetic => write!(f, "arithmetic on a null reference"),
            Self::IncompatibleBackingType { left, right } => {
                write!(f, "incompatible backing types: {left} and {right}")
            }
            Self::BadVariantAccess { expected, found } => {
                write!(f, "bad variant access: expected {expected}, found {found}")
            }
            Self::SizeMismatch {
                byte_count,
                left_size,
                right_size,
            } => {
                write!(
                    f,
                    "size mismatch: {byte_count} bytes is not a multiple of \
                     element size {left_size} or {right_size}"
                )
            }
            Self::AllocationFailure { byte_count } => {
                write!(f, "allocation of {byte_count} bytes failed")
            }
            Self::UnsupportedConversion { type_name } => {
                write!(f, "unsupported conversion from element type {type_name}")
            }
            Self::OutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for sequence of length {len}")
            }
            Self::DifferentSequences => {
                write!(f, "iterators refer to different sequences")
            }
            Self::ReadOnly => write!(f, "mutable access through a read-only reference"),
            Self::BorrowConflict => write!(f, "element is already borrowed"),
            Self::Dangling => write!(f, "target of registered reference was destroyed"),
            Self::Unsupported {
                operation,
                type_name,
            } => {
                write!(f, "{type_name} does not support {operation}")
            }
        }
    }
}

impl Error for RefError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_both_backing_types() {
        let err = RefError::IncompatibleBackingType {
            left: "SeqIter",
            right: "VecIter",
        };
        assert_eq!(
            err.to_string(),
            "incompatible backing types: SeqIter and VecIter"
        );
    }

    #[test]
    fn unsupported_records_type_name() {
        let err = RefError::unsupported::<u32>("advance");
        assert_eq!(
            err,
            RefError::Unsupported {
                operation: "advance",
                type_name: "u32",
            }
        );
    }

    #[test]
    fn size_mismatch_mentions_byte_count() {
        let err = RefError::SizeMismatch {
            byte_count: 7,
            left_size: 4,
            right_size: 2,
        };
        assert!(err.to_string().contains("7 bytes"));
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn out_of_bounds_display_names_index_and_len(
                index in any::<isize>(),
                len in any::<usize>(),
            ) {
                let text = RefError::OutOfBounds { index, len }.to_string();
                let index_text = format!("index {index} ");
                let len_text = format!("length {len}");
                prop_assert!(text.contains(&index_text));
                prop_assert!(text.ends_with(&len_text));
            }

            #[test]
            fn size_mismatch_display_names_every_size(
                byte_count in any::<usize>(),
                left_size in any::<usize>(),
                right_size in any::<usize>(),
            ) {
                let err = RefError::SizeMismatch { byte_count, left_size, right_size };
                let text = err.to_string();
                let prefix = format!("size mismatch: {byte_count} bytes");
                let suffix = format!("{left_size} or {right_size}");
                prop_assert!(text.starts_with(&prefix));
                prop_assert!(text.ends_with(&suffix));
            }

            #[test]
            fn allocation_failure_equality_follows_byte_count(
                a in any::<usize>(),
                b in any::<usize>(),
            ) {
                let left = RefError::AllocationFailure { byte_count: a };
                let right = RefError::AllocationFailure { byte_count: b };
                prop_assert_eq!(left == right, a == b);
                prop_assert_eq!(left.to_string() == right.to_string(), a == b);
            }
        }
    }
}
