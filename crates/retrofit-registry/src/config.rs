//! Registry configuration parameters.

use crate::error::RegistryError;

/// Configuration for an [`AllocationRegistry`](crate::AllocationRegistry).
///
/// Validated at registry construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Number of records kept in the linearly scanned fast storage.
    ///
    /// Default: 8. Must be between 1 and [`MAX_FAST_CAPACITY`](Self::MAX_FAST_CAPACITY).
    /// Beyond this many live records the oldest fast entry is evicted to
    /// the address-keyed slow storage.
    pub fast_capacity: usize,
}

impl RegistryConfig {
    /// Default fast-storage capacity.
    pub const DEFAULT_FAST_CAPACITY: usize = 8;

    /// Largest accepted fast-storage capacity. Linear scans stop paying
    /// off well before this.
    pub const MAX_FAST_CAPACITY: usize = 1024;

    /// A config with default values.
    pub fn new() -> Self {
        Self {
            fast_capacity: Self::DEFAULT_FAST_CAPACITY,
        }
    }

    /// Override the fast-storage capacity.
    pub fn with_fast_capacity(mut self, fast_capacity: usize) -> Self {
        self.fast_capacity = fast_capacity;
        self
    }

    /// Check that every parameter is in range.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.fast_capacity == 0 || self.fast_capacity > Self::MAX_FAST_CAPACITY {
            return Err(RegistryError::InvalidFastCapacity {
                requested: self.fast_capacity,
                max: Self::MAX_FAST_CAPACITY,
            });
        }
        Ok(())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new()
    }
}
