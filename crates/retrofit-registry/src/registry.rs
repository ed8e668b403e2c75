//! The two-tier allocation registry.
//!
//! Up to `fast_capacity` of the most recently registered records live in a
//! flat array that is scanned linearly. Registering into a full array
//! first evicts its oldest entry into an address-keyed map, which then
//! serves every lookup for that address. An address is held by at most
//! one tier at a time.
//!
//! A registry is owned by one execution context and is not `Send`:
//! records hold single-threaded owner handles.

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::record::{AllocationInfo, AllocationRecord};

/// Which storage tier holds an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageTier {
    /// The linearly scanned array of recent records.
    Fast,
    /// The address-keyed overflow map.
    Slow,
}

/// Tracks live allocations by address.
pub struct AllocationRegistry {
    config: RegistryConfig,
    /// Oldest first.
    fast: SmallVec<[(usize, AllocationRecord); RegistryConfig::DEFAULT_FAST_CAPACITY]>,
    slow: IndexMap<usize, AllocationRecord>,
}

impl AllocationRegistry {
    /// Create an empty registry, validating `config`.
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        config.validate()?;
        Ok(Self {
            fast: SmallVec::with_capacity(config.fast_capacity),
            slow: IndexMap::new(),
            config,
        })
    }

    /// Create an empty registry with the default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: RegistryConfig::default(),
            fast: SmallVec::new(),
            slow: IndexMap::new(),
        }
    }

    /// The configuration this registry was built with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Track `record` at `address`.
    ///
    /// Registering an address that is already tracked replaces its record
    /// in place (the old record is released). The null address is never
    /// tracked; registering it is a no-op that reports success.
    pub fn register(&mut self, address: usize, record: AllocationRecord) -> bool {
        if address == 0 {
            return true;
        }
        if let Some(slot) = self.fast.iter_mut().rev().find(|(a, _)| *a == address) {
            trace!(address, size = record.size(), "replacing fast record");
            std::mem::replace(&mut slot.1, record).release();
            return true;
        }
        if let Some(slot) = self.slow.get_mut(&address) {
            trace!(address, size = record.size(), "replacing slow record");
            std::mem::replace(slot, record).release();
            return true;
        }
        if self.fast.len() >= self.config.fast_capacity {
            self.evict_oldest();
        }
        trace!(address, size = record.size(), fast_len = self.fast.len(), "registering");
        self.fast.push((address, record));
        true
    }

    /// Convenience for [`register`](Self::register) with a fresh record.
    pub fn track<O: std::any::Any>(&mut self, address: usize, size: usize, owner: O) -> bool {
        self.register(address, AllocationRecord::new(size, owner))
    }

    fn evict_oldest(&mut self) {
        if self.fast.is_empty() {
            return;
        }
        let (address, record) = self.fast.remove(0);
        debug!(
            address,
            size = record.size(),
            slow_len = self.slow.len() + 1,
            "evicting oldest fast record to slow storage"
        );
        self.slow.insert(address, record);
    }

    /// Stop tracking `address` and hand back its record without releasing it.
    ///
    /// Fast storage is scanned most-recent-first before the map is checked.
    pub fn take(&mut self, address: usize) -> Option<AllocationRecord> {
        if address == 0 {
            return None;
        }
        if let Some(pos) = self.fast.iter().rposition(|(a, _)| *a == address) {
            let (_, record) = self.fast.remove(pos);
            trace!(address, size = record.size(), tier = "fast", "unregistering");
            return Some(record);
        }
        let record = self.slow.swap_remove(&address)?;
        trace!(address, size = record.size(), tier = "slow", "unregistering");
        Some(record)
    }

    /// Stop tracking `address` and release its record.
    ///
    /// Returns whether the address was tracked. The null address always
    /// reports success.
    pub fn unregister(&mut self, address: usize) -> bool {
        if address == 0 {
            return true;
        }
        match self.take(address) {
            Some(record) => {
                record.release();
                true
            }
            None => false,
        }
    }

    /// Borrow the record tracked at `address`.
    pub fn get(&self, address: usize) -> Option<&AllocationRecord> {
        if address == 0 {
            return None;
        }
        self.fast
            .iter()
            .rev()
            .find(|(a, _)| *a == address)
            .map(|(_, r)| r)
            .or_else(|| self.slow.get(&address))
    }

    /// Metadata of the allocation tracked at `address`.
    pub fn info(&self, address: usize) -> Option<AllocationInfo> {
        self.get(address).map(AllocationRecord::info)
    }

    /// Whether `address` is tracked.
    pub fn contains(&self, address: usize) -> bool {
        self.get(address).is_some()
    }

    /// Which tier holds `address`.
    pub fn tier(&self, address: usize) -> Option<StorageTier> {
        if address == 0 {
            return None;
        }
        if self.fast.iter().any(|(a, _)| *a == address) {
            Some(StorageTier::Fast)
        } else if self.slow.contains_key(&address) {
            Some(StorageTier::Slow)
        } else {
            None
        }
    }

    /// Tracked addresses, fast tier oldest first, then the slow tier.
    pub fn addresses(&self) -> impl Iterator<Item = usize> + '_ {
        self.fast
            .iter()
            .map(|(a, _)| *a)
            .chain(self.slow.keys().copied())
    }

    /// Number of tracked allocations.
    pub fn len(&self) -> usize {
        self.fast.len() + self.slow.len()
    }

    /// Number of allocations in fast storage.
    pub fn fast_len(&self) -> usize {
        self.fast.len()
    }

    /// Number of allocations in slow storage.
    pub fn slow_len(&self) -> usize {
        self.slow.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.fast.is_empty() && self.slow.is_empty()
    }

    /// Release every record. Returns how many there were.
    pub fn clear(&mut self) -> usize {
        let released = self.len();
        if released > 0 {
            debug!(
                fast_len = self.fast.len(),
                slow_len = self.slow.len(),
                "tearing down allocation registry"
            );
        }
        for (_, record) in self.fast.drain(..) {
            record.release();
        }
        for (_, record) in self.slow.drain(..) {
            record.release();
        }
        released
    }
}

impl Default for AllocationRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Drop for AllocationRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for AllocationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllocationRegistry")
            .field("fast_capacity", &self.config.fast_capacity)
            .field("fast_len", &self.fast.len())
            .field("slow_len", &self.slow.len())
            .finish()
    }
}
