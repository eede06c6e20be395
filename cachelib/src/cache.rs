use crate::config::{CacheConfig, ReplacementPolicyConfig};
use crate::metrics::ReadStats;
use crate::replacement_policies::{FrequentRead, LeastRecentlyUsed};
use crate::trace::TraceRecord;

/// A generic trait for simulated read caches, keyed by trace offset
///
/// Technically not required as the simulator uses static dispatch through [`GenericCache`], but it
/// keeps both engines behind the same contract and lets tests drive either one
pub trait CacheTrait {
    /// Reads an offset, returning true on a cache hit, and false otherwise
    ///
    /// On both hits and misses, the implementation must update its replacement metadata
    ///
    /// # Arguments
    ///
    /// * `offset`: The offset of the read, which is the cache key
    ///
    /// returns: bool
    fn read_and_update(&mut self, offset: u64) -> bool;

    /// Whether `offset` is currently resident
    fn contains(&self, offset: u64) -> bool;

    /// The number of resident offsets
    fn resident_count(&self) -> usize;

    fn capacity(&self) -> usize;

    /// Replays every `Read` in `records`, in order, ignoring every other operation
    fn simulate(&mut self, records: &[TraceRecord]) -> ReadStats {
        let mut stats = ReadStats::default();
        for record in records.iter().filter(|r| r.operation.is_read()) {
            stats.record(self.read_and_update(record.offset));
        }
        stats
    }
}

/// Recency based cache, evicting the least recently touched offset
pub struct RecencyCache {
    policy: LeastRecentlyUsed,
}

impl RecencyCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            policy: LeastRecentlyUsed::new(capacity),
        }
    }

    /// Resident offsets from most to least recently touched
    pub fn resident(&self) -> Vec<u64> {
        self.policy.iter().collect()
    }
}

impl CacheTrait for RecencyCache {
    fn read_and_update(&mut self, offset: u64) -> bool {
        self.policy.touch(offset)
    }
    fn contains(&self, offset: u64) -> bool {
        self.policy.contains(offset)
    }
    fn resident_count(&self) -> usize {
        self.policy.len()
    }
    fn capacity(&self) -> usize {
        self.policy.capacity()
    }
}

/// Frequency based cache, replacing the least frequently read offset when a more frequently read
/// one misses
pub struct FrequencyCache {
    policy: FrequentRead,
}

impl FrequencyCache {
    pub fn new(capacity: usize, reconcile_interval: u64) -> Self {
        Self {
            policy: FrequentRead::new(capacity, reconcile_interval),
        }
    }

    /// The underlying policy, for inspecting snapshots and the eviction queue
    pub fn policy(&self) -> &FrequentRead {
        &self.policy
    }
}

impl CacheTrait for FrequencyCache {
    fn read_and_update(&mut self, offset: u64) -> bool {
        self.policy.touch(offset)
    }
    fn contains(&self, offset: u64) -> bool {
        self.policy.contains(offset)
    }
    fn resident_count(&self) -> usize {
        self.policy.len()
    }
    fn capacity(&self) -> usize {
        self.policy.capacity()
    }
}

/// Enum for both kinds of cache provided by the library
///
/// Trait objects would be opaque to the compiler, and the simulator calls into the cache once per
/// read in the trace. Branching explicitly lets it see the concrete types and inline the policies
pub enum GenericCache {
    Recency(RecencyCache),
    Frequency(FrequencyCache),
}

impl From<RecencyCache> for GenericCache {
    fn from(value: RecencyCache) -> Self {
        Self::Recency(value)
    }
}

impl From<FrequencyCache> for GenericCache {
    fn from(value: FrequencyCache) -> Self {
        Self::Frequency(value)
    }
}

impl From<&CacheConfig> for GenericCache {
    fn from(config: &CacheConfig) -> Self {
        match config.policy {
            ReplacementPolicyConfig::LeastRecentlyUsed => {
                GenericCache::from(RecencyCache::new(config.capacity))
            }
            ReplacementPolicyConfig::FrequentRead => {
                GenericCache::from(FrequencyCache::new(config.capacity, config.reconcile_interval))
            }
        }
    }
}

impl CacheTrait for GenericCache {
    fn read_and_update(&mut self, offset: u64) -> bool {
        match self {
            GenericCache::Recency(c) => c.read_and_update(offset),
            GenericCache::Frequency(c) => c.read_and_update(offset),
        }
    }

    fn contains(&self, offset: u64) -> bool {
        match self {
            GenericCache::Recency(c) => c.contains(offset),
            GenericCache::Frequency(c) => c.contains(offset),
        }
    }

    fn resident_count(&self) -> usize {
        match self {
            GenericCache::Recency(c) => c.resident_count(),
            GenericCache::Frequency(c) => c.resident_count(),
        }
    }

    fn capacity(&self) -> usize {
        match self {
            GenericCache::Recency(c) => c.capacity(),
            GenericCache::Frequency(c) => c.capacity(),
        }
    }
}
