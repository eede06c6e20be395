use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Roughly a 1GB cache, assuming each cached unit fits into 1KB
pub const DEFAULT_CAPACITY: usize = 1024 * 1024;

/// Number of reads between two reconciliation passes of the frequency cache
pub const DEFAULT_RECONCILE_INTERVAL: u64 = 1000;

/// DRAM hit, in microseconds
pub const DEFAULT_HIT_COST: f64 = 0.0;

/// SSD read, in microseconds
pub const DEFAULT_MISS_COST: f64 = 300.0;

/// A simulation configuration with any number of independently simulated caches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "SimulationConfig::default_caches")]
    pub caches: Vec<CacheConfig>,
    #[serde(default)]
    pub latency: LatencyConfig,
}

/// A configuration for a single cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub name: String,
    pub policy: ReplacementPolicyConfig,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Only used by the frequent read policy
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval: u64,
}

/// The replacement policy - lru or lfu
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplacementPolicyConfig {
    #[serde(alias = "lru")]
    LeastRecentlyUsed,
    #[serde(alias = "lfu", alias = "frequent")]
    FrequentRead,
}

/// Calibration constants for the latency model, in whatever unit the report should use
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyConfig {
    #[serde(default = "default_hit_cost")]
    pub hit_cost: f64,
    #[serde(default = "default_miss_cost")]
    pub miss_cost: f64,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_reconcile_interval() -> u64 {
    DEFAULT_RECONCILE_INTERVAL
}

fn default_hit_cost() -> f64 {
    DEFAULT_HIT_COST
}

fn default_miss_cost() -> f64 {
    DEFAULT_MISS_COST
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            hit_cost: DEFAULT_HIT_COST,
            miss_cost: DEFAULT_MISS_COST,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            caches: Self::default_caches(),
            latency: LatencyConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// The LRU cache and the frequent read cache, side by side at the default capacity
    pub fn default_caches() -> Vec<CacheConfig> {
        vec![
            CacheConfig {
                name: "LRU Cache".to_string(),
                policy: ReplacementPolicyConfig::LeastRecentlyUsed,
                capacity: DEFAULT_CAPACITY,
                reconcile_interval: DEFAULT_RECONCILE_INTERVAL,
            },
            CacheConfig {
                name: "Frequent Read Cache".to_string(),
                policy: ReplacementPolicyConfig::FrequentRead,
                capacity: DEFAULT_CAPACITY,
                reconcile_interval: DEFAULT_RECONCILE_INTERVAL,
            },
        ]
    }

    /// Reads and validates a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SimError::io(path, e))?;
        let config: Self = serde_json::from_reader(BufReader::new(file)).map_err(SimError::Config)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations which would make the simulation meaningless, or make the latency
    /// model produce non-finite numbers
    pub fn validate(&self) -> Result<(), SimError> {
        if self.caches.is_empty() {
            return Err(SimError::InvalidConfig("at least one cache must be configured".to_string()));
        }
        for cache in &self.caches {
            if cache.policy == ReplacementPolicyConfig::FrequentRead && cache.reconcile_interval == 0 {
                return Err(SimError::InvalidConfig(format!(
                    "cache '{}' has a reconcile interval of 0",
                    cache.name
                )));
            }
        }
        for (label, cost) in [("hit_cost", self.latency.hit_cost), ("miss_cost", self.latency.miss_cost)] {
            if !cost.is_finite() || cost < 0.0 {
                return Err(SimError::InvalidConfig(format!("{label} must be a finite, non-negative number, got {cost}")));
            }
        }
        Ok(())
    }

    /// Overrides the capacity of every configured cache
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.caches.iter_mut().for_each(|c| c.capacity = capacity);
        self
    }

    /// Overrides the reconcile interval of every configured cache
    pub fn with_reconcile_interval(mut self, interval: u64) -> Self {
        self.caches.iter_mut().for_each(|c| c.reconcile_interval = interval);
        self
    }
}
