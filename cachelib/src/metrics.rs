use serde::{Deserialize, Serialize};

use crate::config::LatencyConfig;

/// Read and hit counts for one engine over one run
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadStats {
    pub total_reads: u64,
    pub hits: u64,
}

impl ReadStats {
    pub fn record(&mut self, hit: bool) {
        self.total_reads += 1;
        if hit {
            self.hits += 1;
        }
    }

    pub fn misses(&self) -> u64 {
        self.total_reads - self.hits
    }

    /// Hits over total reads, taken as 0 for a run without any reads rather than NaN
    pub fn hit_ratio(&self) -> f64 {
        if self.total_reads == 0 {
            0.0
        } else {
            self.hits as f64 / self.total_reads as f64
        }
    }
}

/// Converts a hit ratio to an average latency using a fixed cost for hits and for misses
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatencyModel {
    hit_cost: f64,
    miss_cost: f64,
}

impl LatencyModel {
    pub fn new(hit_cost: f64, miss_cost: f64) -> Self {
        Self { hit_cost, miss_cost }
    }

    /// # Examples
    ///
    /// ```
    /// use cachelib::metrics::{LatencyModel, ReadStats};
    /// let model = LatencyModel::new(0.0, 300.0);
    /// let stats = ReadStats { total_reads: 4, hits: 1 };
    /// assert_eq!(model.average_latency(&stats), 225.0);
    /// ```
    pub fn average_latency(&self, stats: &ReadStats) -> f64 {
        let hit_ratio = stats.hit_ratio();
        hit_ratio * self.hit_cost + (1.0 - hit_ratio) * self.miss_cost
    }
}

impl From<&LatencyConfig> for LatencyModel {
    fn from(value: &LatencyConfig) -> Self {
        Self::new(value.hit_cost, value.miss_cost)
    }
}
