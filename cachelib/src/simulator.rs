use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{CacheTrait, GenericCache};
use crate::config::{ReplacementPolicyConfig, SimulationConfig};
use crate::metrics::{LatencyModel, ReadStats};
use crate::trace::TraceRecord;

/// The simulator replays a trace against every configured cache and collects the results.
///
/// It supports calling simulate multiple times, which continues the same run as if the record
/// slices were concatenated, and updates the time taken to simulate and the results accordingly.
/// Constructing a new simulator starts from empty caches
pub struct Simulator {
    caches: Vec<GenericCache>,
    stats: Vec<ReadStats>,
    latency: LatencyModel,
    result: SimulationResult,
    simulation_time: Duration,
}

/// The result of a simulation. Can be serialised to the JSON output format
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SimulationResult {
    pub caches: Vec<CacheResult>,
}

/// The result for an individual cache
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CacheResult {
    pub name: String,
    pub policy: ReplacementPolicyConfig,
    pub capacity: usize,
    pub total_reads: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_ratio: f64,
    pub average_latency: f64,
}

impl Simulator {
    /// Creates a new simulator for a given configuration
    ///
    /// # Arguments
    ///
    /// * `config`: A simulation configuration, usually resulting from parsing JSON
    ///
    /// returns: Simulator
    pub fn new(config: &SimulationConfig) -> Self {
        let latency = LatencyModel::from(&config.latency);
        let empty = ReadStats::default();
        let result = SimulationResult {
            caches: config
                .caches
                .iter()
                .map(|cache| CacheResult {
                    name: cache.name.clone(),
                    policy: cache.policy,
                    capacity: cache.capacity,
                    total_reads: 0,
                    hits: 0,
                    misses: 0,
                    hit_ratio: empty.hit_ratio(),
                    average_latency: latency.average_latency(&empty),
                })
                .collect(),
        };
        Self {
            caches: config.caches.iter().map(GenericCache::from).collect(),
            stats: vec![ReadStats::default(); config.caches.len()],
            latency,
            result,
            simulation_time: Duration::new(0, 0),
        }
    }

    /// Replays `records` against every cache.
    ///
    /// Each cache gets the whole slice before the next one starts; the caches share nothing, so
    /// the order doesn't affect the results
    ///
    /// # Arguments
    ///
    /// * `records`: The trace, in input order
    ///
    /// returns: &SimulationResult
    pub fn simulate(&mut self, records: &[TraceRecord]) -> &SimulationResult {
        let start = Instant::now();
        for ((cache, stats), res) in self.caches.iter_mut().zip(&mut self.stats).zip(&mut self.result.caches) {
            let run = cache.simulate(records);
            stats.total_reads += run.total_reads;
            stats.hits += run.hits;

            res.total_reads = stats.total_reads;
            res.hits = stats.hits;
            res.misses = stats.misses();
            res.hit_ratio = stats.hit_ratio();
            res.average_latency = self.latency.average_latency(stats);
            info!(
                cache = %res.name,
                reads = res.total_reads,
                hits = res.hits,
                resident = cache.resident_count(),
                "Replayed trace"
            );
        }
        let end = Instant::now();
        self.simulation_time += end - start;
        &self.result
    }

    pub fn result(&self) -> &SimulationResult {
        &self.result
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of resident offsets for each cache
    pub fn get_resident_counts(&self) -> Vec<u64> {
        self.caches.iter().map(|x| x.resident_count() as u64).collect()
    }

    /// Gets the raw read counts for each cache
    pub fn get_stats(&self) -> &[ReadStats] {
        &self.stats
    }
}
