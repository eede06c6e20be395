//! # CacheLib
//!
//! Cachelib estimates the read latency of a storage trace under different cache replacement
//! policies
//!
//! It parses a comma separated I/O trace, replays its reads against a least recently used cache
//! and a frequent read cache, and converts each cache's hit ratio into an average latency using a
//! fixed cost per hit and per miss

/// Contains the cache trait, the two simulated caches, and an enum dispatching between them
pub mod cache;

/// Contains definitions for the JSON configuration format
pub mod config;

/// Contains the library error types
pub mod error;

/// Contains the trace file reader
pub mod io;

/// Contains read/hit accounting and the latency model
pub mod metrics;

/// Contains the tool for appending a label column to every `.csv` trace in a directory
pub mod relabel;

/// Contains the replacement policies backing the caches
pub mod replacement_policies;

/// Contains the simulator used to replay a trace against a configured set of caches
pub mod simulator;

/// Contains the trace record and its parser
pub mod trace;

/// Contains utilities for finding trace files
pub mod util;

/// Contains read/write workload statistics
pub mod workload;

#[cfg(test)]
mod test;

pub use cache::{CacheTrait, FrequencyCache, GenericCache, RecencyCache};
pub use config::SimulationConfig;
pub use error::SimError;
pub use simulator::Simulator;
pub use trace::{TraceRecord, TraceSource};
