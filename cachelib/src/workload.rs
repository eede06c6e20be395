use serde::{Deserialize, Serialize};

use crate::trace::{AccessKind, TraceRecord};

const BYTES_PER_GIB: f64 = (1u64 << 30) as f64;

/// Read/write mix of a trace, counted in millions of operations and GiB transferred
///
/// Operation tags are matched ignoring case, tags which are neither a read nor a write are left
/// out of every figure
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadSummary {
    pub write_count_millions: f64,
    pub read_count_millions: f64,
    pub write_size_gib: f64,
    pub read_size_gib: f64,
}

impl WorkloadSummary {
    pub fn from_records(records: &[TraceRecord]) -> Self {
        let (mut reads, mut writes) = (0u64, 0u64);
        let (mut read_bytes, mut write_bytes) = (0u64, 0u64);
        for record in records {
            match record.operation.loose_kind() {
                Some(AccessKind::Read) => {
                    reads += 1;
                    read_bytes += record.size;
                }
                Some(AccessKind::Write) => {
                    writes += 1;
                    write_bytes += record.size;
                }
                None => {}
            }
        }
        Self {
            write_count_millions: round3(writes as f64 / 1e6),
            read_count_millions: round3(reads as f64 / 1e6),
            write_size_gib: round3(write_bytes as f64 / BYTES_PER_GIB),
            read_size_gib: round3(read_bytes as f64 / BYTES_PER_GIB),
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
