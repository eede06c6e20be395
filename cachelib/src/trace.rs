use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{ParseError, SimError};
use crate::io::get_reader;

/// Field count of a relabelled trace, which is what the simulator replays
pub const TRACE_FIELD_COUNT: usize = 8;

/// Field count of a raw MSR Cambridge trace, before relabelling
pub const MSR_FIELD_COUNT: usize = 7;

const TIMESTAMP_FIELD: usize = 0;
const OPERATION_FIELD: usize = 3;
const OFFSET_FIELD: usize = 4;
const SIZE_FIELD: usize = 5;
const RESPONSE_TIME_FIELD: usize = 6;

/// Every field the parser reads has to exist, so lines can't be shorter than this
pub const MIN_FIELD_COUNT: usize = RESPONSE_TIME_FIELD + 1;

/// The operation recorded for an event
///
/// Only an exact `Read` is replayed against the caches, anything else is carried along untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Other(String),
}

impl Operation {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "Read" => Operation::Read,
            "Write" => Operation::Write,
            other => Operation::Other(other.to_string()),
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(self, Operation::Read)
    }

    /// Classifies the tag ignoring case, for workload statistics rather than replay
    pub fn loose_kind(&self) -> Option<AccessKind> {
        match self {
            Operation::Read => Some(AccessKind::Read),
            Operation::Write => Some(AccessKind::Write),
            Operation::Other(tag) if tag.eq_ignore_ascii_case("read") => Some(AccessKind::Read),
            Operation::Other(tag) if tag.eq_ignore_ascii_case("write") => Some(AccessKind::Write),
            Operation::Other(_) => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

/// One parsed event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub timestamp: Duration,
    pub operation: Operation,
    /// The cache key
    pub offset: u64,
    pub size: u64,
    pub response_time: u64,
}

impl TraceRecord {
    /// A read of `offset` with every other field zeroed, mostly useful for building traces by hand
    pub fn read(offset: u64) -> Self {
        Self {
            timestamp: Duration::ZERO,
            operation: Operation::Read,
            offset,
            size: 0,
            response_time: 0,
        }
    }
}

/// Parses one comma separated trace line with exactly `field_count` fields
///
/// A record is either parsed completely or rejected, there's no partial parse
///
/// # Examples
///
/// ```
/// use cachelib::trace::{parse_line, Operation};
/// let record = parse_line("128166372003061629,hm,0,Read,9933824,4096,101", 7).unwrap();
/// assert_eq!(record.operation, Operation::Read);
/// assert_eq!(record.offset, 9933824);
/// ```
pub fn parse_line(line: &str, field_count: usize) -> Result<TraceRecord, ParseError> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != field_count {
        return Err(ParseError::FieldCount {
            expected: field_count,
            found: fields.len(),
        });
    }
    Ok(TraceRecord {
        timestamp: Duration::from_micros(parse_field(&fields, TIMESTAMP_FIELD, "timestamp")?),
        // Compared verbatim, " Read" is not a read
        operation: Operation::parse(fields.get(OPERATION_FIELD).ok_or(ParseError::MissingField { field: "operation" })?),
        offset: parse_field(&fields, OFFSET_FIELD, "offset")?,
        size: parse_field(&fields, SIZE_FIELD, "size")?,
        response_time: parse_field(&fields, RESPONSE_TIME_FIELD, "response_time")?,
    })
}

fn parse_field<T: FromStr>(fields: &[&str], index: usize, name: &'static str) -> Result<T, ParseError> {
    let raw = fields.get(index).ok_or(ParseError::MissingField { field: name })?.trim();
    raw.parse().map_err(|_| ParseError::InvalidNumber {
        field: name,
        value: raw.to_string(),
    })
}

/// Checks that lines with `field_count` fields carry every field the parser reads
pub fn check_field_count(field_count: usize) -> Result<usize, SimError> {
    if field_count < MIN_FIELD_COUNT {
        return Err(SimError::InvalidConfig(format!(
            "trace lines need at least {MIN_FIELD_COUNT} fields, got {field_count}"
        )));
    }
    Ok(field_count)
}

/// A fully materialised trace, plus the number of lines which had to be skipped to build it
#[derive(Debug, Default)]
pub struct TraceSource {
    records: Vec<TraceRecord>,
    skipped_field_count: u64,
    skipped_invalid: u64,
}

impl TraceSource {
    /// Loads the trace at `path`
    pub fn open(path: impl AsRef<Path>, field_count: usize) -> Result<Self, SimError> {
        let reader = get_reader(path.as_ref())?;
        Self::from_reader(reader, field_count)
    }

    /// Parses every line of `reader`, skipping blank and malformed lines
    ///
    /// Lines aren't required to be valid UTF-8, invalid bytes are replaced and the line is then
    /// subject to the normal numeric checks
    pub fn from_reader<R: BufRead>(reader: R, field_count: usize) -> Result<Self, SimError> {
        check_field_count(field_count)?;
        let mut source = TraceSource::default();
        for (index, line) in reader.split(b'\n').enumerate() {
            let line = line?;
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(line, field_count) {
                Ok(record) => source.records.push(record),
                Err(e @ ParseError::FieldCount { .. }) => {
                    debug!(line = index + 1, "Skipping trace line: {e}");
                    source.skipped_field_count += 1;
                }
                Err(e @ (ParseError::InvalidNumber { .. } | ParseError::MissingField { .. })) => {
                    warn!(line = index + 1, "Error parsing line '{line}': {e}");
                    source.skipped_invalid += 1;
                }
            }
        }
        debug!(
            records = source.records.len(),
            skipped = source.skipped(),
            "Finished parsing trace"
        );
        Ok(source)
    }

    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TraceRecord> {
        self.records
    }

    /// Total number of skipped, non-blank lines
    pub fn skipped(&self) -> u64 {
        self.skipped_field_count + self.skipped_invalid
    }

    pub fn skipped_field_count(&self) -> u64 {
        self.skipped_field_count
    }

    pub fn skipped_invalid(&self) -> u64 {
        self.skipped_invalid
    }
}
