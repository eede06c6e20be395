use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the library
///
/// Malformed trace lines are not errors at this level, they are skipped by the trace source and
/// only show up in its skip counters
#[derive(Error, Debug)]
pub enum SimError {
    /// A file or directory couldn't be opened, read, or written
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The trace stream failed part way through
    #[error("couldn't read the trace: {0}")]
    ReadTrace(#[from] io::Error),

    /// The JSON configuration couldn't be parsed
    #[error("couldn't parse the config file: {0}")]
    Config(#[source] serde_json::Error),

    /// The configuration parsed, but describes something the simulator can't run
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A result couldn't be serialised for output
    #[error("couldn't serialise the output: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl SimError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SimError::Io { path: path.into(), source }
    }
}

/// Why a single trace line was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("field '{field}' is missing")]
    MissingField { field: &'static str },

    #[error("field '{field}' is not an unsigned integer: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}
