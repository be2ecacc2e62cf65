//! Error types for the history import.

use crate::history::ObjectKind;
use thiserror::Error;

/// Import errors.
///
/// Everything in here aborts the run. Per-feature problems (missing points,
/// degenerate rings, ...) never surface as an `ImportError`; they are
/// absorbed where they are detected.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Input is not sorted by `(type, id, version)`.
    #[error(
        "input is not sorted by type, id and version: {last_kind} {last_id}v{last_version} \
         comes before {kind} {id}v{version}"
    )]
    Unsorted {
        last_kind: ObjectKind,
        last_id: i64,
        last_version: u32,
        kind: ObjectKind,
        id: i64,
        version: u32,
    },

    /// Malformed input record.
    #[error("Input error at line {line}: {message}")]
    Input { line: u64, message: String },

    /// IO error while reading input or writing the sink.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Sink could not be set up or written.
    #[error("Sink error: {0}")]
    Sink(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;
