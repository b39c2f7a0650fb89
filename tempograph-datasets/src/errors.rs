//! Error types for dataset retrieval and parsing.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while fetching or canonicalizing raw datasets.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The requested dataset name has no registry entry.
    #[error("unknown dataset `{name}`")]
    UnknownDataset {
        /// The unmatched name.
        name: String,
    },
    /// The raw file is absent from the cache and cannot be fetched.
    #[error("dataset `{name}` is unavailable: {message}")]
    Unavailable {
        /// Dataset whose raw file could not be obtained.
        name: String,
        /// Human-readable cause.
        message: String,
    },
    /// A dataset download failed. Downloads are not retried.
    #[error("dataset download failed for `{url}`: {message}")]
    Download {
        /// URL that failed.
        url: String,
        /// Human-readable failure message.
        message: String,
    },
    /// Reading or writing cached dataset files failed.
    #[error("I/O failure while handling cached dataset data: {0}")]
    Io(#[from] io::Error),
    /// An archive could not be decoded or lacked the expected member.
    #[error("invalid archive `{path}`: {message}")]
    Archive {
        /// Path of the offending archive payload.
        path: PathBuf,
        /// Human-readable decode failure.
        message: String,
    },
    /// The raw file was not valid UTF-8.
    #[error("raw dataset file is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    /// A raw data row could not be parsed. Parsing aborts at the first bad
    /// row; there is no per-row recovery.
    #[error("malformed row at line {line}: {message}")]
    MalformedRow {
        /// One-based line number of the offending row.
        line: usize,
        /// What was wrong with it.
        message: String,
    },
    /// The raw file yielded no usable edges.
    #[error("dataset contains no usable edge records")]
    EmptyDataset,
}
