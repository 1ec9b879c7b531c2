//! Error types for sufidx

use thiserror::Error;

/// Result type alias for sufidx operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types surfaced by the library layer
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error opening, reading, or writing a FASTA or index file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Magic mismatch, truncated stream, or inconsistent length prefix
    /// encountered while deserializing an index
    #[error("invalid index: {0}")]
    InvalidIndex(String),

    /// The suffix-array collaborator could not produce a valid permutation
    #[error("index build failed: {0}")]
    IndexBuildFailed(String),

    /// A required argument is missing or unparseable
    #[error("argument error: {0}")]
    Argument(String),
}
