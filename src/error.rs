//! Error types for trawl.
//!
//! Uses `thiserror` for ergonomic error definitions. Connection-level
//! failures carry enough structure for the scanner to classify them
//! into a terminal port status.

use thiserror::Error;

/// Failure modes of a single connection attempt.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("connection refused")]
    Refused,

    #[error("connection timed out")]
    Timeout,

    #[error("host or network unreachable: {0}")]
    Unreachable(String),

    #[error("connect failed: {0}")]
    Connect(#[from] std::io::Error),
}
