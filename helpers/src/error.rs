//! Error types for the array helpers.

use crate::access::NodeKind;
use thiserror::Error;

/// All possible errors from the array helpers.
///
/// Path lookups never produce an error: a missing path yields a default or
/// `false`. Errors are reserved for inputs that cannot be processed at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Shape errors
    #[error("expected a mapping or sequence, got {kind}")]
    NotAccessible { kind: NodeKind },

    #[error("chunk size must be at least 1, got {0}")]
    InvalidChunkSize(usize),

    // Codec errors
    #[error("json encode failed: {0}")]
    Encode(String),

    #[error("json decode failed: {0}")]
    Decode(String),

    #[error("maximum nesting depth of {limit} exceeded")]
    DepthExceeded { limit: usize },

    // Boundary errors
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for helper operations.
pub type Result<T> = std::result::Result<T, Error>;
