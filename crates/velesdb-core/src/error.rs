//! Error types for `velesdb-core`.
//!
//! Every variant falls into one of the four buckets the wire layer maps to
//! an HTTP status: [`ErrorCategory::NotFound`] (404), [`ErrorCategory::Conflict`]
//! (409), [`ErrorCategory::BadRequest`] (400), [`ErrorCategory::Internal`] (500).

use thiserror::Error;

/// Result type alias for `velesdb-core` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The four HTTP-mappable error buckets (spec §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Unknown collection, vector, or namespace.
    NotFound,
    /// Duplicate id, or a collection/namespace that already exists.
    Conflict,
    /// Malformed request: bad JSON, missing fields, dimension mismatch.
    BadRequest,
    /// I/O failure, allocation failure, or anything unexpected.
    Internal,
}

/// Errors that can occur in `velesdb-core` operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Collection already exists.
    #[error("collection '{0}' already exists")]
    CollectionExists(String),

    /// Collection not found.
    #[error("collection '{0}' not found")]
    CollectionNotFound(String),

    /// Vector id not found within a collection.
    #[error("vector '{0}' not found")]
    VectorNotFound(String),

    /// A vector id that was supposed to be unique within a collection already exists.
    #[error("duplicate id '{0}'")]
    DuplicateId(String),

    /// Vector dimension did not match the collection's configured dimension.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension configured on the collection.
        expected: usize,
        /// Dimension of the vector the caller supplied.
        actual: usize,
    },

    /// Malformed request body or missing required field.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Index graph file is corrupted or its version is incompatible.
    #[error("index corrupted: {0}")]
    IndexCorrupted(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error not otherwise classified.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the HTTP-mappable category this error belongs to.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::CollectionNotFound(_) | Self::VectorNotFound(_) => ErrorCategory::NotFound,
            Self::CollectionExists(_) | Self::DuplicateId(_) => ErrorCategory::Conflict,
            Self::BadRequest(_) | Self::DimensionMismatch { .. } => ErrorCategory::BadRequest,
            Self::IndexCorrupted(_) | Self::Config(_) | Self::Io(_) | Self::Serialization(_)
            | Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}
