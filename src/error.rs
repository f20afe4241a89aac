//! Error types for the vector index

use thiserror::Error;

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, VectorIndexError>;

/// Error types that can occur in index operations.
///
/// Only `DimensionMismatch`, `BackendUnavailable`, `NotInitialized` and
/// `Disposed` reach callers of the public API; the storage, serialization
/// and transport classes are absorbed by the engine, logged, and reflected
/// through return values so callers keep working without durability or
/// connectivity.
#[derive(Error, Debug)]
pub enum VectorIndexError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Math backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Index not initialized")]
    NotInitialized,

    #[error("Index disposed")]
    Disposed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Transport error: {0}")]
    TransportError(String),
}
