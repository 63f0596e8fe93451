//! Error types for loading, diffing and applying schemas.

use schemadiff_core::error::SchemaError;

/// Errors that can occur while diffing or applying schemas.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A schema could not be parsed or its renames could not be resolved.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Database error while reading a catalog or executing a statement.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading a schema file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for schemadiff operations.
pub type Result<T> = std::result::Result<T, DiffError>;
