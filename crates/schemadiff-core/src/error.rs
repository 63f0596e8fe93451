//! Error types for schema extraction and rename resolution.

use crate::parser::ParseError;

/// Errors that can occur while building or comparing schemas.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A statement could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Two tables share a name within one schema.
    #[error("Table '{0}' is defined more than once")]
    DuplicateTable(String),

    /// Two views share a name within one schema.
    #[error("View '{0}' is defined more than once")]
    DuplicateView(String),

    /// A rename annotation matches more than one old name.
    #[error(
        "{name}'s aka list has more than one possible previous name: {}",
        .candidates.join(",")
    )]
    AmbiguousRename {
        /// Qualified name of the annotated entity (`table` or `table.column`).
        name: String,
        /// The matching old names, in declared order.
        candidates: Vec<String>,
    },

    /// Two new entities claim the same old entity.
    #[error("{first} and {second} both claim {previous} as their previous name")]
    ConflictingRename {
        /// Qualified name of the claimed old entity.
        previous: String,
        /// The entity that claimed it first.
        first: String,
        /// The entity that claimed it second.
        second: String,
    },
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
