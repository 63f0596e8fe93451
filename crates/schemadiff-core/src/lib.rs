//! Declarative schema diffing for SQLite.
//!
//! `schemadiff-core` compares two schema scripts and returns the statements
//! that turn a database built from the first into one matching the second:
//!
//! - **Lexer / parser** - Split a script into statements and parse
//!   `CREATE TABLE`, `CREATE VIEW` and `CREATE UNIQUE INDEX`, keeping the
//!   comments attached to tables and columns
//! - **Rename resolution** - `-- aka[old_name]` comments link new tables and
//!   columns to their previous names, so a rename is emitted instead of a
//!   drop and create
//! - **Diff** - Compare the two schemas into a set of [`change::Change`]s
//! - **Dialect** - Order the changes and render them as SQLite statements
//!
//! # Example
//!
//! ```rust
//! use schemadiff_core::diff_schemas;
//!
//! let statements = diff_schemas(
//!     "create table tbl (a text)",
//!     "create table tbl (
//!          b text -- aka[a]
//!      )",
//! )
//! .unwrap();
//!
//! assert_eq!(statements, vec![r#"ALTER TABLE "tbl" RENAME COLUMN "a" TO "b""#]);
//! ```
//!
//! The pipeline is pure: nothing here touches a database. Entries of the
//! result that start with `--` are comments (warnings and changes that
//! cannot be expressed as `ALTER TABLE`), never statements to execute.

pub mod change;
pub mod dialect;
pub mod diff;
pub mod error;
mod extract;
pub mod lexer;
pub mod parser;
pub mod rename;
pub mod schema;

use tracing::debug;

use crate::diff::SchemaDiffer;
use crate::dialect::{Emitter, SqliteDialect};
use crate::error::Result;
use crate::schema::Schema;

/// Computes the SQLite statements that migrate `old` to `new`.
///
/// # Errors
///
/// Returns an error if either script cannot be parsed, or if a rename
/// annotation is ambiguous.
pub fn diff_schemas(old: &str, new: &str) -> Result<Vec<String>> {
    let old = Schema::parse(old)?;
    let new = Schema::parse(new)?;
    let diff = SchemaDiffer::new(&old, &new)?.changes();
    let statements = Emitter::new(SqliteDialect::new()).emit(&diff);
    debug!(
        changes = diff.len(),
        statements = statements.len(),
        "Computed schema diff"
    );
    Ok(statements)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::change::{Change, SchemaDiff};
    pub use crate::dialect::{EmitContext, Emitter, SchemaDialect, SqliteDialect};
    pub use crate::diff::SchemaDiffer;
    pub use crate::diff_schemas;
    pub use crate::error::{Result, SchemaError};
    pub use crate::parser::{ParseError, ParseErrorKind};
    pub use crate::rename::IdentityMap;
    pub use crate::schema::{
        ColumnDef, ConstraintKind, ForeignKey, ForeignKeyAction, ForeignKeyClause, KeyBacking,
        Schema, TableConstraint, TableDef, UniqueIndexDef, UniqueKey, ViewDef,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_schemas_is_empty_for_same_script() {
        let sql = "create table tbl (a text unique, b int not null default 0);";
        assert!(diff_schemas(sql, sql).unwrap().is_empty());
    }

    #[test]
    fn test_diff_schemas_reports_parse_errors() {
        let err = diff_schemas("create table t (a text", "").unwrap_err();
        assert!(matches!(err, error::SchemaError::Parse(_)));
    }
}
