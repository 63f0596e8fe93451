//! Schema script parser.
//!
//! Only the statements that make up a schema are understood: `CREATE TABLE`
//! with its column and constraint grammar, `CREATE VIEW` (captured
//! verbatim) and `CREATE UNIQUE INDEX`. Each top-level statement is
//! classified once into a [`SchemaItem`].

mod cursor;
mod error;
mod statement;
mod table;
mod view;

pub use error::{ParseError, ParseErrorKind};
pub use statement::{split_statements, Statement};
pub use table::parse_create_table;
pub use view::{parse_create_index, parse_create_view};

use crate::schema::{TableDef, UniqueIndexDef, ViewDef};

/// Statements that carry data or transaction control rather than schema.
const DATA_STATEMENTS: &[&str] = &[
    "insert",
    "replace",
    "update",
    "delete",
    "with",
    "pragma",
    "begin",
    "commit",
    "end",
    "rollback",
    "savepoint",
    "release",
    "analyze",
    "vacuum",
];

/// One classified top-level statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaItem {
    /// `CREATE TABLE`
    Table(TableDef),
    /// `CREATE VIEW`
    View(ViewDef),
    /// `CREATE UNIQUE INDEX` defining a plain unique key.
    UniqueIndex(UniqueIndexDef),
    /// A statement that does not affect the schema model, with a short
    /// description of what it was.
    Ignored(&'static str),
}

/// Classifies and parses one statement.
///
/// # Errors
///
/// Returns a [`ParseError`] for malformed statements, and one of kind
/// [`ParseErrorKind::UnsupportedStatement`] for statements that are neither
/// schema definitions nor skippable data statements.
pub fn parse_statement(statement: &Statement<'_>) -> Result<SchemaItem, ParseError> {
    if statement.starts_with(&["create", "table"]) {
        return parse_create_table(statement).map(SchemaItem::Table);
    }
    if statement.starts_with(&["create", "view"]) {
        return parse_create_view(statement).map(SchemaItem::View);
    }
    if statement.starts_with(&["create", "unique", "index"])
        || statement.starts_with(&["create", "index"])
    {
        return Ok(parse_create_index(statement)?
            .map_or(SchemaItem::Ignored("index"), SchemaItem::UniqueIndex));
    }
    if statement.starts_with(&["create", "trigger"]) {
        return Ok(SchemaItem::Ignored("trigger"));
    }
    if DATA_STATEMENTS
        .iter()
        .any(|keyword| statement.starts_with(&[*keyword]))
    {
        return Ok(SchemaItem::Ignored("data statement"));
    }

    let span = statement.span();
    let head: String = statement
        .significant()
        .take(3)
        .map(|t| t.span.text(statement.source))
        .collect::<Vec<_>>()
        .join(" ");
    Err(ParseError::unsupported(&head, span))
}
