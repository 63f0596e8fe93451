//! Building a [`Schema`] from a schema script.

use tracing::{debug, warn};

use crate::error::{Result, SchemaError};
use crate::parser::{parse_statement, split_statements, SchemaItem};
use crate::schema::{Schema, UniqueIndexDef};

impl Schema {
    /// Parses a schema script: `CREATE TABLE`, `CREATE VIEW` and
    /// `CREATE UNIQUE INDEX` statements separated by `;`.
    ///
    /// Data statements and triggers are skipped. Unique indexes are folded
    /// into the table they index, wherever they appear in the script.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Parse`] for malformed or unsupported statements
    /// and [`SchemaError::DuplicateTable`] / [`SchemaError::DuplicateView`]
    /// when a name is defined twice.
    pub fn parse(source: &str) -> Result<Self> {
        let mut schema = Self::new();
        let mut indexes: Vec<UniqueIndexDef> = Vec::new();

        for statement in split_statements(source)? {
            match parse_statement(&statement)? {
                SchemaItem::Table(table) => {
                    if schema.table(&table.name).is_some() {
                        return Err(SchemaError::DuplicateTable(table.name));
                    }
                    debug!(table = %table.name, columns = table.columns.len(), "Parsed table");
                    schema.tables.push(table);
                }
                SchemaItem::View(view) => {
                    if schema.view(&view.name).is_some() {
                        return Err(SchemaError::DuplicateView(view.name));
                    }
                    debug!(view = %view.name, "Parsed view");
                    schema.views.push(view);
                }
                SchemaItem::UniqueIndex(index) => indexes.push(index),
                SchemaItem::Ignored(what) => {
                    debug!(statement = %statement.text(), "Skipping {what}");
                }
            }
        }

        for index in indexes {
            match schema.tables.iter_mut().find(|t| t.name.eq_ignore_ascii_case(&index.table)) {
                Some(table) => table.indexes.push(index),
                None => warn!(
                    index = %index.name,
                    table = %index.table,
                    "Skipping unique index on unknown table"
                ),
            }
        }

        Ok(schema)
    }
}
