//! SQLite statement generation.
//!
//! SQLite cannot change a column's type or nullability in place, so
//! [`Change::AlterColumn`] becomes a short sequence: rename the column out
//! of the way, add it again with the new definition, copy the data across,
//! and drop the old copy. Foreign keys can only change by rebuilding the
//! table, which is not attempted; those changes become comments.

use crate::change::Change;
use crate::schema::ColumnDef;

use super::{EmitContext, SchemaDialect};

/// Name the old column is parked under while a column is redefined.
pub const TEMP_COLUMN: &str = "__schemadiff_tmp__";

const NOT_NULL_WARNING: &str = "-- WARNING: adding a not null column without a default value \
                                will fail if there is any data in the table";

/// SQLite schema dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn drop_table_sql(&self, name: &str) -> String {
        format!("DROP TABLE {}", self.quote_identifier(name))
    }

    fn rename_table_sql(&self, old_name: &str, new_name: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME TO {}",
            self.quote_identifier(old_name),
            self.quote_identifier(new_name)
        )
    }

    fn add_column_sql(&self, table: &str, definition: &str) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {definition}",
            self.quote_identifier(table)
        )
    }

    /// Column names are emitted as written, so a quoted column stays quoted.
    fn drop_column_sql(&self, table: &str, ident: &str) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {ident}",
            self.quote_identifier(table)
        )
    }

    fn rename_column_sql(&self, table: &str, old_name: &str, new_name: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.quote_identifier(table),
            self.quote_identifier(old_name),
            self.quote_identifier(new_name)
        )
    }

    /// Redefines `column` of `table` as `new`, keeping its data.
    fn alter_column_sql(&self, table: &str, column: &str, new: &ColumnDef) -> Vec<String> {
        let quoted_table = self.quote_identifier(table);
        let mut sql = vec![format!(
            "ALTER TABLE {quoted_table} RENAME COLUMN {} TO {TEMP_COLUMN}",
            self.quote_identifier(column)
        )];

        if new.not_null && new.default.is_none() {
            sql.push(NOT_NULL_WARNING.to_string());
        }
        sql.push(self.add_column_sql(table, &new.addable));

        let mut value = new.sql_type.as_deref().map_or_else(
            || TEMP_COLUMN.to_string(),
            |sql_type| format!("CAST({TEMP_COLUMN} AS {})", sql_type.to_ascii_uppercase()),
        );
        if let Some(default) = &new.default {
            value = format!("COALESCE({value}, {default})");
        }
        sql.push(format!(
            "UPDATE {quoted_table} SET {} = {value}",
            self.quote_identifier(column)
        ));

        sql.push(self.drop_column_sql(table, TEMP_COLUMN));
        sql
    }

    fn create_unique_index_sql(&self, name: &str, table_ident: &str, columns: &[String]) -> String {
        let quoted: Vec<String> = columns.iter().map(|c| self.quote_identifier(c)).collect();
        format!(
            "CREATE UNIQUE INDEX {name} ON {table_ident}({})",
            quoted.join(",")
        )
    }
}

impl SchemaDialect for SqliteDialect {
    fn generate_sql(&self, change: &Change, context: &mut EmitContext) -> Vec<String> {
        match change {
            Change::CreateTable { definition, .. } => vec![format!("CREATE TABLE {definition}")],

            Change::DropTable { name } => vec![self.drop_table_sql(name)],

            Change::RenameTable { old_name, new_name } => {
                vec![self.rename_table_sql(old_name, new_name)]
            }

            Change::CreateView { definition, .. } => vec![format!("CREATE VIEW {definition}")],

            Change::DropView { name } => {
                vec![format!("DROP VIEW {}", self.quote_identifier(name))]
            }

            Change::AddColumn {
                table, definition, ..
            } => vec![self.add_column_sql(table, definition)],

            Change::DropColumn { table, ident, .. } => vec![self.drop_column_sql(table, ident)],

            Change::RenameColumn {
                table,
                old_name,
                new_name,
            } => vec![self.rename_column_sql(table, old_name, new_name)],

            Change::AlterColumn {
                table, column, new, ..
            } => self.alter_column_sql(table, column, new),

            Change::AddUniqueIndex {
                table_ident,
                columns,
                name,
                ..
            } => {
                let name = name.clone().unwrap_or_else(|| context.next_index_name());
                vec![self.create_unique_index_sql(&name, table_ident, columns)]
            }

            Change::DropUniqueIndex {
                table,
                columns,
                index,
            } => match index {
                Some(index) => vec![format!("DROP INDEX {index}")],
                None => vec![format!(
                    "-- NOT IMPLEMENTED: drop primary key {table}({}), it is the rowid",
                    columns.join(",")
                )],
            },

            Change::AddForeignKey { foreign_key, .. } => {
                vec![format!("-- NOT IMPLEMENTED: add foreign key {foreign_key}")]
            }

            Change::DropForeignKey { foreign_key, .. } => {
                vec![format!("-- NOT IMPLEMENTED: drop foreign key {foreign_key}")]
            }
        }
    }
}
