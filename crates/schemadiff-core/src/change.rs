//! Structural changes between two schemas.
//!
//! A [`Change`] only says what differs. The order in which changes are
//! turned into statements is decided by the emitter in [`crate::dialect`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::schema::{ColumnDef, ForeignKey};

/// A single structural difference.
///
/// Every per-table variant names the table by its name in the new schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Change {
    /// Create a table that only exists in the new schema.
    CreateTable {
        /// Table name.
        name: String,
        /// Statement text from the table name on, verbatim.
        definition: String,
    },

    /// Drop a table that only exists in the old schema.
    DropTable {
        /// Table name.
        name: String,
    },

    /// Rename a table.
    RenameTable {
        /// Old table name.
        old_name: String,
        /// New table name.
        new_name: String,
    },

    /// Create a view.
    CreateView {
        /// View name.
        name: String,
        /// Statement text from the view name on, verbatim.
        definition: String,
    },

    /// Drop a view.
    DropView {
        /// View name.
        name: String,
    },

    /// Add a column to a table.
    AddColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Column text usable in `ADD COLUMN`.
        definition: String,
    },

    /// Drop a column from a table.
    DropColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Column name as written in the old schema.
        ident: String,
    },

    /// Rename a column.
    RenameColumn {
        /// Table name.
        table: String,
        /// Old column name.
        old_name: String,
        /// New column name.
        new_name: String,
    },

    /// Change a column's type, nullability or default.
    AlterColumn {
        /// Table name.
        table: String,
        /// Column name, after any rename.
        column: String,
        /// The old definition.
        old: Box<ColumnDef>,
        /// The new definition.
        new: Box<ColumnDef>,
    },

    /// Add a unique key by creating a unique index.
    AddUniqueIndex {
        /// Table name.
        table: String,
        /// Table name as written in the new schema.
        table_ident: String,
        /// Key columns.
        columns: Vec<String>,
        /// Index name declared by the new schema, if any.
        name: Option<String>,
    },

    /// Drop a unique key.
    DropUniqueIndex {
        /// Table name.
        table: String,
        /// Key columns, as named in the old schema.
        columns: Vec<String>,
        /// The index backing the key; `None` when the key is the rowid.
        index: Option<String>,
    },

    /// Add a foreign key.
    AddForeignKey {
        /// Table name.
        table: String,
        /// The foreign key.
        foreign_key: ForeignKey,
    },

    /// Drop a foreign key.
    DropForeignKey {
        /// Table name.
        table: String,
        /// The foreign key, as declared in the old schema.
        foreign_key: ForeignKey,
    },
}

impl Change {
    /// Returns the table a column or key change applies to, or `None` for
    /// table and view level changes.
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::AddColumn { table, .. }
            | Self::DropColumn { table, .. }
            | Self::RenameColumn { table, .. }
            | Self::AlterColumn { table, .. }
            | Self::AddUniqueIndex { table, .. }
            | Self::DropUniqueIndex { table, .. }
            | Self::AddForeignKey { table, .. }
            | Self::DropForeignKey { table, .. } => Some(table),
            Self::CreateTable { .. }
            | Self::DropTable { .. }
            | Self::RenameTable { .. }
            | Self::CreateView { .. }
            | Self::DropView { .. } => None,
        }
    }

    /// Returns a short, human readable description.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::CreateTable { name, .. } => format!("Create table {name}"),
            Self::DropTable { name } => format!("Drop table {name}"),
            Self::RenameTable { old_name, new_name } => {
                format!("Rename table {old_name} to {new_name}")
            }
            Self::CreateView { name, .. } => format!("Create view {name}"),
            Self::DropView { name } => format!("Drop view {name}"),
            Self::AddColumn { table, column, .. } => format!("Add column {table}.{column}"),
            Self::DropColumn { table, column, .. } => format!("Drop column {table}.{column}"),
            Self::RenameColumn {
                table,
                old_name,
                new_name,
            } => format!("Rename column {table}.{old_name} to {new_name}"),
            Self::AlterColumn { table, column, .. } => format!("Alter column {table}.{column}"),
            Self::AddUniqueIndex { table, columns, .. } => {
                format!("Add unique key on {table}({})", columns.join(", "))
            }
            Self::DropUniqueIndex { table, columns, .. } => {
                format!("Drop unique key on {table}({})", columns.join(", "))
            }
            Self::AddForeignKey { table, .. } => format!("Add foreign key on {table}"),
            Self::DropForeignKey { table, .. } => format!("Drop foreign key on {table}"),
        }
    }
}

/// The changes between two schemas, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDiff {
    /// Changes in the order they were found.
    pub changes: Vec<Change>,
    /// Index names already taken in either schema; generated names avoid
    /// them.
    pub reserved_index_names: BTreeSet<String>,
}

impl SchemaDiff {
    /// Returns true if the schemas are equivalent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns the number of changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }
}
