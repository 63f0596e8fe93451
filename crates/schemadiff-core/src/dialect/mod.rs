//! Turning changes into statements.
//!
//! The [`Emitter`] decides the order statements are emitted in; a
//! [`SchemaDialect`] renders each change. Order matters because later
//! statements rely on names established by earlier ones:
//!
//! 1. table renames
//! 2. view drops, all of them before any table drop
//! 3. table drops
//! 4. table creations
//! 5. column and key changes, grouped per table
//! 6. view creations

mod sqlite;

use std::collections::BTreeSet;

pub use sqlite::{SqliteDialect, TEMP_COLUMN};

use crate::change::{Change, SchemaDiff};

/// State shared by every statement of one diff.
#[derive(Debug, Default)]
pub struct EmitContext {
    unique_indexes: usize,
    reserved: BTreeSet<String>,
}

impl EmitContext {
    /// Creates a context whose generated index names avoid `reserved`.
    #[must_use]
    pub const fn new(reserved: BTreeSet<String>) -> Self {
        Self {
            unique_indexes: 0,
            reserved,
        }
    }

    /// Returns the next free `unique_index_<n>` name.
    pub fn next_index_name(&mut self) -> String {
        loop {
            self.unique_indexes += 1;
            let name = format!("unique_index_{}", self.unique_indexes);
            if !self.reserved.contains(&name) {
                return name;
            }
        }
    }
}

/// Trait for database-specific statement generation.
pub trait SchemaDialect: Send + Sync {
    /// Generates the statements for one change. Entries starting with `--`
    /// are comments and are never executed.
    fn generate_sql(&self, change: &Change, context: &mut EmitContext) -> Vec<String>;

    /// Quote an identifier (table name, column name, etc.).
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Where a change sits in the emitted sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    RenameTable,
    DropView,
    DropTable,
    CreateTable,
    /// Table position by first appearance, then rank within the table.
    Table(usize, u8),
    CreateView,
}

/// Rank of a column or key change within its table.
const fn table_rank(change: &Change) -> u8 {
    match change {
        Change::DropUniqueIndex { .. } => 0,
        Change::AddColumn { .. } => 1,
        Change::DropColumn { .. } => 2,
        Change::RenameColumn { .. } => 3,
        Change::AlterColumn { .. } => 4,
        Change::AddUniqueIndex { .. } => 5,
        Change::DropForeignKey { .. } => 6,
        Change::AddForeignKey { .. } => 7,
        Change::CreateTable { .. }
        | Change::DropTable { .. }
        | Change::RenameTable { .. }
        | Change::CreateView { .. }
        | Change::DropView { .. } => 0,
    }
}

/// Orders changes and renders them with a dialect.
#[derive(Debug, Clone, Default)]
pub struct Emitter<D> {
    dialect: D,
}

impl<D: SchemaDialect> Emitter<D> {
    /// Creates an emitter for `dialect`.
    #[must_use]
    pub const fn new(dialect: D) -> Self {
        Self { dialect }
    }

    /// Returns the changes of `diff` in emission order. The sort is stable,
    /// so changes of equal rank keep their discovery order.
    #[must_use]
    pub fn order(diff: &SchemaDiff) -> Vec<&Change> {
        let mut tables: Vec<&str> = Vec::new();
        for table in diff.changes.iter().filter_map(Change::table) {
            if !tables.contains(&table) {
                tables.push(table);
            }
        }

        let phase = |change: &Change| match change {
            Change::RenameTable { .. } => Phase::RenameTable,
            Change::DropView { .. } => Phase::DropView,
            Change::DropTable { .. } => Phase::DropTable,
            Change::CreateTable { .. } => Phase::CreateTable,
            Change::CreateView { .. } => Phase::CreateView,
            other => {
                let position = other
                    .table()
                    .and_then(|t| tables.iter().position(|name| *name == t))
                    .unwrap_or_default();
                Phase::Table(position, table_rank(other))
            }
        };

        let mut ordered: Vec<&Change> = diff.changes.iter().collect();
        ordered.sort_by_key(|change| phase(*change));
        ordered
    }

    /// Renders every change of `diff`, in emission order.
    #[must_use]
    pub fn emit(&self, diff: &SchemaDiff) -> Vec<String> {
        let mut context = EmitContext::new(diff.reserved_index_names.clone());
        Self::order(diff)
            .into_iter()
            .flat_map(|change| self.dialect.generate_sql(change, &mut context))
            .collect()
    }
}
