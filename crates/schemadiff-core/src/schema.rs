//! Schema representation types.
//!
//! A [`Schema`] is an immutable snapshot of one declared schema script:
//! tables and views in declaration order. Everything the diff engine needs
//! (unique keys, foreign keys, comparison keys) is derived from these types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Foreign key action (ON DELETE, ON UPDATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ForeignKeyAction {
    /// No action (error if referenced row is deleted/updated).
    #[default]
    NoAction,
    /// Restrict (same as NoAction but checked immediately).
    Restrict,
    /// Cascade the delete/update to referencing rows.
    Cascade,
    /// Set the foreign key column to NULL.
    SetNull,
    /// Set the foreign key column to its default value.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of this action.
    #[must_use]
    pub const fn to_sql(&self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// The target side of a `REFERENCES` clause, as written on a column or in a
/// table-level `FOREIGN KEY` constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKeyClause {
    /// Referenced table.
    pub to_table: String,
    /// Referenced columns; empty when the clause targets the primary key
    /// implicitly.
    pub to_columns: Vec<String>,
    /// Action on update.
    pub on_update: ForeignKeyAction,
    /// Action on delete.
    pub on_delete: ForeignKeyAction,
    /// Match type, upper-cased (`NONE` when unspecified).
    pub match_type: String,
}

impl ForeignKeyClause {
    /// Creates a clause targeting `to_table` with every option defaulted.
    #[must_use]
    pub fn new(to_table: impl Into<String>) -> Self {
        Self {
            to_table: to_table.into(),
            to_columns: Vec::new(),
            on_update: ForeignKeyAction::NoAction,
            on_delete: ForeignKeyAction::NoAction,
            match_type: "NONE".to_string(),
        }
    }
}

/// A normalised foreign key, derived from inline and table-level forms.
///
/// Only used to detect foreign key changes and to describe them; no DDL is
/// ever generated from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referencing table.
    pub from_table: String,
    /// Referencing columns.
    pub from_columns: Vec<String>,
    /// Referenced table.
    pub to_table: String,
    /// Referenced columns.
    pub to_columns: Vec<String>,
    /// Action on update.
    pub on_update: ForeignKeyAction,
    /// Action on delete.
    pub on_delete: ForeignKeyAction,
    /// Match type.
    pub match_type: String,
}

impl ForeignKey {
    /// Builds a foreign key from its referencing side and a clause.
    #[must_use]
    pub fn new(
        from_table: impl Into<String>,
        from_columns: Vec<String>,
        clause: &ForeignKeyClause,
    ) -> Self {
        Self {
            from_table: from_table.into(),
            from_columns,
            to_table: clause.to_table.clone(),
            to_columns: clause.to_columns.clone(),
            on_update: clause.on_update,
            on_delete: clause.on_delete,
            match_type: clause.match_type.clone(),
        }
    }

    /// Structural equality with names compared the way the engine does,
    /// ignoring ASCII case.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.from_table.eq_ignore_ascii_case(&other.from_table)
            && same_names(&self.from_columns, &other.from_columns)
            && self.to_table.eq_ignore_ascii_case(&other.to_table)
            && same_names(&self.to_columns, &other.to_columns)
            && self.on_update == other.on_update
            && self.on_delete == other.on_delete
            && self.match_type.eq_ignore_ascii_case(&other.match_type)
    }
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "from_table={} from_columns=({}) to_table={} to_columns=({}) \
             on_update={} on_delete={} match={}",
            self.from_table,
            self.from_columns.join(","),
            self.to_table,
            self.to_columns.join(","),
            self.on_update.to_sql(),
            self.on_delete.to_sql(),
            self.match_type,
        )
    }
}

/// Compares two name lists element-wise, ignoring ASCII case like SQLite
/// does for identifiers.
#[must_use]
pub fn same_names(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_ignore_ascii_case(y))
}

/// One column definition of a `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name, unquoted.
    pub name: String,
    /// Column name as written in the source (possibly quoted).
    pub ident: String,
    /// Type and inline constraints, verbatim, without trailing comments.
    pub definition: String,
    /// Comments attached to this column.
    pub comments: Vec<String>,
    /// Declared type as written, if any.
    pub sql_type: Option<String>,
    /// Whether the column carries a PRIMARY KEY clause.
    pub primary_key: bool,
    /// Whether the column carries a UNIQUE clause.
    pub unique: bool,
    /// Whether the column carries NOT NULL.
    pub not_null: bool,
    /// Default expression as written (`'x'`, `0`, `(datetime())`).
    pub default: Option<String>,
    /// Inline REFERENCES clause.
    pub references: Option<ForeignKeyClause>,
    /// Column text usable in `ALTER TABLE .. ADD COLUMN`: the source with
    /// PRIMARY KEY and UNIQUE clauses removed.
    pub addable: String,
    /// Token-normalised definition used to detect changes. Excludes the
    /// clauses diffed separately (PRIMARY KEY, UNIQUE, REFERENCES).
    pub normalized: String,
}

impl ColumnDef {
    /// Returns true if the column has an inline `REFERENCES` clause.
    #[must_use]
    pub const fn is_foreign_key(&self) -> bool {
        self.references.is_some()
    }

    /// Returns true if the declared type is exactly `INTEGER`, which makes a
    /// primary key column an alias of the rowid.
    #[must_use]
    pub fn is_integer_type(&self) -> bool {
        self.sql_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("integer"))
    }
}

/// The typed content of a table-level constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// `PRIMARY KEY (a, b)`
    PrimaryKey {
        /// Key columns.
        columns: Vec<String>,
    },
    /// `UNIQUE (a, b)`
    Unique {
        /// Key columns.
        columns: Vec<String>,
    },
    /// `FOREIGN KEY (a) REFERENCES t (b)`
    ForeignKey {
        /// Referencing columns.
        columns: Vec<String>,
        /// Referenced side.
        references: ForeignKeyClause,
    },
    /// `CHECK (expr)`
    Check,
}

/// A table-level constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConstraint {
    /// Name given with `CONSTRAINT name`, if any.
    pub name: Option<String>,
    /// The constraint's typed content.
    pub kind: ConstraintKind,
    /// The constraint text, verbatim.
    pub source: String,
    /// Comments attached to this constraint.
    pub comments: Vec<String>,
}

/// An explicit `CREATE UNIQUE INDEX` folded into its table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueIndexDef {
    /// Index name.
    pub name: String,
    /// Indexed table.
    pub table: String,
    /// Indexed columns.
    pub columns: Vec<String>,
}

/// What enforces a unique key in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyBacking {
    /// An engine-generated `sqlite_autoindex_<table>_<n>` index.
    Autoindex(usize),
    /// An `INTEGER PRIMARY KEY` aliasing the rowid; no index exists.
    RowidAlias,
    /// An explicitly created unique index.
    Index(String),
}

/// A set of columns that must be unique together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueKey {
    /// Key columns, in declared order.
    pub columns: Vec<String>,
    /// What backs the key.
    pub backing: KeyBacking,
}

impl UniqueKey {
    /// Returns the index enforcing this key when the table is called
    /// `table`, or `None` for a rowid alias.
    #[must_use]
    pub fn index_name(&self, table: &str) -> Option<String> {
        match &self.backing {
            KeyBacking::Autoindex(n) => Some(format!("sqlite_autoindex_{table}_{n}")),
            KeyBacking::RowidAlias => None,
            KeyBacking::Index(name) => Some(name.clone()),
        }
    }
}

/// A parsed `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    /// Table name, unquoted.
    pub name: String,
    /// Table name as written.
    pub ident: String,
    /// Statement text from the table name to the end, verbatim.
    pub definition: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnDef>,
    /// Table-level constraints in declaration order.
    pub constraints: Vec<TableConstraint>,
    /// Lower-cased table options (`strict`, `without rowid`), or empty.
    pub options: String,
    /// Comments attached to the table header.
    pub comments: Vec<String>,
    /// Explicit unique indexes declared on this table.
    pub indexes: Vec<UniqueIndexDef>,
}

impl TableDef {
    /// Gets a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Returns true for `WITHOUT ROWID` tables.
    #[must_use]
    pub fn is_without_rowid(&self) -> bool {
        self.options.contains("without rowid")
    }

    /// Returns the unique keys of this table in engine creation order:
    /// column-level keys in column order, then table-level constraints, then
    /// explicit unique indexes. A column set is listed once.
    #[must_use]
    pub fn unique_keys(&self) -> Vec<UniqueKey> {
        let rowid = !self.is_without_rowid();
        let mut keys = UniqueKeys::default();

        for column in &self.columns {
            if column.primary_key {
                let alias = rowid && column.is_integer_type();
                keys.push(vec![column.name.clone()], alias);
            }
            if column.unique {
                keys.push(vec![column.name.clone()], false);
            }
        }
        for constraint in &self.constraints {
            match &constraint.kind {
                ConstraintKind::PrimaryKey { columns } => {
                    let alias = rowid
                        && columns.len() == 1
                        && self
                            .column(&columns[0])
                            .is_some_and(ColumnDef::is_integer_type);
                    keys.push(columns.clone(), alias);
                }
                ConstraintKind::Unique { columns } => keys.push(columns.clone(), false),
                ConstraintKind::ForeignKey { .. } | ConstraintKind::Check => {}
            }
        }
        for index in &self.indexes {
            keys.push_index(index);
        }

        keys.keys
    }

    /// Returns the foreign keys of this table, inline ones first.
    #[must_use]
    pub fn foreign_keys(&self) -> Vec<ForeignKey> {
        let inline = self.columns.iter().filter_map(|column| {
            column
                .references
                .as_ref()
                .map(|clause| ForeignKey::new(&self.name, vec![column.name.clone()], clause))
        });
        let table_level = self.constraints.iter().filter_map(|constraint| {
            match &constraint.kind {
                ConstraintKind::ForeignKey {
                    columns,
                    references,
                } => Some(ForeignKey::new(&self.name, columns.clone(), references)),
                _ => None,
            }
        });
        inline.chain(table_level).collect()
    }
}

/// Accumulates unique keys, numbering autoindexes the way the engine does:
/// a key whose columns duplicate an earlier key creates no index and uses no
/// number.
#[derive(Default)]
struct UniqueKeys {
    keys: Vec<UniqueKey>,
    autoindexes: usize,
}

impl UniqueKeys {
    fn contains(&self, columns: &[String]) -> bool {
        self.keys.iter().any(|k| same_names(&k.columns, columns))
    }

    fn push(&mut self, columns: Vec<String>, rowid_alias: bool) {
        if self.contains(&columns) {
            return;
        }
        let backing = if rowid_alias {
            KeyBacking::RowidAlias
        } else {
            self.autoindexes += 1;
            KeyBacking::Autoindex(self.autoindexes)
        };
        self.keys.push(UniqueKey { columns, backing });
    }

    fn push_index(&mut self, index: &UniqueIndexDef) {
        if !self.contains(&index.columns) {
            self.keys.push(UniqueKey {
                columns: index.columns.clone(),
                backing: KeyBacking::Index(index.name.clone()),
            });
        }
    }
}

/// A `CREATE VIEW` statement, captured verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDef {
    /// View name, unquoted.
    pub name: String,
    /// Statement text from the view name to the end, verbatim, including a
    /// comment placed directly after the name.
    pub definition: String,
    /// Token-normalised definition used to detect changes.
    pub normalized: String,
    /// Comments attached directly after the view name.
    pub comments: Vec<String>,
}

/// The complete declared schema: tables and views in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// All tables.
    pub tables: Vec<TableDef>,
    /// All views.
    pub views: Vec<ViewDef>,
}

impl Schema {
    /// Creates a new empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Gets a view by name.
    #[must_use]
    pub fn view(&self, name: &str) -> Option<&ViewDef> {
        self.views.iter().find(|v| v.name.eq_ignore_ascii_case(name))
    }

    /// Returns table names in declaration order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }
}
