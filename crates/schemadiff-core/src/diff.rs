//! Computing the changes between two schemas.
//!
//! Identity is resolved in full first ([`IdentityMap::resolve`]); the diff
//! then only reads the two schemas and the map.

use tracing::debug;

use crate::change::{Change, SchemaDiff};
use crate::error::Result;
use crate::rename::IdentityMap;
use crate::schema::{same_names, KeyBacking, Schema, TableDef};

/// Compares an old schema with a new one.
#[derive(Debug)]
pub struct SchemaDiffer<'a> {
    old: &'a Schema,
    new: &'a Schema,
    identity: IdentityMap,
}

impl<'a> SchemaDiffer<'a> {
    /// Resolves renames between `old` and `new`.
    ///
    /// # Errors
    ///
    /// Fails on ambiguous or conflicting rename annotations, before any
    /// change is computed.
    pub fn new(old: &'a Schema, new: &'a Schema) -> Result<Self> {
        let identity = IdentityMap::resolve(old, new)?;
        Ok(Self { old, new, identity })
    }

    /// Computes all changes, in discovery order.
    #[must_use]
    pub fn changes(&self) -> SchemaDiff {
        let mut changes = Vec::new();

        for new_table in &self.new.tables {
            let old_table = self
                .identity
                .old_table_for(&new_table.name)
                .and_then(|name| self.old.table(name));
            match old_table {
                None => {
                    changes.push(Change::CreateTable {
                        name: new_table.name.clone(),
                        definition: new_table.definition.clone(),
                    });
                    // Autoindexes come with the table; explicit indexes do not.
                    for index in &new_table.indexes {
                        changes.push(Change::AddUniqueIndex {
                            table: new_table.name.clone(),
                            table_ident: new_table.ident.clone(),
                            columns: index.columns.clone(),
                            name: Some(index.name.clone()),
                        });
                    }
                }
                Some(old_table) => {
                    if !old_table.name.eq_ignore_ascii_case(&new_table.name) {
                        changes.push(Change::RenameTable {
                            old_name: old_table.name.clone(),
                            new_name: new_table.name.clone(),
                        });
                    }
                    self.diff_columns(old_table, new_table, &mut changes);
                    self.diff_unique_keys(old_table, new_table, &mut changes);
                    self.diff_foreign_keys(old_table, new_table, &mut changes);
                }
            }
        }

        for old_table in &self.old.tables {
            if self.identity.new_table_for(&old_table.name).is_none() {
                changes.push(Change::DropTable {
                    name: old_table.name.clone(),
                });
            }
        }

        self.diff_views(&mut changes);

        for change in &changes {
            debug!(change = %change.describe(), "Detected change");
        }

        SchemaDiff {
            changes,
            reserved_index_names: self
                .old
                .tables
                .iter()
                .chain(&self.new.tables)
                .flat_map(|t| &t.indexes)
                .map(|index| index.name.clone())
                .collect(),
        }
    }

    fn diff_columns(&self, old_table: &TableDef, new_table: &TableDef, changes: &mut Vec<Change>) {
        let table = &new_table.name;

        for new_column in &new_table.columns {
            let old_column = self
                .identity
                .old_column_for(table, &new_column.name)
                .and_then(|name| old_table.column(name));
            let Some(old_column) = old_column else {
                changes.push(Change::AddColumn {
                    table: table.clone(),
                    column: new_column.name.clone(),
                    definition: new_column.addable.clone(),
                });
                continue;
            };
            if !old_column.name.eq_ignore_ascii_case(&new_column.name) {
                changes.push(Change::RenameColumn {
                    table: table.clone(),
                    old_name: old_column.name.clone(),
                    new_name: new_column.name.clone(),
                });
            }
            if old_column.normalized != new_column.normalized {
                changes.push(Change::AlterColumn {
                    table: table.clone(),
                    column: new_column.name.clone(),
                    old: Box::new(old_column.clone()),
                    new: Box::new(new_column.clone()),
                });
            }
        }

        for old_column in &old_table.columns {
            if self
                .identity
                .new_column_for(&old_table.name, &old_column.name)
                .is_none()
            {
                changes.push(Change::DropColumn {
                    table: table.clone(),
                    column: old_column.name.clone(),
                    ident: old_column.ident.clone(),
                });
            }
        }
    }

    /// Compares unique keys as column tuples, with old column names carried
    /// through renames.
    fn diff_unique_keys(
        &self,
        old_table: &TableDef,
        new_table: &TableDef,
        changes: &mut Vec<Change>,
    ) {
        let old_keys: Vec<(Vec<String>, _)> = old_table
            .unique_keys()
            .into_iter()
            .map(|key| {
                let renamed = key
                    .columns
                    .iter()
                    .map(|c| {
                        self.identity
                            .new_column_for(&old_table.name, c)
                            .unwrap_or(c)
                            .to_string()
                    })
                    .collect();
                (renamed, key)
            })
            .collect();
        let new_keys = new_table.unique_keys();

        for (renamed, key) in &old_keys {
            if !new_keys.iter().any(|k| same_names(&k.columns, renamed)) {
                changes.push(Change::DropUniqueIndex {
                    table: new_table.name.clone(),
                    columns: key.columns.clone(),
                    index: key.index_name(&new_table.name),
                });
            }
        }

        for key in &new_keys {
            if !old_keys
                .iter()
                .any(|(renamed, _)| same_names(renamed, &key.columns))
            {
                let name = match &key.backing {
                    KeyBacking::Index(name) => Some(name.clone()),
                    KeyBacking::Autoindex(_) | KeyBacking::RowidAlias => None,
                };
                changes.push(Change::AddUniqueIndex {
                    table: new_table.name.clone(),
                    table_ident: new_table.ident.clone(),
                    columns: key.columns.clone(),
                    name,
                });
            }
        }
    }

    /// Compares foreign keys after translating the old ones to new names.
    ///
    /// An inline `references` on an added column is created by its
    /// `ADD COLUMN`, so it is not reported.
    fn diff_foreign_keys(
        &self,
        old_table: &TableDef,
        new_table: &TableDef,
        changes: &mut Vec<Change>,
    ) {
        let old_fks: Vec<_> = old_table
            .foreign_keys()
            .into_iter()
            .map(|fk| (self.identity.translate_foreign_key(&fk), fk))
            .collect();
        let new_fks = new_table.foreign_keys();

        for (translated, fk) in &old_fks {
            if !new_fks.iter().any(|fk| fk.matches(translated)) {
                changes.push(Change::DropForeignKey {
                    table: new_table.name.clone(),
                    foreign_key: fk.clone(),
                });
            }
        }
        let added_inline = |column: &String| {
            self.identity
                .old_column_for(&new_table.name, column)
                .and_then(|name| old_table.column(name))
                .is_none()
                && new_table
                    .column(column)
                    .is_some_and(|c| c.references.is_some())
        };
        for fk in &new_fks {
            if fk.from_columns.iter().all(added_inline) {
                continue;
            }
            if !old_fks.iter().any(|(translated, _)| translated.matches(fk)) {
                changes.push(Change::AddForeignKey {
                    table: new_table.name.clone(),
                    foreign_key: fk.clone(),
                });
            }
        }
    }

    /// Views match by name only. A changed view is dropped and recreated.
    fn diff_views(&self, changes: &mut Vec<Change>) {
        for new_view in &self.new.views {
            match self.old.view(&new_view.name) {
                Some(old_view) if old_view.normalized == new_view.normalized => {}
                Some(old_view) => {
                    changes.push(Change::DropView {
                        name: old_view.name.clone(),
                    });
                    changes.push(Change::CreateView {
                        name: new_view.name.clone(),
                        definition: new_view.definition.clone(),
                    });
                }
                None => changes.push(Change::CreateView {
                    name: new_view.name.clone(),
                    definition: new_view.definition.clone(),
                }),
            }
        }
        for old_view in &self.old.views {
            if self.new.view(&old_view.name).is_none() {
                changes.push(Change::DropView {
                    name: old_view.name.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(old: &str, new: &str) -> Vec<Change> {
        let old = Schema::parse(old).unwrap();
        let new = Schema::parse(new).unwrap();
        SchemaDiffer::new(&old, &new).unwrap().changes().changes
    }

    #[test]
    fn test_identical_schemas() {
        let sql = "create table t (id integer primary key, a text unique, b int references t(id));\
                   create view v as select a from t;";
        assert!(diff(sql, sql).is_empty());
    }

    #[test]
    fn test_whitespace_and_case_are_not_changes() {
        let changes = diff(
            "create table t (a TEXT  NOT NULL default 'x')",
            "create table t (\n  a text not null DEFAULT 'x'\n)",
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn test_rename_then_alter() {
        let changes = diff(
            "create table t (a int)",
            "create table t (b text -- aka[a]\n)",
        );
        assert_eq!(changes.len(), 2);
        assert!(matches!(&changes[0], Change::RenameColumn { old_name, new_name, .. }
            if old_name == "a" && new_name == "b"));
        assert!(matches!(&changes[1], Change::AlterColumn { column, .. } if column == "b"));
    }

    #[test]
    fn test_dropped_columns_follow_old_order() {
        let changes = diff("create table t (a text, b text, c text)", "create table t (b text)");
        let dropped: Vec<&str> = changes
            .iter()
            .filter_map(|c| match c {
                Change::DropColumn { column, .. } => Some(column.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(dropped, vec!["a", "c"]);
    }

    #[test]
    fn test_unique_key_survives_column_rename() {
        let changes = diff(
            "create table t (a text unique)",
            "create table t (b text unique -- aka[a]\n)",
        );
        assert_eq!(changes.len(), 1);
        assert!(matches!(changes[0], Change::RenameColumn { .. }));
    }

    #[test]
    fn test_dropped_key_names_autoindex_under_new_table_name() {
        let changes = diff(
            "create table x (a text, b text unique, unique(a, b))",
            "create table y ( -- aka[x]\n a text, b text unique)",
        );
        assert_eq!(
            changes[1],
            Change::DropUniqueIndex {
                table: "y".into(),
                columns: vec!["a".into(), "b".into()],
                index: Some("sqlite_autoindex_y_2".into()),
            }
        );
    }

    #[test]
    fn test_foreign_key_changes() {
        let changes = diff(
            "create table u (id integer primary key); create table p (o int references u(id))",
            "create table u (id integer primary key); \
             create table p (o int references u(id) on delete cascade)",
        );
        assert_eq!(changes.len(), 2);
        assert!(matches!(changes[0], Change::DropForeignKey { .. }));
        assert!(matches!(changes[1], Change::AddForeignKey { .. }));
    }

    #[test]
    fn test_foreign_keys_follow_renames() {
        let changes = diff(
            "create table u (id integer primary key); create table p (o int references u(id))",
            "create table w ( -- aka[u]\n id integer primary key);\
             create table p (o int references w(id))",
        );
        assert_eq!(
            changes,
            vec![Change::RenameTable {
                old_name: "u".into(),
                new_name: "w".into(),
            }]
        );
    }

    #[test]
    fn test_new_table_keeps_explicit_unique_index() {
        let changes = diff(
            "create table t (a text)",
            "create table t (a text); create table n (x text); create unique index n_x on n(x)",
        );
        assert_eq!(changes.len(), 2);
        assert!(matches!(changes[0], Change::CreateTable { .. }));
        assert_eq!(
            changes[1],
            Change::AddUniqueIndex {
                table: "n".into(),
                table_ident: "n".into(),
                columns: vec!["x".into()],
                name: Some("n_x".into()),
            }
        );
    }

    #[test]
    fn test_names_ignore_case() {
        assert!(diff("create table T (A text unique)", "create table t (a text unique)").is_empty());
        assert!(diff(
            "create table t (a text); create unique index i on T(A)",
            "create table t (a text); create unique index i on t(a)",
        )
        .is_empty());
    }

    #[test]
    fn test_inline_reference_of_added_column_is_not_reported() {
        let changes = diff(
            "create table u (id integer primary key); create table p (id integer primary key)",
            "create table u (id integer primary key); \
             create table p (id integer primary key, o int references u(id))",
        );
        assert_eq!(changes.len(), 1);
        assert!(matches!(&changes[0], Change::AddColumn { column, .. } if column == "o"));
    }

    #[test]
    fn test_table_level_reference_of_added_column_is_reported() {
        let changes = diff(
            "create table u (id integer primary key); create table p (id integer primary key)",
            "create table u (id integer primary key); \
             create table p (id integer primary key, o int, foreign key (o) references u(id))",
        );
        assert_eq!(changes.len(), 2);
        assert!(matches!(changes[1], Change::AddForeignKey { .. }));
    }

    #[test]
    fn test_changed_view_is_dropped_and_created() {
        let changes = diff(
            "create table t (a text, b text); create view v as select a from t",
            "create table t (a text, b text); create view v as select b from t",
        );
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0], Change::DropView { name: "v".into() });
        assert!(matches!(&changes[1], Change::CreateView { definition, .. }
            if definition == "v as select b from t"));
    }

    #[test]
    fn test_reserved_index_names() {
        let old = Schema::parse("create table t (a text); create unique index unique_index_1 on t(a)")
            .unwrap();
        let new = Schema::parse("create table t (a text, b text unique)").unwrap();
        let diff = SchemaDiffer::new(&old, &new).unwrap().changes();
        assert!(diff.reserved_index_names.contains("unique_index_1"));
    }
}
