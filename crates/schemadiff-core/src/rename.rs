//! Rename resolution across two schemas.
//!
//! A table or column of the new schema may name its previous name(s) with an
//! `aka[...]` comment:
//!
//! ```sql
//! create table users ( -- aka[accounts]
//!     email text -- aka[mail, e_mail]
//! );
//! ```
//!
//! [`IdentityMap::resolve`] links every new entity to at most one old
//! entity. Annotations are resolved first, then entities left unlinked are
//! matched by identical name. Columns are resolved after all tables, inside
//! each linked table pair, so a renamed table's columns are looked up under
//! the old table name.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::schema::{ForeignKey, Schema, TableDef};

static AKA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)aka\[([^\]]*)\]").expect("aka pattern is valid"));

/// Returns the names listed in every `aka[...]` annotation of `comments`, in
/// declared order, without duplicates.
#[must_use]
pub fn aka_names(comments: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for comment in comments {
        for captures in AKA.captures_iter(comment) {
            for name in captures[1].split(',').map(str::trim) {
                if !name.is_empty() && !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
    }
    names
}

/// One-to-one links between old and new names, in both directions. Keys
/// are lower-cased: SQLite identifiers ignore ASCII case.
#[derive(Debug, Default)]
struct Links {
    by_new: BTreeMap<String, String>,
    by_old: BTreeMap<String, String>,
}

fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl Links {
    fn link(&mut self, old: &str, new: &str) {
        self.by_new.insert(key(new), old.to_string());
        self.by_old.insert(key(old), new.to_string());
    }

    fn old_for(&self, new: &str) -> Option<&str> {
        self.by_new.get(&key(new)).map(String::as_str)
    }

    fn new_for(&self, old: &str) -> Option<&str> {
        self.by_old.get(&key(old)).map(String::as_str)
    }

    /// Links names of `new_names` to names of `old_names`: annotations first,
    /// then identical names. `qualify` renders a name for error messages.
    fn resolve<'a>(
        old_names: &[&str],
        new_entities: impl Iterator<Item = (&'a str, &'a [String])> + Clone,
        qualify: impl Fn(&str) -> String,
    ) -> Result<Self> {
        let find_old = |name: &str| {
            old_names
                .iter()
                .copied()
                .find(|old| old.eq_ignore_ascii_case(name))
        };
        let mut links = Self::default();

        for (new, comments) in new_entities.clone() {
            let mut candidates: Vec<&str> = Vec::new();
            for name in aka_names(comments) {
                if let Some(old) = find_old(&name) {
                    if !candidates.contains(&old) {
                        candidates.push(old);
                    }
                }
            }
            match candidates.as_slice() {
                [] => {}
                [old] => {
                    if let Some(first) = links.new_for(old) {
                        return Err(SchemaError::ConflictingRename {
                            previous: qualify(old),
                            first: qualify(first),
                            second: qualify(new),
                        });
                    }
                    debug!(old = %qualify(old), new = %qualify(new), "Linked by aka annotation");
                    links.link(old, new);
                }
                _ => {
                    return Err(SchemaError::AmbiguousRename {
                        name: qualify(new),
                        candidates: candidates.iter().map(ToString::to_string).collect(),
                    })
                }
            }
        }

        for (new, _) in new_entities {
            if links.old_for(new).is_some() {
                continue;
            }
            if let Some(old) = find_old(new) {
                if links.new_for(old).is_none() {
                    links.link(old, new);
                }
            }
        }

        Ok(links)
    }
}

/// The resolved identity of tables and columns between two schemas.
#[derive(Debug, Default)]
pub struct IdentityMap {
    tables: Links,
    /// Column links keyed by the lower-cased new table name.
    columns: BTreeMap<String, Links>,
}

impl IdentityMap {
    /// Resolves the identity of every table and column of `new` against
    /// `old`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::AmbiguousRename`] if an annotation matches more
    /// than one old name, or [`SchemaError::ConflictingRename`] if two new
    /// entities claim the same old one.
    pub fn resolve(old: &Schema, new: &Schema) -> Result<Self> {
        let old_tables: Vec<&str> = old.table_names().collect();
        let tables = Links::resolve(
            &old_tables,
            new.tables
                .iter()
                .map(|t| (t.name.as_str(), t.comments.as_slice())),
            str::to_string,
        )?;

        let mut columns = BTreeMap::new();
        for new_table in &new.tables {
            let Some(old_table) = tables.old_for(&new_table.name).and_then(|name| old.table(name))
            else {
                continue;
            };
            let links = Self::resolve_columns(old_table, new_table)?;
            columns.insert(key(&new_table.name), links);
        }

        Ok(Self { tables, columns })
    }

    fn resolve_columns(old_table: &TableDef, new_table: &TableDef) -> Result<Links> {
        let old_columns: Vec<&str> = old_table.columns.iter().map(|c| c.name.as_str()).collect();
        Links::resolve(
            &old_columns,
            new_table
                .columns
                .iter()
                .map(|c| (c.name.as_str(), c.comments.as_slice())),
            |column| format!("{}.{column}", new_table.name),
        )
    }

    /// Returns the old name of the new table `table`, if it has one.
    #[must_use]
    pub fn old_table_for(&self, table: &str) -> Option<&str> {
        self.tables.old_for(table)
    }

    /// Returns the new name of the old table `table`, if it survives.
    #[must_use]
    pub fn new_table_for(&self, table: &str) -> Option<&str> {
        self.tables.new_for(table)
    }

    /// Returns the old name of `column` of the new table `table`.
    #[must_use]
    pub fn old_column_for(&self, table: &str, column: &str) -> Option<&str> {
        self.columns.get(&key(table))?.old_for(column)
    }

    /// Returns the new name of `column` of the old table `table`.
    #[must_use]
    pub fn new_column_for(&self, table: &str, column: &str) -> Option<&str> {
        let new_table = self.new_table_for(table)?;
        self.columns.get(&key(new_table))?.new_for(column)
    }

    /// Rewrites a foreign key of the old schema under new names, keeping
    /// names that have no counterpart.
    #[must_use]
    pub fn translate_foreign_key(&self, fk: &ForeignKey) -> ForeignKey {
        let columns = |table: &str, columns: &[String]| -> Vec<String> {
            columns
                .iter()
                .map(|c| self.new_column_for(table, c).unwrap_or(c).to_string())
                .collect()
        };
        ForeignKey {
            from_table: self
                .new_table_for(&fk.from_table)
                .unwrap_or(&fk.from_table)
                .to_string(),
            from_columns: columns(&fk.from_table, &fk.from_columns),
            to_table: self
                .new_table_for(&fk.to_table)
                .unwrap_or(&fk.to_table)
                .to_string(),
            to_columns: columns(&fk.to_table, &fk.to_columns),
            ..fk.clone()
        }
    }
}
