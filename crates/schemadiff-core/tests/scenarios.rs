//! End-to-end diff scenarios: two schema scripts in, statements out.

mod common;

use common::{assert_idempotent, diff, diff_err};
use schemadiff_core::error::SchemaError;

// =============================================================================
// Tables
// =============================================================================

#[test]
fn add_table() {
    assert_eq!(
        diff(
            "create table tbl1 (a text)",
            "create table tbl1 (a text);
             create table tbl2 (b text);",
        ),
        vec!["CREATE TABLE tbl2 (b text)"]
    );
}

#[test]
fn add_table_keeps_source_formatting() {
    assert_eq!(
        diff(
            "",
            "create table t (
               id integer primary key, -- the key
               name text not null
             );",
        ),
        vec![
            "CREATE TABLE t (
               id integer primary key, -- the key
               name text not null
             )"
        ]
    );
}

#[test]
fn drop_table() {
    assert_eq!(
        diff(
            "create table tbl1 (a text);
             create table tbl2 (b text);",
            "create table tbl1 (a text)",
        ),
        vec![r#"DROP TABLE "tbl2""#]
    );
}

#[test]
fn rename_table_comment_inside_body() {
    assert_eq!(
        diff(
            "create table tbl1 (a text)",
            "create table tbl2 (
               -- AKA[tbl1]
               a text
             );",
        ),
        vec![r#"ALTER TABLE "tbl1" RENAME TO "tbl2""#]
    );
}

#[test]
fn rename_table_comment_after_paren() {
    assert_eq!(
        diff(
            "create table tbl1 (a text)",
            "create table tbl2 ( -- AKA[tbl1]
               a text
             );",
        ),
        vec![r#"ALTER TABLE "tbl1" RENAME TO "tbl2""#]
    );
}

#[test]
fn rename_table_without_annotation_is_drop_and_create() {
    assert_eq!(
        diff("create table tbl1 (a text)", "create table tbl2 (a text)"),
        vec![r#"DROP TABLE "tbl1""#, "CREATE TABLE tbl2 (a text)"]
    );
}

// =============================================================================
// Columns
// =============================================================================

#[test]
fn add_column() {
    assert_eq!(
        diff("create table tbl (a text)", "create table tbl (a text, b text)"),
        vec![r#"ALTER TABLE "tbl" ADD COLUMN b text"#]
    );
}

#[test]
fn add_primary_key_column() {
    assert_eq!(
        diff(
            "create table tbl (a text)",
            "create table tbl (a text, b int PRIMARY KEY)",
        ),
        vec![
            r#"ALTER TABLE "tbl" ADD COLUMN b int"#,
            r#"CREATE UNIQUE INDEX unique_index_1 ON tbl("b")"#,
        ]
    );
}

#[test]
fn add_column_to_renamed_table() {
    assert_eq!(
        diff(
            "create table x (a text)",
            "create table y (
               -- aka[x]
               a text, b text
             )",
        ),
        vec![
            r#"ALTER TABLE "x" RENAME TO "y""#,
            r#"ALTER TABLE "y" ADD COLUMN b text"#,
        ]
    );
}

#[test]
fn drop_column_from_renamed_table() {
    assert_eq!(
        diff(
            "create table x (a text, b text)",
            "create table y (
               -- aka[x]
               a text
             )",
        ),
        vec![
            r#"ALTER TABLE "x" RENAME TO "y""#,
            r#"ALTER TABLE "y" DROP COLUMN b"#,
        ]
    );
}

#[test]
fn drop_column() {
    assert_eq!(
        diff("create table tbl (a text, b text)", "create table tbl (a text)"),
        vec![r#"ALTER TABLE "tbl" DROP COLUMN b"#]
    );
}

#[test]
fn rename_column() {
    assert_eq!(
        diff(
            "create table tbl (a text)",
            "create table tbl (
               b text -- AKA[a]
             )",
        ),
        vec![r#"ALTER TABLE "tbl" RENAME COLUMN "a" TO "b""#]
    );
}

#[test]
fn rename_two_columns_with_mixed_case_annotations() {
    assert_eq!(
        diff(
            "create table tbl (a text, b text)",
            "create table tbl ( -- AkA[g]\r\n  x text, -- AKA[a]\r\n  y text -- aka[b]\r\n)",
        ),
        vec![
            r#"ALTER TABLE "tbl" RENAME COLUMN "a" TO "x""#,
            r#"ALTER TABLE "tbl" RENAME COLUMN "b" TO "y""#,
        ]
    );
}

#[test]
fn rename_table_and_column() {
    assert_eq!(
        diff(
            "create table x (a text)",
            "create table y ( -- AKA[x]
               b text -- AKA[a]
             )",
        ),
        vec![
            r#"ALTER TABLE "x" RENAME TO "y""#,
            r#"ALTER TABLE "y" RENAME COLUMN "a" TO "b""#,
        ]
    );
}

#[test]
fn rename_with_irregular_spacing() {
    assert_eq!(
        diff(
            "create table tbl (a text)",
            "create table tbl (
               b text -- AKA[ a , b, c]
             )",
        ),
        vec![r#"ALTER TABLE "tbl" RENAME COLUMN "a" TO "b""#]
    );
}

#[test]
fn drop_then_rename_into_freed_name() {
    assert_eq!(
        diff(
            "create table tbl (a text, b text)",
            "create table tbl (b text -- aka[a]\n)",
        ),
        vec![
            r#"ALTER TABLE "tbl" DROP COLUMN b"#,
            r#"ALTER TABLE "tbl" RENAME COLUMN "a" TO "b""#,
        ]
    );
}

// =============================================================================
// Ambiguous renames
// =============================================================================

#[test]
fn ambiguous_column_rename() {
    let err = diff_err(
        "create table tbl (a text, b text)",
        "create table tbl (
           c text -- AKA[a,b]
         )",
    );
    assert_eq!(
        err.to_string(),
        "tbl.c's aka list has more than one possible previous name: a,b"
    );
}

#[test]
fn ambiguous_table_rename() {
    let err = diff_err(
        "create table x (a text);
         create table y (a text);",
        "create table z (
           -- aka[x,y]
           a text
         )",
    );
    match err {
        SchemaError::AmbiguousRename { name, candidates } => {
            assert_eq!(name, "z");
            assert_eq!(candidates, vec!["x", "y"]);
        }
        other => panic!("Expected AmbiguousRename, got {other:?}"),
    }
}

#[test]
fn ambiguity_only_counts_existing_names() {
    assert_eq!(
        diff(
            "create table x (a text)",
            "create table z ( -- aka[w, x, v]\n a text)",
        ),
        vec![r#"ALTER TABLE "x" RENAME TO "z""#]
    );
}

// =============================================================================
// Column definition changes
// =============================================================================

#[test]
fn change_column_type() {
    assert_eq!(
        diff(
            "create table tbl (a int);
             insert into tbl values (1);",
            "create table tbl (a text)",
        ),
        vec![
            r#"ALTER TABLE "tbl" RENAME COLUMN "a" TO __schemadiff_tmp__"#,
            r#"ALTER TABLE "tbl" ADD COLUMN a text"#,
            r#"UPDATE "tbl" SET "a" = CAST(__schemadiff_tmp__ AS TEXT)"#,
            r#"ALTER TABLE "tbl" DROP COLUMN __schemadiff_tmp__"#,
        ]
    );
}

#[test]
fn add_not_null() {
    assert_eq!(
        diff(
            "create table tbl (a text, b text);",
            "create table tbl (a text, b text not null)",
        ),
        vec![
            r#"ALTER TABLE "tbl" RENAME COLUMN "b" TO __schemadiff_tmp__"#,
            "-- WARNING: adding a not null column without a default value will fail if there is \
             any data in the table",
            r#"ALTER TABLE "tbl" ADD COLUMN b text not null"#,
            r#"UPDATE "tbl" SET "b" = CAST(__schemadiff_tmp__ AS TEXT)"#,
            r#"ALTER TABLE "tbl" DROP COLUMN __schemadiff_tmp__"#,
        ]
    );
}

#[test]
fn add_not_null_with_default() {
    assert_eq!(
        diff(
            "create table tbl (a text, b text);
             insert into tbl values ('a', null);",
            r#"create table tbl (a text, b text default "woot" not null)"#,
        ),
        vec![
            r#"ALTER TABLE "tbl" RENAME COLUMN "b" TO __schemadiff_tmp__"#,
            r#"ALTER TABLE "tbl" ADD COLUMN b text default "woot" not null"#,
            r#"UPDATE "tbl" SET "b" = COALESCE(CAST(__schemadiff_tmp__ AS TEXT), "woot")"#,
            r#"ALTER TABLE "tbl" DROP COLUMN __schemadiff_tmp__"#,
        ]
    );
}

#[test]
fn rename_and_retype_column() {
    assert_eq!(
        diff(
            "create table tbl (a int)",
            "create table tbl (b real -- aka[a]\n)",
        ),
        vec![
            r#"ALTER TABLE "tbl" RENAME COLUMN "a" TO "b""#,
            r#"ALTER TABLE "tbl" RENAME COLUMN "b" TO __schemadiff_tmp__"#,
            r#"ALTER TABLE "tbl" ADD COLUMN b real"#,
            r#"UPDATE "tbl" SET "b" = CAST(__schemadiff_tmp__ AS REAL)"#,
            r#"ALTER TABLE "tbl" DROP COLUMN __schemadiff_tmp__"#,
        ]
    );
}

#[test]
fn formatting_changes_are_not_alterations() {
    assert!(diff(
        "create table tbl (a VARCHAR(10)   NOT NULL DEFAULT 'x')",
        "create table tbl (\n  a varchar( 10 ) not null default 'x' -- reformatted\n)",
    )
    .is_empty());
}

// =============================================================================
// Views
// =============================================================================

#[test]
fn add_view() {
    assert_eq!(
        diff(
            "create table tbl (a text);",
            "create table tbl (a text);
             create view v as select * from tbl;",
        ),
        vec!["CREATE VIEW v as select * from tbl"]
    );
}

#[test]
fn drop_view() {
    assert_eq!(
        diff(
            "create table tbl (a text);
             create view v as select * from tbl;",
            "create table tbl (a text);",
        ),
        vec![r#"DROP VIEW "v""#]
    );
}

#[test]
fn drop_table_with_view() {
    assert_eq!(
        diff(
            "create table x (a text);
             create table y (b text);
             create view v as select * from y;",
            "create table x (a text);",
        ),
        vec![r#"DROP VIEW "v""#, r#"DROP TABLE "y""#]
    );
}

#[test]
fn changed_view_is_recreated_after_table_changes() {
    assert_eq!(
        diff(
            "create table t (a text);
             create view v as select a from t;",
            "create table t (a text, b text);
             create view v as select a, b from t;",
        ),
        vec![
            r#"DROP VIEW "v""#,
            r#"ALTER TABLE "t" ADD COLUMN b text"#,
            "CREATE VIEW v as select a, b from t",
        ]
    );
}

// =============================================================================
// Unique keys
// =============================================================================

#[test]
fn add_unique() {
    assert_eq!(
        diff("create table tbl (a text)", "create table tbl (a text unique)"),
        vec![r#"CREATE UNIQUE INDEX unique_index_1 ON tbl("a")"#]
    );
}

#[test]
fn add_multi_column_unique() {
    assert_eq!(
        diff(
            "create table tbl (a text, b text)",
            "create table tbl (a text, b text, unique(a,b))",
        ),
        vec![r#"CREATE UNIQUE INDEX unique_index_1 ON tbl("a","b")"#]
    );
}

#[test]
fn add_column_and_multi_column_unique() {
    assert_eq!(
        diff(
            "create table tbl (a text)",
            "create table tbl (a text, b text, unique(a,b))",
        ),
        vec![
            r#"ALTER TABLE "tbl" ADD COLUMN b text"#,
            r#"CREATE UNIQUE INDEX unique_index_1 ON tbl("a","b")"#,
        ]
    );
}

#[test]
fn new_table_with_explicit_unique_index() {
    assert_eq!(
        diff(
            "create table t (a text)",
            "create table t (a text);
             create table n (x text);
             create unique index n_x on n(x);",
        ),
        vec![
            "CREATE TABLE n (x text)",
            r#"CREATE UNIQUE INDEX n_x ON n("x")"#,
        ]
    );
}

#[test]
fn drop_unique() {
    assert_eq!(
        diff("create table tbl (a text unique)", "create table tbl (a text)"),
        vec!["DROP INDEX sqlite_autoindex_tbl_1"]
    );
}

#[test]
fn unique_index_counter_is_shared_across_tables() {
    assert_eq!(
        diff(
            "create table t1 (a text, b text);
             create table t2 (c text, d text);",
            "create table t1 (a text unique, b text, unique(a, b));
             create table t2 (c text, d text unique);",
        ),
        vec![
            r#"CREATE UNIQUE INDEX unique_index_1 ON t1("a")"#,
            r#"CREATE UNIQUE INDEX unique_index_2 ON t1("a","b")"#,
            r#"CREATE UNIQUE INDEX unique_index_3 ON t2("d")"#,
        ]
    );
}

#[test]
fn generated_unique_index_round_trips() {
    // A catalog read back after applying `add_multi_column_unique`.
    let applied = r#"create table tbl (a text, b text);
                     CREATE UNIQUE INDEX unique_index_1 ON tbl("a","b");"#;
    assert!(diff(applied, "create table tbl (a text, b text, unique(a,b))").is_empty());
}

#[test]
fn generated_names_skip_existing_indexes() {
    assert_eq!(
        diff(
            r#"create table tbl (a text, b text);
               CREATE UNIQUE INDEX unique_index_1 ON tbl("a");"#,
            "create table tbl (a text unique, b text unique)",
        ),
        vec![r#"CREATE UNIQUE INDEX unique_index_2 ON tbl("b")"#]
    );
}

#[test]
fn dropping_explicit_unique_index() {
    assert_eq!(
        diff(
            r#"create table tbl (a text);
               CREATE UNIQUE INDEX unique_index_1 ON tbl("a");"#,
            "create table tbl (a text)",
        ),
        vec!["DROP INDEX unique_index_1"]
    );
}

#[test]
fn dropping_rowid_primary_key_is_not_implemented() {
    assert_eq!(
        diff(
            "create table t (id integer primary key, a text)",
            "create table t (id integer, a text)",
        ),
        vec!["-- NOT IMPLEMENTED: drop primary key t(id), it is the rowid"]
    );
}

// =============================================================================
// Foreign keys
// =============================================================================

#[test]
fn added_foreign_key_is_a_comment() {
    assert_eq!(
        diff(
            "create table u (id integer primary key);
             create table p (o int);",
            "create table u (id integer primary key);
             create table p (o int references u(id));",
        ),
        vec![
            "-- NOT IMPLEMENTED: add foreign key from_table=p from_columns=(o) to_table=u \
             to_columns=(id) on_update=NO ACTION on_delete=NO ACTION match=NONE"
        ]
    );
}

#[test]
fn added_column_carries_its_foreign_key() {
    assert_eq!(
        diff(
            "create table u (id integer primary key);
             create table p (id integer primary key);",
            "create table u (id integer primary key);
             create table p (id integer primary key, o int references u(id));",
        ),
        vec![r#"ALTER TABLE "p" ADD COLUMN o int references u(id)"#]
    );
}

#[test]
fn dropped_table_level_foreign_key_is_a_comment() {
    let statements = diff(
        "create table u (id integer primary key);
         create table p (o int, foreign key (o) references u(id) on delete cascade);",
        "create table u (id integer primary key);
         create table p (o int);",
    );
    assert_eq!(statements.len(), 1);
    assert!(statements[0].starts_with("-- NOT IMPLEMENTED: drop foreign key from_table=p"));
    assert!(statements[0].contains("on_delete=CASCADE"));
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn same_schema_yields_nothing() {
    assert_idempotent("create table tbl (a text)");
    assert_idempotent(
        r#"
        /* accounts */
        create table users ( -- aka[accounts]
          id integer primary key autoincrement,
          email text not null unique collate nocase, -- aka[mail]
          created_at text default (datetime('now')),
          check (length(email) > 3)
        ) strict;

        create table posts (
          id integer primary key,
          author int not null references users(id) on delete cascade,
          slug text,
          body blob,
          constraint slug_per_author unique (author, slug)
        );

        create table tags (name text primary key, weight real) without rowid;
        create unique index tag_weight on tags(weight);
        create index posts_by_author on posts(author);

        create view recent as
          select * from posts order by id desc limit 10;

        create trigger touch after insert on posts begin
          update users set email = email where id = new.author;
        end;

        insert into users (email) values ('someone@example.com');
        "#,
    );
}

// =============================================================================
// Identifier case
// =============================================================================

#[test]
fn column_case_change_yields_nothing() {
    assert!(diff("create table t (A text)", "create table t (a text)").is_empty());
}

#[test]
fn table_case_change_keeps_the_table() {
    assert!(diff("create table T (a text)", "create table t (a text)").is_empty());
}

#[test]
fn case_change_with_type_change_alters_in_place() {
    assert_eq!(
        diff("create table T (A int)", "create table t (a text)"),
        vec![
            r#"ALTER TABLE "t" RENAME COLUMN "a" TO __schemadiff_tmp__"#,
            r#"ALTER TABLE "t" ADD COLUMN a text"#,
            r#"UPDATE "t" SET "a" = CAST(__schemadiff_tmp__ AS TEXT)"#,
            r#"ALTER TABLE "t" DROP COLUMN __schemadiff_tmp__"#,
        ]
    );
}

#[test]
fn aka_matches_old_name_ignoring_case() {
    assert_eq!(
        diff("create table t (Old text)", "create table t (new text -- aka[old]\n)"),
        vec![r#"ALTER TABLE "t" RENAME COLUMN "Old" TO "new""#]
    );
}
