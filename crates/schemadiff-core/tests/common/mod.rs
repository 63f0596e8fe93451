#![allow(dead_code)]

use schemadiff_core::diff_schemas;
use schemadiff_core::error::SchemaError;

pub fn diff(old: &str, new: &str) -> Vec<String> {
    diff_schemas(old, new)
        .unwrap_or_else(|e| panic!("Failed to diff:\n{old}\n---\n{new}\nError: {e}"))
}

pub fn diff_err(old: &str, new: &str) -> SchemaError {
    diff_schemas(old, new).expect_err(&format!("Expected diff error for:\n{old}\n---\n{new}"))
}

/// Asserts that a schema diffed against itself yields nothing.
pub fn assert_idempotent(sql: &str) {
    let statements = diff(sql, sql);
    assert!(
        statements.is_empty(),
        "Expected no statements for:\n{sql}\nGot: {statements:#?}"
    );
}
