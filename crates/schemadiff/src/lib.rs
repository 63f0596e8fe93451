//! Diff and apply declarative SQLite schemas.
//!
//! Builds on [`schemadiff_core`] with everything that touches the outside
//! world: reading schemas from files and databases ([`source`]) and running
//! the generated statements ([`executor`]).
//!
//! ```rust,no_run
//! # async fn run() -> schemadiff::error::Result<()> {
//! let statements = schemadiff::diff(
//!     "app.db",
//!     "create table users (id integer primary key, name text)",
//!     true,
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod executor;
pub mod source;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use schemadiff_core::diff_schemas;

use crate::error::Result;
use crate::executor::StatementExecutor;
use crate::source::SchemaSource;

/// Computes the statements that migrate `old` to `new`, optionally applying
/// them to `old`.
///
/// Each argument is a schema script, a path to a `.sql` file, or a path to
/// an SQLite database. With `apply`, a database is modified in place; a
/// script is loaded into a throwaway in-memory database first, which checks
/// that the statements run.
///
/// # Errors
///
/// Returns an error if a schema cannot be loaded or parsed, if renames are
/// ambiguous, or if a statement fails while applying. Statements that ran
/// before a failure are not rolled back.
pub async fn diff(old: &str, new: &str, apply: bool) -> Result<Vec<String>> {
    let old_source = SchemaSource::detect(old).await?;
    let new_source = SchemaSource::detect(new).await?;

    let statements = diff_schemas(&old_source.load().await?, &new_source.load().await?)?;
    info!(statements = statements.len(), "Computed schema diff");

    if apply && !statements.is_empty() {
        let pool = old_source.connect().await?;
        let executed = StatementExecutor::new(pool.clone())
            .execute(&statements)
            .await;
        pool.close().await;
        executed?;
    }

    Ok(statements)
}

/// Outcome of a diff, as reported by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    /// Generated statements and comments, in execution order.
    pub statements: Vec<String>,
    /// Whether the statements were executed against the old schema.
    pub applied: bool,
}

impl DiffReport {
    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if JSON encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::diff;
    pub use crate::error::{DiffError, Result};
    pub use crate::executor::StatementExecutor;
    pub use crate::source::{read_catalog, SchemaSource};
    pub use crate::DiffReport;
    pub use schemadiff_core::prelude::*;
}
