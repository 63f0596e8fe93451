//! Statement executor.
//!
//! Runs generated statements one at a time, in order. The first failure
//! stops the run; statements already executed stay applied.

use sqlx::sqlite::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Executes statements against a database.
pub struct StatementExecutor {
    pool: SqlitePool,
    dry_run: bool,
}

impl StatementExecutor {
    /// Creates a new statement executor.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            dry_run: false,
        }
    }

    /// Enables dry-run mode (SQL is printed but not executed).
    #[must_use]
    pub const fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Returns the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Executes `statements` in order and returns how many were executed.
    /// Comment entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns the database error of the first statement that fails.
    pub async fn execute(&self, statements: &[String]) -> Result<usize> {
        info!(count = statements.len(), "Applying statements");

        let mut executed = 0;
        for sql in statements {
            debug!(sql = %sql, "Executing SQL");

            if self.dry_run {
                println!("{sql};");
                continue;
            }
            if sql.starts_with("--") {
                warn!(comment = %sql, "Skipping comment (unsupported operation)");
                continue;
            }
            sqlx::query(sql).execute(&self.pool).await?;
            executed += 1;
        }

        info!(executed, "Statements applied successfully");
        Ok(executed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiffError;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool")
    }

    async fn table_exists(pool: &SqlitePool, name: &str) -> bool {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name=?")
                .bind(name)
                .fetch_optional(pool)
                .await
                .unwrap();
        row.is_some()
    }

    #[tokio::test]
    async fn test_execute_skips_comments() {
        let executor = StatementExecutor::new(create_test_pool().await);
        let statements = vec![
            "CREATE TABLE t (a text)".to_string(),
            "-- NOT IMPLEMENTED: add foreign key".to_string(),
            "ALTER TABLE \"t\" ADD COLUMN b text".to_string(),
        ];

        let executed = executor.execute(&statements).await.unwrap();
        assert_eq!(executed, 2);
        assert!(table_exists(executor.pool(), "t").await);
    }

    #[tokio::test]
    async fn test_execute_stops_at_first_error() {
        let executor = StatementExecutor::new(create_test_pool().await);
        let statements = vec![
            "CREATE TABLE t (a text unique)".to_string(),
            "DROP INDEX sqlite_autoindex_t_1".to_string(),
            "CREATE TABLE never (a text)".to_string(),
        ];

        let err = executor.execute(&statements).await.unwrap_err();
        assert!(matches!(err, DiffError::Database(_)));
        assert!(err
            .to_string()
            .contains("index associated with UNIQUE or PRIMARY KEY constraint cannot be dropped"));

        // No rollback: the first statement stays applied.
        assert!(table_exists(executor.pool(), "t").await);
        assert!(!table_exists(executor.pool(), "never").await);
    }

    #[tokio::test]
    async fn test_dry_run() {
        let pool = create_test_pool().await;
        let executor = StatementExecutor::new(pool.clone()).dry_run(true);

        let executed = executor
            .execute(&["CREATE TABLE t (a text)".to_string()])
            .await
            .unwrap();
        assert_eq!(executed, 0);

        // Table should NOT exist (dry run)
        assert!(!table_exists(&pool, "t").await);
    }
}
