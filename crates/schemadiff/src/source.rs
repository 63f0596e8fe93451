//! Where a schema comes from: literal text, a `.sql` file or a database.

use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::error::Result;

/// The first bytes of every SQLite database file.
const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// Reads the schema statements of a database, in creation order. Internal
/// objects and indexes without SQL (autoindexes) are left out.
const CATALOG_QUERY: &str = "SELECT sql FROM sqlite_master \
     WHERE sql IS NOT NULL \
       AND type IN ('table', 'view', 'index') \
       AND name NOT LIKE 'sqlite_%' \
     ORDER BY rowid";

/// A schema input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// Schema script given directly.
    Script(String),
    /// A file containing a schema script.
    SqlFile(PathBuf),
    /// An SQLite database whose catalog is the schema.
    Database(PathBuf),
}

impl SchemaSource {
    /// Classifies `input`: an existing file starting with the SQLite header
    /// is a database, any other existing file is a script file, and
    /// anything else is script text.
    ///
    /// # Errors
    ///
    /// Returns an IO error if an existing file cannot be read.
    pub async fn detect(input: &str) -> Result<Self> {
        let path = Path::new(input);
        let is_file = tokio::fs::metadata(path)
            .await
            .is_ok_and(|metadata| metadata.is_file());
        if !is_file {
            return Ok(Self::Script(input.to_string()));
        }

        let mut header = Vec::with_capacity(SQLITE_HEADER.len());
        File::open(path)
            .await?
            .take(SQLITE_HEADER.len() as u64)
            .read_to_end(&mut header)
            .await?;

        if header.as_slice() == SQLITE_HEADER {
            Ok(Self::Database(path.to_path_buf()))
        } else {
            Ok(Self::SqlFile(path.to_path_buf()))
        }
    }

    /// Returns the schema script.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or a database catalog
    /// cannot be queried.
    pub async fn load(&self) -> Result<String> {
        match self {
            Self::Script(sql) => Ok(sql.clone()),
            Self::SqlFile(path) => {
                debug!(path = %path.display(), "Reading schema file");
                Ok(tokio::fs::read_to_string(path).await?)
            }
            Self::Database(path) => {
                debug!(path = %path.display(), "Reading database catalog");
                let pool = open_database(path).await?;
                let sql = read_catalog(&pool).await;
                pool.close().await;
                sql
            }
        }
    }

    /// Opens a connection to apply statements to.
    ///
    /// A database opens that file. A script or script file is loaded into a
    /// fresh in-memory database, data statements included.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the script
    /// cannot be executed.
    pub async fn connect(&self) -> Result<SqlitePool> {
        if let Self::Database(path) = self {
            return open_database(path).await;
        }

        // One connection that never expires: closing it loses the database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let script = self.load().await?;
        sqlx::raw_sql(&script).execute(&pool).await?;
        debug!("Loaded schema into an in-memory database");
        Ok(pool)
    }
}

async fn open_database(path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new().filename(path);
    Ok(SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?)
}

/// Reads the catalog of `pool` as a script.
///
/// # Errors
///
/// Returns an error if the catalog cannot be queried.
pub async fn read_catalog(pool: &SqlitePool) -> Result<String> {
    let statements: Vec<String> = sqlx::query_scalar(CATALOG_QUERY).fetch_all(pool).await?;
    Ok(statements.join(";\n"))
}
