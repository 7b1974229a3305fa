//! Repository layer for database operations
//!
//! Each domain file adds prefixed methods (`books_*`, `authors_*`, ...) to
//! [`Repository`], which owns the connection pool and is passed explicitly
//! to every service.

pub mod admins;
pub mod authors;
pub mod books;
pub mod categories;
pub mod members;

use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, QueryBuilder, Sqlite,
};

use crate::{
    config::DatabaseConfig,
    error::{AppError, AppResult},
    models::fold_case,
};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Sqlite>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the SQLite database file from configuration
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    /// Private in-memory database, kept alive on a single connection
    pub async fn in_memory() -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))
    }

    /// Cheap connectivity probe for readiness checks
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Append `column LIKE ? ESCAPE '\'` to a query.
///
/// `column` must be a `*_folded` column (or otherwise caseless, like a phone
/// number) and `pattern` must come from `like_pattern`.
pub(crate) fn push_like(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, pattern: &str) {
    qb.push(format!("{} LIKE ", column))
        .push_bind(pattern.to_string())
        .push(" ESCAPE '\\'");
}

/// Append a parenthesised OR of LIKE matches over several columns.
pub(crate) fn push_like_any(qb: &mut QueryBuilder<'_, Sqlite>, columns: &[&str], pattern: &str) {
    qb.push("(");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        push_like(qb, column, pattern);
    }
    qb.push(")");
}

/// Optional text column value for an update: blank clears the column.
pub(crate) fn blank_to_null(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Folded shadow value for an optional text column.
pub(crate) fn folded_opt(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(fold_case)
}
