use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Classify a sqlx error, surfacing unique-constraint violations as
    /// [`DatabaseError::Duplicate`].
    pub fn from_sqlx(err: sqlx::Error, key: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return DatabaseError::Duplicate(key.to_string());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

const SCHEMA: [&str; 3] = [
    r#"CREATE TABLE IF NOT EXISTS "records" (
        "id" TEXT PRIMARY KEY,
        "name" TEXT,
        "age" INTEGER,
        "sex" TEXT,
        "address" TEXT,
        "part_no" TEXT,
        "society" TEXT,
        "caste" TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "admins" (
        "id" TEXT PRIMARY KEY,
        "name" TEXT,
        "email" TEXT NOT NULL UNIQUE,
        "password_hash" TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "surveyors" (
        "id" TEXT PRIMARY KEY,
        "password_hash" TEXT NOT NULL
    )"#,
];

/// Connection setup for the PostgreSQL back-end
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool and make sure the collections exist. Any failure here is
    /// fatal to startup.
    pub async fn connect(config: &DatabaseConfig, url: &str) -> Result<PgPool, DatabaseError> {
        let redacted = Self::redact_url(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;
        info!("Connected to database: {}", redacted);

        Self::ensure_schema(&pool).await?;
        Ok(pool)
    }

    pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Connection string with the password masked, for logs.
    pub fn redact_url(url: &str) -> Result<String, DatabaseError> {
        let mut parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if parsed.password().is_some() {
            parsed
                .set_password(Some("****"))
                .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(parsed.into())
    }
}
