use crate::domain::{UserDraft, UserRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqlitePool};
use tracing::info;

pub mod sqlite;

// a user repository is shared between every request handler
// sqlx::Pool is thread safe, so implementations only need to hold the pool
// sqlite specifics live in "sqlite.rs"
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list_users(&self) -> Result<Vec<UserRecord>>;
    async fn get_user(&self, id: i64) -> Result<Option<UserRecord>>;

    // write operations
    async fn create_user(&self, draft: &UserDraft) -> Result<UserRecord>;
    /// Replaces every mutable field. `None` when no user has this id.
    async fn update_user(&self, id: i64, draft: &UserDraft) -> Result<Option<UserRecord>>;
    async fn delete_user(&self, id: i64) -> Result<()>;

    async fn ping(&self) -> Result<()>;
}

/// Opens the pool, creating the database first if needed, and brings the schema up to date.
pub async fn connect_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    // verify db exists
    let exists = Sqlite::database_exists(database_url).await.unwrap_or(false);
    if !exists {
        info!(database_url, "database does not exist, creating");
        Sqlite::create_database(database_url)
            .await
            .with_context(|| format!("Unable to create database at {}", database_url))?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .with_context(|| format!("Failed to create pool on {}", database_url))?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("Failed to ping database")?;
    info!("successfully connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    info!("users table checked/created");

    Ok(pool)
}

/// True when a uniqueness constraint rejected the statement somewhere in this error chain.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .is_some_and(|db_err| db_err.is_unique_violation())
    })
}
