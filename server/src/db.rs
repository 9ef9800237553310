use anyhow::{anyhow, Context};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Build the connection pool and apply any pending migrations.
pub fn create_pool(database_url: &str, max_size: u32) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(max_size)
        .build(manager)
        .context("Failed to create database pool")?;

    let mut conn = pool
        .get()
        .context("Failed to get DB connection for migrations")?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run database migrations: {e}"))?;
    if !applied.is_empty() {
        tracing::info!(count = applied.len(), "applied database migrations");
    }

    Ok(pool)
}

/// Check a connection out of the pool, or bail out of the handler with a 500.
#[macro_export]
macro_rules! get_conn {
    ($pool:expr) => {
        match $pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!("Failed to get DB connection: {}", e);
                return Err($crate::error::ApiError::Internal(
                    "Database connection failed",
                ));
            }
        }
    };
}
