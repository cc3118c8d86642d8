use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

pub fn build_pool(config: &AppConfig, database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.db_pool_max_connections)
        .min_connections(config.db_pool_min_connections)
        .acquire_timeout(Duration::from_secs(config.db_pool_acquire_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.db_pool_idle_timeout_seconds))
        .connect_lazy(database_url)
}

/// Create the resident and bill tables if they do not exist. Bill identity
/// is the composite primary key (resident_id, month, year), so a month can
/// only ever hold one bill per resident and writes are upserts.
pub async fn ensure_schema(pool: &PgPool) -> AppResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS residents (
             id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
             name TEXT NOT NULL,
             room TEXT NOT NULL,
             phone TEXT NOT NULL,
             email TEXT,
             join_date TEXT NOT NULL,
             created_at TIMESTAMPTZ NOT NULL DEFAULT now()
         )",
    )
    .execute(pool)
    .await
    .map_err(map_db_error)?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS bills (
             resident_id UUID NOT NULL REFERENCES residents(id) ON DELETE CASCADE,
             month TEXT NOT NULL,
             year INT NOT NULL,
             rent DOUBLE PRECISION NOT NULL DEFAULT 0,
             electricity DOUBLE PRECISION NOT NULL DEFAULT 0,
             food DOUBLE PRECISION NOT NULL DEFAULT 0,
             other DOUBLE PRECISION NOT NULL DEFAULT 0,
             paid_amount DOUBLE PRECISION NOT NULL DEFAULT 0,
             due_date TEXT NOT NULL,
             paid_date TEXT,
             created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
             PRIMARY KEY (resident_id, month, year)
         )",
    )
    .execute(pool)
    .await
    .map_err(map_db_error)?;

    Ok(())
}

pub fn map_db_error(error: sqlx::Error) -> AppError {
    let message = error.to_string();
    tracing::error!(db_error = %message, "Database query failed");

    if message.contains("23505")
        || message
            .to_ascii_lowercase()
            .contains("duplicate key value violates unique constraint")
    {
        return AppError::Conflict("Duplicate value violates a unique constraint.".to_string());
    }
    AppError::Dependency("Database operation failed.".to_string())
}
