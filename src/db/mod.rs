//! Postgres-backed persistence layer. The database is the authoritative
//! store; uniqueness constraints enforce the orchestrator's invariants
//! (one active logging session per (user, chat), one redirect per listener).

pub mod listeners;
pub mod messages;
pub mod sessions;
pub mod users;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::Result;

/// Open the pool and bring the schema up to date. Migration files are
/// embedded at compile time and applied in order.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| crate::error::OrchestratorError::Internal(format!("migration failed: {e}")))?;

    let version = schema_version(&pool).await?;
    tracing::info!(schema_version = %version, "database ready");
    Ok(pool)
}

pub async fn schema_version(pool: &PgPool) -> Result<String> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT value FROM db_info WHERE key = 'schema_version'")
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(v,)| v).unwrap_or_else(|| "0".to_string()))
}
