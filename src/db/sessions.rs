use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::{OrchestratorError, Result};

/// Worker row lifecycle: creating → running → stopped | error → removed.
pub const STATUS_CREATING: &str = "creating";
pub const STATUS_RUNNING: &str = "running";
pub const STATUS_STOPPED: &str = "stopped";
pub const STATUS_ERROR: &str = "error";
pub const STATUS_REMOVED: &str = "removed";

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct LoggingSession {
    pub id: i32,
    pub user_id: i32,
    pub chat_id: i64,
    pub chat_title: Option<String>,
    pub chat_username: Option<String>,
    pub chat_type: Option<String>,
    pub is_active: bool,
    pub container_name: Option<String>,
    pub container_id: Option<String>,
    pub container_status: String,
    pub messages_logged: i64,
    pub errors_count: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
}

const COLUMNS: &str = "id, user_id, chat_id, chat_title, chat_username, chat_type, is_active, \
     container_name, container_id, container_status, messages_logged, errors_count, last_error, \
     created_at, updated_at, stopped_at";

pub struct NewSession<'a> {
    pub user_id: i32,
    pub chat_id: i64,
    pub chat_title: Option<&'a str>,
    pub chat_username: Option<&'a str>,
    pub chat_type: Option<&'a str>,
    pub container_name: &'a str,
}

/// Reserve a row in `creating` for a new logging worker. Runs in one
/// transaction: any live active row for the same (user, chat) is locked and
/// checked first, so exactly one of two concurrent starters wins; the
/// partial unique index backstops the invariant.
pub async fn reserve(pool: &PgPool, new: NewSession<'_>) -> Result<LoggingSession> {
    let mut tx = pool.begin().await?;

    let existing: Option<(i32,)> = sqlx::query_as(
        "SELECT id FROM logging_sessions
         WHERE user_id = $1 AND chat_id = $2 AND is_active
         FOR UPDATE",
    )
    .bind(new.user_id)
    .bind(new.chat_id)
    .fetch_optional(&mut *tx)
    .await?;
    if existing.is_some() {
        return Err(OrchestratorError::AlreadyActive);
    }

    let session = sqlx::query_as::<_, LoggingSession>(&format!(
        "INSERT INTO logging_sessions
             (user_id, chat_id, chat_title, chat_username, chat_type, container_name, container_status)
         VALUES ($1, $2, $3, $4, $5, $6, 'creating')
         RETURNING {COLUMNS}"
    ))
    .bind(new.user_id)
    .bind(new.chat_id)
    .bind(new.chat_title)
    .bind(new.chat_username)
    .bind(new.chat_type)
    .bind(new.container_name)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => OrchestratorError::AlreadyActive,
        _ => e.into(),
    })?;

    tx.commit().await?;
    Ok(session)
}

/// Launch failed before the container existed: the reservation is rolled
/// back entirely rather than left as an error row.
pub async fn discard_reservation(pool: &PgPool, id: i32) -> Result<()> {
    sqlx::query("DELETE FROM logging_sessions WHERE id = $1 AND container_status = 'creating'")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn mark_running(pool: &PgPool, id: i32, container_id: &str) -> Result<()> {
    sqlx::query(
        "UPDATE logging_sessions SET container_status = 'running', container_id = $2 WHERE id = $1",
    )
    .bind(id)
    .bind(container_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn mark_stopped(pool: &PgPool, id: i32) -> Result<()> {
    sqlx::query(
        "UPDATE logging_sessions
         SET is_active = FALSE, container_status = 'stopped', stopped_at = now()
         WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn mark_error(pool: &PgPool, id: i32, error: &str) -> Result<()> {
    sqlx::query(
        "UPDATE logging_sessions
         SET is_active = FALSE, container_status = 'error',
             errors_count = errors_count + 1, last_error = $2, stopped_at = now()
         WHERE id = $1",
    )
    .bind(id)
    .bind(error)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get(pool: &PgPool, id: i32) -> Result<Option<LoggingSession>> {
    let session = sqlx::query_as::<_, LoggingSession>(&format!(
        "SELECT {COLUMNS} FROM logging_sessions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(session)
}

pub async fn get_owned(pool: &PgPool, id: i32, user_id: i32) -> Result<LoggingSession> {
    get(pool, id)
        .await?
        .filter(|s| s.user_id == user_id)
        .ok_or(OrchestratorError::NotFound("logging session"))
}

pub async fn list_for_user(pool: &PgPool, user_id: i32) -> Result<Vec<LoggingSession>> {
    let sessions = sqlx::query_as::<_, LoggingSession>(&format!(
        "SELECT {COLUMNS} FROM logging_sessions WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(sessions)
}

pub async fn active_for_chat(
    pool: &PgPool,
    user_id: i32,
    chat_id: i64,
) -> Result<Option<LoggingSession>> {
    let session = sqlx::query_as::<_, LoggingSession>(&format!(
        "SELECT {COLUMNS} FROM logging_sessions
         WHERE user_id = $1 AND chat_id = $2 AND is_active"
    ))
    .bind(user_id)
    .bind(chat_id)
    .fetch_optional(pool)
    .await?;
    Ok(session)
}

/// Rows the reaper must cross-check against live containers.
pub async fn list_running(pool: &PgPool) -> Result<Vec<LoggingSession>> {
    let sessions = sqlx::query_as::<_, LoggingSession>(&format!(
        "SELECT {COLUMNS} FROM logging_sessions WHERE container_status = 'running'"
    ))
    .fetch_all(pool)
    .await?;
    Ok(sessions)
}

pub async fn delete(pool: &PgPool, id: i32) -> Result<()> {
    sqlx::query("DELETE FROM logging_sessions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Error rows older than the retention window become `removed`.
pub async fn cleanup_orphaned(pool: &PgPool, older_than_days: i32) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE logging_sessions
         SET container_status = 'removed'
         WHERE container_status = 'error'
           AND stopped_at < now() - make_interval(days => $1)",
    )
    .bind(older_than_days)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
