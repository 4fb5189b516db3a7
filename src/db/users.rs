use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::{OrchestratorError, Result};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub phone: String,
    pub password_hash: String,
    pub api_id: Option<i32>,
    pub api_hash: Option<Vec<u8>>,
    pub telegram_session: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

const USER_COLUMNS: &str =
    "id, phone, password_hash, api_id, api_hash, telegram_session, created_at, last_login, is_active";

pub async fn create(
    pool: &PgPool,
    phone: &str,
    password_hash: &str,
    api_id: i32,
    api_hash_wrapped: &[u8],
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (phone, password_hash, api_id, api_hash)
         VALUES ($1, $2, $3, $4)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(phone)
    .bind(password_hash)
    .bind(api_id)
    .bind(api_hash_wrapped)
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            OrchestratorError::Validation("telefono già registrato".into())
        }
        _ => e.into(),
    })?;
    Ok(user)
}

pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE phone = $1"
    ))
    .bind(phone)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn touch_last_login(pool: &PgPool, id: i32) -> Result<()> {
    sqlx::query("UPDATE users SET last_login = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Persist the wrapped Telegram session blob after a successful sign-in.
pub async fn store_telegram_session(pool: &PgPool, id: i32, wrapped: &[u8]) -> Result<()> {
    sqlx::query("UPDATE users SET telegram_session = $2 WHERE id = $1")
        .bind(id)
        .bind(wrapped)
        .execute(pool)
        .await?;
    Ok(())
}

/// Drop the stored blob; used when Telegram reports the authorization as
/// revoked and the user must log in again.
pub async fn clear_telegram_session(pool: &PgPool, id: i32) -> Result<()> {
    sqlx::query("UPDATE users SET telegram_session = NULL WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Replace api credentials. The stored session was created with the old
/// credentials, so it is invalidated in the same statement.
pub async fn update_credentials(
    pool: &PgPool,
    id: i32,
    api_id: i32,
    api_hash_wrapped: &[u8],
) -> Result<()> {
    sqlx::query(
        "UPDATE users SET api_id = $2, api_hash = $3, telegram_session = NULL WHERE id = $1",
    )
    .bind(id)
    .bind(api_id)
    .bind(api_hash_wrapped)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_password_hash(pool: &PgPool, id: i32, password_hash: &str) -> Result<()> {
    sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(())
}
