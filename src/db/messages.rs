use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::Result;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct MessageLog {
    pub id: i64,
    pub user_id: i32,
    pub chat_id: i64,
    pub chat_title: Option<String>,
    pub chat_username: Option<String>,
    pub chat_type: Option<String>,
    pub message_id: i32,
    pub sender_id: Option<i64>,
    pub sender_name: Option<String>,
    pub sender_username: Option<String>,
    pub message_text: Option<String>,
    pub message_type: String,
    pub media_file_id: Option<String>,
    pub message_date: Option<DateTime<Utc>>,
    pub logged_at: DateTime<Utc>,
    pub logging_session_id: i32,
}

const COLUMNS: &str = "id, user_id, chat_id, chat_title, chat_username, chat_type, message_id, \
     sender_id, sender_name, sender_username, message_text, message_type, media_file_id, \
     message_date, logged_at, logging_session_id";

pub struct NewMessageLog<'a> {
    pub user_id: i32,
    pub chat_id: i64,
    pub chat_title: Option<&'a str>,
    pub chat_username: Option<&'a str>,
    pub chat_type: Option<&'a str>,
    pub message_id: i32,
    pub sender_id: Option<i64>,
    pub sender_name: Option<&'a str>,
    pub sender_username: Option<&'a str>,
    pub message_text: Option<&'a str>,
    pub message_type: &'a str,
    pub media_file_id: Option<&'a str>,
    pub message_date: Option<DateTime<Utc>>,
    pub logging_session_id: i32,
}

/// Insert one captured message. Re-delivery of the same message is an
/// idempotent replay: the conflict target swallows it and the function
/// reports whether a row was actually written.
pub async fn insert(pool: &PgPool, new: NewMessageLog<'_>) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO message_logs
             (user_id, chat_id, chat_title, chat_username, chat_type, message_id,
              sender_id, sender_name, sender_username, message_text, message_type,
              media_file_id, message_date, logging_session_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
         ON CONFLICT (chat_id, message_id, logging_session_id) DO NOTHING",
    )
    .bind(new.user_id)
    .bind(new.chat_id)
    .bind(new.chat_title)
    .bind(new.chat_username)
    .bind(new.chat_type)
    .bind(new.message_id)
    .bind(new.sender_id)
    .bind(new.sender_name)
    .bind(new.sender_username)
    .bind(new.message_text)
    .bind(new.message_type)
    .bind(new.media_file_id)
    .bind(new.message_date)
    .bind(new.logging_session_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn bump_logged_counter(pool: &PgPool, logging_session_id: i32) -> Result<()> {
    sqlx::query("UPDATE logging_sessions SET messages_logged = messages_logged + 1 WHERE id = $1")
        .bind(logging_session_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Page of captured messages, newest first by the global progressive id.
pub async fn list_for_session(
    pool: &PgPool,
    logging_session_id: i32,
    limit: i64,
    offset: i64,
) -> Result<Vec<MessageLog>> {
    let messages = sqlx::query_as::<_, MessageLog>(&format!(
        "SELECT {COLUMNS} FROM message_logs
         WHERE logging_session_id = $1
         ORDER BY id DESC
         LIMIT $2 OFFSET $3"
    ))
    .bind(logging_session_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(messages)
}

pub async fn count_for_session(pool: &PgPool, logging_session_id: i32) -> Result<i64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT count(*) FROM message_logs WHERE logging_session_id = $1")
            .bind(logging_session_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}
