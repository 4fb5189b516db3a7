use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::{OrchestratorError, Result};

pub const ELABORATION_EXTRACTOR: &str = "extractor";
pub const ELABORATION_REDIRECT: &str = "redirect";

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct MessageListener {
    pub id: i32,
    pub user_id: i32,
    pub source_chat_id: i64,
    pub source_chat_title: Option<String>,
    pub source_chat_username: Option<String>,
    pub source_chat_type: Option<String>,
    pub is_active: bool,
    pub container_name: Option<String>,
    pub container_id: Option<String>,
    pub container_status: String,
    pub messages_saved: i64,
    pub errors_count: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct MessageElaboration {
    pub id: i32,
    pub listener_id: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub config: serde_json::Value,
    pub is_active: bool,
    pub priority: i32,
    pub processed_count: i64,
    pub errors_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct SavedMessage {
    pub id: i64,
    pub listener_id: i32,
    pub message_id: i32,
    pub text: Option<String>,
    pub data: Option<serde_json::Value>,
    pub sender_id: Option<i64>,
    pub sender_name: Option<String>,
    pub message_date: Option<DateTime<Utc>>,
    pub saved_at: DateTime<Utc>,
}

const LISTENER_COLUMNS: &str = "id, user_id, source_chat_id, source_chat_title, \
     source_chat_username, source_chat_type, is_active, container_name, container_id, \
     container_status, messages_saved, errors_count, last_error, created_at, updated_at, stopped_at";

const ELABORATION_COLUMNS: &str = "id, listener_id, type, name, config, is_active, priority, \
     processed_count, errors_count, created_at, updated_at";

pub struct NewListener<'a> {
    pub user_id: i32,
    pub source_chat_id: i64,
    pub source_chat_title: Option<&'a str>,
    pub source_chat_username: Option<&'a str>,
    pub source_chat_type: Option<&'a str>,
    pub container_name: &'a str,
}

/// Same reserve-in-transaction shape as logging sessions, but the listener
/// uniqueness holds regardless of is_active: one listener row per
/// (user, source chat), reactivated in place when restarted.
pub async fn reserve(pool: &PgPool, new: NewListener<'_>) -> Result<MessageListener> {
    let mut tx = pool.begin().await?;

    let existing: Option<(i32, bool)> = sqlx::query_as(
        "SELECT id, is_active FROM message_listeners
         WHERE user_id = $1 AND source_chat_id = $2
         FOR UPDATE",
    )
    .bind(new.user_id)
    .bind(new.source_chat_id)
    .fetch_optional(&mut *tx)
    .await?;

    let listener = match existing {
        Some((_, true)) => return Err(OrchestratorError::AlreadyActive),
        Some((id, false)) => {
            sqlx::query_as::<_, MessageListener>(&format!(
                "UPDATE message_listeners
                 SET is_active = TRUE, container_status = 'creating', container_name = $2,
                     container_id = NULL, last_error = NULL, stopped_at = NULL
                 WHERE id = $1
                 RETURNING {LISTENER_COLUMNS}"
            ))
            .bind(id)
            .bind(new.container_name)
            .fetch_one(&mut *tx)
            .await?
        }
        None => {
            sqlx::query_as::<_, MessageListener>(&format!(
                "INSERT INTO message_listeners
                     (user_id, source_chat_id, source_chat_title, source_chat_username,
                      source_chat_type, container_name, container_status)
                 VALUES ($1, $2, $3, $4, $5, $6, 'creating')
                 RETURNING {LISTENER_COLUMNS}"
            ))
            .bind(new.user_id)
            .bind(new.source_chat_id)
            .bind(new.source_chat_title)
            .bind(new.source_chat_username)
            .bind(new.source_chat_type)
            .bind(new.container_name)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    OrchestratorError::AlreadyActive
                }
                _ => e.into(),
            })?
        }
    };

    tx.commit().await?;
    Ok(listener)
}

pub async fn mark_running(pool: &PgPool, id: i32, container_id: &str) -> Result<()> {
    sqlx::query(
        "UPDATE message_listeners SET container_status = 'running', container_id = $2 WHERE id = $1",
    )
    .bind(id)
    .bind(container_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn mark_stopped(pool: &PgPool, id: i32) -> Result<()> {
    sqlx::query(
        "UPDATE message_listeners
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
        "UPDATE message_listeners
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

pub async fn get(pool: &PgPool, id: i32) -> Result<Option<MessageListener>> {
    let listener = sqlx::query_as::<_, MessageListener>(&format!(
        "SELECT {LISTENER_COLUMNS} FROM message_listeners WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(listener)
}

pub async fn get_owned(pool: &PgPool, id: i32, user_id: i32) -> Result<MessageListener> {
    get(pool, id)
        .await?
        .filter(|l| l.user_id == user_id)
        .ok_or(OrchestratorError::NotFound("listener"))
}

pub async fn list_for_user(pool: &PgPool, user_id: i32) -> Result<Vec<MessageListener>> {
    let listeners = sqlx::query_as::<_, MessageListener>(&format!(
        "SELECT {LISTENER_COLUMNS} FROM message_listeners WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(listeners)
}

pub async fn list_running(pool: &PgPool) -> Result<Vec<MessageListener>> {
    let listeners = sqlx::query_as::<_, MessageListener>(&format!(
        "SELECT {LISTENER_COLUMNS} FROM message_listeners WHERE container_status = 'running'"
    ))
    .fetch_all(pool)
    .await?;
    Ok(listeners)
}

pub async fn delete(pool: &PgPool, id: i32) -> Result<()> {
    sqlx::query("DELETE FROM message_listeners WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// ===== Elaborations =====

pub struct NewElaboration<'a> {
    pub listener_id: i32,
    pub kind: &'a str,
    pub name: &'a str,
    pub config: serde_json::Value,
    pub priority: i32,
}

/// Insert an elaboration. The one-redirect-per-listener rule is checked here
/// and enforced again by the partial unique index.
pub async fn add_elaboration(pool: &PgPool, new: NewElaboration<'_>) -> Result<MessageElaboration> {
    if new.kind != ELABORATION_EXTRACTOR && new.kind != ELABORATION_REDIRECT {
        return Err(OrchestratorError::Validation(format!(
            "tipo di elaborazione sconosciuto: {}",
            new.kind
        )));
    }

    let mut tx = pool.begin().await?;

    if new.kind == ELABORATION_REDIRECT {
        let existing: Option<(i32,)> = sqlx::query_as(
            "SELECT id FROM message_elaborations
             WHERE listener_id = $1 AND type = 'redirect'
             FOR UPDATE",
        )
        .bind(new.listener_id)
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            return Err(OrchestratorError::RedirectExists);
        }
    }

    let elaboration = sqlx::query_as::<_, MessageElaboration>(&format!(
        "INSERT INTO message_elaborations (listener_id, type, name, config, priority)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {ELABORATION_COLUMNS}"
    ))
    .bind(new.listener_id)
    .bind(new.kind)
    .bind(new.name)
    .bind(&new.config)
    .bind(new.priority)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            if db.constraint() == Some("message_elaborations_one_redirect") {
                OrchestratorError::RedirectExists
            } else {
                OrchestratorError::Validation("nome elaborazione già in uso".into())
            }
        }
        _ => e.into(),
    })?;

    tx.commit().await?;
    Ok(elaboration)
}

/// Active elaborations in execution order (priority, then insertion).
pub async fn elaborations_for_listener(
    pool: &PgPool,
    listener_id: i32,
) -> Result<Vec<MessageElaboration>> {
    let elaborations = sqlx::query_as::<_, MessageElaboration>(&format!(
        "SELECT {ELABORATION_COLUMNS} FROM message_elaborations
         WHERE listener_id = $1
         ORDER BY priority, id"
    ))
    .bind(listener_id)
    .fetch_all(pool)
    .await?;
    Ok(elaborations)
}

pub async fn delete_elaboration(pool: &PgPool, listener_id: i32, elaboration_id: i32) -> Result<()> {
    let result = sqlx::query("DELETE FROM message_elaborations WHERE id = $1 AND listener_id = $2")
        .bind(elaboration_id)
        .bind(listener_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(OrchestratorError::NotFound("elaboration"));
    }
    Ok(())
}

pub async fn bump_elaboration_counter(pool: &PgPool, id: i32) -> Result<()> {
    sqlx::query(
        "UPDATE message_elaborations SET processed_count = processed_count + 1 WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn record_elaboration_error(pool: &PgPool, id: i32) -> Result<()> {
    sqlx::query("UPDATE message_elaborations SET errors_count = errors_count + 1 WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// ===== Saved messages & extracted values =====

pub struct NewSavedMessage<'a> {
    pub listener_id: i32,
    pub message_id: i32,
    pub text: Option<&'a str>,
    pub data: Option<serde_json::Value>,
    pub sender_id: Option<i64>,
    pub sender_name: Option<&'a str>,
    pub message_date: Option<DateTime<Utc>>,
}

pub async fn save_message(pool: &PgPool, new: NewSavedMessage<'_>) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO saved_messages
             (listener_id, message_id, text, data, sender_id, sender_name, message_date)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (listener_id, message_id) DO NOTHING",
    )
    .bind(new.listener_id)
    .bind(new.message_id)
    .bind(new.text)
    .bind(&new.data)
    .bind(new.sender_id)
    .bind(new.sender_name)
    .bind(new.message_date)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn bump_saved_counter(pool: &PgPool, listener_id: i32) -> Result<()> {
    sqlx::query("UPDATE message_listeners SET messages_saved = messages_saved + 1 WHERE id = $1")
        .bind(listener_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_saved_for_listener(
    pool: &PgPool,
    listener_id: i32,
    limit: i64,
    offset: i64,
) -> Result<Vec<SavedMessage>> {
    let messages = sqlx::query_as::<_, SavedMessage>(
        "SELECT id, listener_id, message_id, text, data, sender_id, sender_name, message_date, saved_at
         FROM saved_messages
         WHERE listener_id = $1
         ORDER BY id DESC
         LIMIT $2 OFFSET $3",
    )
    .bind(listener_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(messages)
}

pub async fn insert_extracted_value(
    pool: &PgPool,
    elaboration_id: i32,
    message_id: i32,
    rule_name: &str,
    extracted_value: &str,
    occurrence_index: i32,
) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO extracted_values
             (elaboration_id, message_id, rule_name, extracted_value, occurrence_index)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (elaboration_id, message_id, rule_name, occurrence_index) DO NOTHING",
    )
    .bind(elaboration_id)
    .bind(message_id)
    .bind(rule_name)
    .bind(extracted_value)
    .bind(occurrence_index)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Retention: saved messages older than the window are deleted outright.
pub async fn cleanup_old_saved_messages(pool: &PgPool, older_than_days: i32) -> Result<u64> {
    let result =
        sqlx::query("DELETE FROM saved_messages WHERE saved_at < now() - make_interval(days => $1)")
            .bind(older_than_days)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}
