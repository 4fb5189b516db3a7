use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::jwt::AuthUser;
use super::responses::ApiResult;
use super::AppState;
use crate::db::{messages, sessions};
use crate::supervisor::ChatRef;

#[derive(Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    50
}

pub async fn list_sessions(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Value>> {
    let sessions = sessions::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(json!({ "success": true, "sessions": sessions })))
}

/// Start a logging worker for one chat; a second active start for the same
/// chat conflicts with `ALREADY_ACTIVE`.
pub async fn start_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(chat): Json<ChatRef>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let session = state.supervisor.start_logging(auth.user_id, chat).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "session_id": session.id,
            "container_name": session.container_name,
            "session": session,
        })),
    ))
}

pub async fn stop_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<Value>> {
    let session = state.supervisor.stop_logging(auth.user_id, id).await?;
    Ok(Json(json!({ "success": true, "session": session })))
}

pub async fn remove_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<Value>> {
    state.supervisor.remove_logging(auth.user_id, id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<i32>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Value>> {
    // Ownership gate before any message rows are touched.
    sessions::get_owned(&state.pool, session_id, auth.user_id).await?;

    let per_page = page.per_page.clamp(1, 200);
    let page_number = page.page.max(1);
    let offset = (page_number - 1) * per_page;

    let rows = messages::list_for_session(&state.pool, session_id, per_page, offset).await?;
    let total = messages::count_for_session(&state.pool, session_id).await?;

    Ok(Json(json!({
        "success": true,
        "messages": rows,
        "page": page_number,
        "per_page": per_page,
        "total": total,
    })))
}

pub async fn chat_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(chat_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let active = sessions::active_for_chat(&state.pool, auth.user_id, chat_id).await?;
    Ok(Json(json!({
        "success": true,
        "is_logging": active.is_some(),
        "session": active,
    })))
}
