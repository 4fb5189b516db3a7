use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::jwt::AuthUser;
use super::logging::PageQuery;
use super::responses::{ApiError, ApiResult};
use super::AppState;
use crate::db::listeners::{self, NewElaboration, ELABORATION_REDIRECT};
use crate::error::OrchestratorError;
use crate::supervisor::ChatRef;

#[derive(Deserialize)]
pub struct NewElaborationRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub priority: i32,
}

pub async fn list_listeners(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Value>> {
    let listeners = listeners::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(json!({ "success": true, "listeners": listeners })))
}

pub async fn start_listener(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(chat): Json<ChatRef>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let listener = state.supervisor.start_listener(auth.user_id, chat).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "listener_id": listener.id,
            "container_name": listener.container_name,
            "listener": listener,
        })),
    ))
}

pub async fn stop_listener(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<Value>> {
    let listener = state.supervisor.stop_listener(auth.user_id, id).await?;
    Ok(Json(json!({ "success": true, "listener": listener })))
}

pub async fn remove_listener(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<Value>> {
    state.supervisor.remove_listener(auth.user_id, id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn list_elaborations(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<Value>> {
    listeners::get_owned(&state.pool, id, auth.user_id).await?;
    let elaborations = listeners::elaborations_for_listener(&state.pool, id).await?;
    Ok(Json(json!({ "success": true, "elaborations": elaborations })))
}

/// Attach an extractor or the (single) redirect to a listener. The redirect
/// cap is checked here, in the store and in the database index.
pub async fn add_elaboration(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(req): Json<NewElaborationRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    listeners::get_owned(&state.pool, id, auth.user_id).await?;
    if req.name.trim().is_empty() {
        return Err(ApiError(OrchestratorError::Validation(
            "nome elaborazione mancante".into(),
        )));
    }

    if req.kind == ELABORATION_REDIRECT {
        let existing = listeners::elaborations_for_listener(&state.pool, id).await?;
        if existing.iter().any(|e| e.kind == ELABORATION_REDIRECT) {
            return Err(ApiError(OrchestratorError::RedirectExists));
        }
    }

    let elaboration = listeners::add_elaboration(
        &state.pool,
        NewElaboration {
            listener_id: id,
            kind: &req.kind,
            name: req.name.trim(),
            config: req.config,
            priority: req.priority,
        },
    )
    .await?;

    // A running worker keeps its old snapshot until restarted.
    if let Err(e) = state.supervisor.refresh_listener(auth.user_id, id).await {
        tracing::warn!(listener = id, error = %e, "worker refresh after elaboration change failed");
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "elaboration": elaboration })),
    ))
}

pub async fn remove_elaboration(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, eid)): Path<(i32, i32)>,
) -> ApiResult<Json<Value>> {
    listeners::get_owned(&state.pool, id, auth.user_id).await?;
    listeners::delete_elaboration(&state.pool, id, eid).await?;

    if let Err(e) = state.supervisor.refresh_listener(auth.user_id, id).await {
        tracing::warn!(listener = id, error = %e, "worker refresh after elaboration change failed");
    }

    Ok(Json(json!({ "success": true })))
}

pub async fn list_saved_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Value>> {
    listeners::get_owned(&state.pool, id, auth.user_id).await?;

    let per_page = page.per_page.clamp(1, 200);
    let page_number = page.page.max(1);
    let offset = (page_number - 1) * per_page;

    let rows = listeners::list_saved_for_listener(&state.pool, id, per_page, offset).await?;
    Ok(Json(json!({
        "success": true,
        "messages": rows,
        "page": page_number,
        "per_page": per_page,
    })))
}
