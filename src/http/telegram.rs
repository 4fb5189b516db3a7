use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::jwt::AuthUser;
use super::responses::ApiResult;
use super::AppState;

/// Dialogs of the caller: users, bots, groups and channels. Error codes the
/// frontend reacts to: `TELEGRAM_SESSION_EXPIRED`, `API_CREDENTIALS_NOT_SET`.
pub async fn get_chats(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Value>> {
    let chats = state.bridge.get_chats(&auth.phone).await?;
    Ok(Json(json!({
        "success": true,
        "count": chats.len(),
        "chats": chats,
    })))
}
