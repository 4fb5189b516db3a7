use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::responses::ApiResult;
use super::AppState;
use crate::db;

pub async fn liveness(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let schema_version = db::schema_version(&state.pool).await.ok();
    Ok(Json(json!({
        "success": true,
        "status": "healthy",
        "schema_version": schema_version,
    })))
}

pub async fn login_performance(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.metrics.snapshot();
    Json(json!({
        "success": true,
        "total_requests": snapshot.total_requests,
        "successful_requests": snapshot.successful_requests,
        "failed_requests": snapshot.failed_requests,
        "last_10_times": snapshot.last_10_times,
        "avg_time": snapshot.avg_time,
    }))
}
