use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::OrchestratorError;

/// Error half of every handler: renders the `{success:false, error, ...}`
/// envelope with the status class the taxonomy dictates. Internal detail
/// stays in the logs, keyed by a correlation id.
pub struct ApiError(pub OrchestratorError);

impl<E> From<E> for ApiError
where
    E: Into<OrchestratorError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut body = json!({
            "success": false,
            "error": self.0.user_message(),
            "error_code": self.0.error_code(),
        });
        if let Some(retry_after) = self.0.retry_after() {
            body["retry_after"] = json!(retry_after);
        }
        if status.is_server_error() {
            let correlation_id = uuid::Uuid::new_v4().to_string();
            tracing::error!(correlation_id = %correlation_id, error = %self.0, "request failed");
            body["correlation_id"] = json!(correlation_id);
        }

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
