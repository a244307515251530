use crate::security::client_identifier;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Json},
};

use super::responses::error_response;
use super::{AppState, SERVICE_NAME};

/// GET /health: liveness probe
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().timestamp_millis(),
        "service": SERVICE_NAME,
        "mockMode": state.bridge.is_mock(),
    }))
}

/// POST /api/chat: admit, validate and dispatch one chat request
pub(super) async fn handle_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let client_id = client_identifier(&headers);
    state.bridge.handle(&client_id, &body).await
}

/// GET /api/chat/status/{id}: one-shot execution status
pub(super) async fn handle_status(
    State(state): State<AppState>,
    Path(execution_id): Path<String>,
    headers: HeaderMap,
) -> axum::response::Response {
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("internal");

    match state.bridge.execution_status(&execution_id).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => {
            tracing::warn!(execution_id = %execution_id, error = %err, "status check failed");
            error_response(&err, request_id).into_response()
        }
    }
}
