use crate::core::ChatExchange;
use crate::error::BridgeError;
use crate::security::RateLimitDecision;
use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{Value, json};

pub(super) const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub(super) const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// HTTP status for a stable error code.
pub(super) fn status_for(code: &str) -> StatusCode {
    match code {
        "RATE_LIMIT_EXCEEDED" => StatusCode::TOO_MANY_REQUESTS,
        "INVALID_JSON" | "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
        "DISPATCH_TIMEOUT" | "POLL_TIMEOUT" => StatusCode::GATEWAY_TIMEOUT,
        "DISPATCH_FAILED"
        | "INVALID_EXECUTION_ID"
        | "UNEXPECTED_RESPONSE"
        | "EXECUTION_FAILED"
        | "EXECUTION_CANCELED"
        | "EXECUTION_NO_OUTPUT"
        | "POLLING_UNAVAILABLE" => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_details(err: &BridgeError) -> Option<Value> {
    match err {
        BridgeError::Validation(errors) => Some(json!({ "fields": errors.errors() })),
        BridgeError::RateLimited { reset_at } => {
            Some(json!({ "resetAt": reset_at.to_rfc3339() }))
        }
        BridgeError::Dispatch(dispatch) => dispatch
            .execution_id()
            .map(|id| json!({ "executionId": id })),
        _ => None,
    }
}

/// `{ error: { code, message, details? }, meta: { requestId } }`
pub(super) fn error_body(err: &BridgeError, request_id: &str) -> Value {
    let mut error = json!({
        "code": err.code(),
        "message": err.to_string(),
    });
    if let Some(details) = error_details(err) {
        error["details"] = details;
    }
    json!({
        "error": error,
        "meta": { "requestId": request_id },
    })
}

pub(super) fn error_response(err: &BridgeError, request_id: &str) -> (StatusCode, Json<Value>) {
    (status_for(err.code()), Json(error_body(err, request_id)))
}

fn rate_limit_headers(decision: &RateLimitDecision) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(
        RATE_LIMIT_RESET,
        HeaderValue::from(decision.reset_at.timestamp_millis()),
    );
    headers
}

impl IntoResponse for ChatExchange {
    fn into_response(self) -> Response {
        let headers = rate_limit_headers(&self.rate_limit);
        match &self.result {
            Ok(reply) => {
                let body = json!({
                    "reply": reply,
                    "meta": {
                        "requestId": self.request_id,
                        "durationMs": self.duration_ms(),
                    },
                });
                (StatusCode::OK, headers, Json(body)).into_response()
            }
            Err(err) => {
                let (status, body) = error_response(err, &self.request_id);
                (status, headers, body).into_response()
            }
        }
    }
}
