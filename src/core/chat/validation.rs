//! Structural validation of inbound chat requests.
//!
//! Every check runs regardless of earlier failures so the caller can report
//! all problems in one response.

use super::types::{AnalysisMode, ChatContext, ChatRequest};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

pub const MAX_MESSAGE_LENGTH: usize = 4000;
pub const MAX_CONTEXT_LENGTH: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every field-level failure found in one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", err.field, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub fn validate_chat_request(body: &Value) -> Result<ChatRequest, ValidationErrors> {
    let Some(obj) = body.as_object() else {
        return Err(ValidationErrors::new(vec![FieldError::new(
            "body",
            "Invalid request body",
        )]));
    };

    let mut errors = Vec::new();

    let session_id = match obj.get("sessionId").and_then(Value::as_str) {
        Some(id) if !id.trim().is_empty() => Some(id.to_string()),
        _ => {
            errors.push(FieldError::new("sessionId", "sessionId is required"));
            None
        }
    };

    let message = match obj.get("message").and_then(Value::as_str) {
        None => {
            errors.push(FieldError::new(
                "message",
                "message is required and must be a string",
            ));
            None
        }
        Some(m) if m.trim().is_empty() => {
            errors.push(FieldError::new("message", "message cannot be empty"));
            None
        }
        Some(m) if m.chars().count() > MAX_MESSAGE_LENGTH => {
            errors.push(FieldError::new(
                "message",
                format!("message exceeds maximum length of {MAX_MESSAGE_LENGTH} characters"),
            ));
            None
        }
        Some(m) => Some(m.to_string()),
    };

    let mode = obj
        .get("mode")
        .and_then(Value::as_str)
        .and_then(AnalysisMode::parse);
    if mode.is_none() {
        errors.push(FieldError::new(
            "mode",
            "mode must be either \"quick\" or \"full\"",
        ));
    }

    let context = match obj.get("context").and_then(Value::as_object) {
        Some(ctx) => validate_context(ctx, &mut errors),
        None => {
            errors.push(FieldError::new("context", "context is required"));
            None
        }
    };

    match (session_id, message, mode, context) {
        (Some(session_id), Some(message), Some(mode), Some(context)) if errors.is_empty() => {
            Ok(ChatRequest {
                session_id,
                message,
                mode,
                context,
            })
        }
        _ => Err(ValidationErrors::new(errors)),
    }
}

fn validate_context(ctx: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<ChatContext> {
    let domain = bounded_context_string(ctx, "domain", errors);
    let market = bounded_context_string(ctx, "market", errors);

    let goals = match ctx.get("goals").and_then(Value::as_array) {
        None => {
            errors.push(FieldError::new("context.goals", "goals must be an array"));
            None
        }
        Some(items) => {
            let goals: Option<Vec<String>> = items
                .iter()
                .map(|g| g.as_str().map(ToString::to_string))
                .collect();
            if goals.is_none() {
                errors.push(FieldError::new("context.goals", "all goals must be strings"));
            }
            goals
        }
    };

    let notes = bounded_context_string(ctx, "notes", errors);

    Some(ChatContext {
        domain: domain?,
        market: market?,
        goals: goals?,
        notes: notes?,
    })
}

fn bounded_context_string(
    ctx: &Map<String, Value>,
    name: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let field = format!("context.{name}");
    match ctx.get(name).and_then(Value::as_str) {
        None => {
            errors.push(FieldError::new(field, format!("{name} must be a string")));
            None
        }
        Some(value) if value.chars().count() > MAX_CONTEXT_LENGTH => {
            errors.push(FieldError::new(field, format!("{name} is too long")));
            None
        }
        Some(value) => Some(value.to_string()),
    }
}
