//! Heuristic mapping from engine payloads to a reply string.
//!
//! The engine's output schema is whatever the workflow author chose, so both
//! extractors probe an ordered list of well-known field names.

use super::execution::ExecutionRecord;
use crate::error::DispatchError;
use serde_json::{Map, Value};

/// Field names probed on a synchronous webhook reply, highest priority first.
pub const SYNC_REPLY_FIELDS: &[&str] = &["output", "reply", "message", "text", "response"];

/// Field names probed on the final item of a finished execution.
pub const EXECUTION_OUTPUT_FIELDS: &[&str] =
    &["output", "reply", "message", "text", "response", "result"];

fn first_non_empty_string<'a>(fields: &'a Map<String, Value>, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        fields
            .get(*name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    })
}

/// Extract the reply from a synchronous webhook payload.
pub fn extract_sync_reply(payload: &Map<String, Value>) -> Result<String, DispatchError> {
    if let Some(reply) = first_non_empty_string(payload, SYNC_REPLY_FIELDS) {
        return Ok(reply.to_string());
    }

    if payload.len() == 1
        && let Some(Value::String(only)) = payload.values().next()
    {
        return Ok(only.clone());
    }

    tracing::warn!(fields = payload.len(), "unexpected webhook response format");
    Err(DispatchError::UnexpectedFormat {
        raw: Value::Object(payload.clone()).to_string(),
    })
}

/// Extract the reply of a finished run from its last executed step.
pub fn extract_execution_output(record: &ExecutionRecord) -> Option<String> {
    let result = record.result_data()?;
    let run_data = result.run_data.as_ref()?;

    let step_runs = match result.last_node_executed.as_deref() {
        Some(step) => run_data.get(step),
        None => {
            let (fallback, runs) = run_data.iter().next_back()?;
            tracing::debug!(step = %fallback, "no last executed step, using last recorded step");
            Some(runs)
        }
    }?;

    let item = step_runs
        .as_array()?
        .last()?
        .get("data")?
        .get("main")?
        .get(0)?
        .get(0)?
        .get("json")?
        .as_object()?;

    if let Some(reply) = first_non_empty_string(item, EXECUTION_OUTPUT_FIELDS) {
        return Some(reply.to_string());
    }

    tracing::warn!("no standard output field found, returning the full item");
    serde_json::to_string_pretty(item).ok()
}

/// Error message recorded on a failed run, if any.
pub fn extract_execution_error(record: &ExecutionRecord) -> Option<String> {
    match record.result_data()?.error.as_ref()? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        descriptor => Some(
            descriptor
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .map_or_else(|| descriptor.to_string(), ToString::to_string),
        ),
    }
}
