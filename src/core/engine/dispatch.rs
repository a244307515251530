//! Sends a chat request to the workflow engine and drives it to a reply.

use super::client::{WebhookBody, WebhookClient, WebhookPayload, WebhookResponse};
use super::extract::extract_sync_reply;
use super::mock::mock_reply;
use super::poller::ExecutionPoller;
use crate::core::chat::ChatRequest;
use crate::error::DispatchError;
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::time::Instant;

/// Marker of an unevaluated workflow expression, e.g. `{{ $execution.id }}`.
const TEMPLATE_MARKER: &str = "{{";

/// How the engine answered the initial webhook call.
#[derive(Debug)]
pub enum DispatchOutcome {
    SyncReply(String),
    AsyncPending(String),
    Failure(DispatchError),
}

/// Classify a webhook reply.
///
/// The execution-id header wins over the body: the engine sets it even when
/// it responds immediately without evaluating the body's expressions.
pub fn classify(response: WebhookResponse) -> DispatchOutcome {
    let WebhookResponse {
        header_execution_id,
        body,
    } = response;

    let fields = match body {
        WebhookBody::Text(text) => {
            return match header_execution_id {
                Some(id) => DispatchOutcome::AsyncPending(id),
                None => DispatchOutcome::SyncReply(text),
            };
        }
        WebhookBody::Unrecognized(raw) => {
            return match header_execution_id {
                Some(id) => DispatchOutcome::AsyncPending(id),
                None => DispatchOutcome::Failure(DispatchError::UnexpectedFormat { raw }),
            };
        }
        WebhookBody::Fields(fields) => fields,
    };

    if let Some(id) = header_execution_id.as_deref()
        && !fields.get("output").is_some_and(is_truthy)
    {
        tracing::info!(execution_id = id, "execution id found in response header");
        return DispatchOutcome::AsyncPending(id.to_string());
    }

    if fields.get("executionStarted").and_then(Value::as_bool) == Some(true)
        && let Some(body_id) = body_execution_id(&fields)
    {
        if body_id.contains(TEMPLATE_MARKER) {
            tracing::warn!(raw = %body_id, "execution id is an unevaluated expression");
            return match header_execution_id {
                Some(id) => DispatchOutcome::AsyncPending(id),
                None => DispatchOutcome::Failure(DispatchError::InvalidExecutionId { raw: body_id }),
            };
        }
        tracing::info!(execution_id = %body_id, "workflow started asynchronously");
        return DispatchOutcome::AsyncPending(body_id);
    }

    match extract_sync_reply(&fields) {
        Ok(reply) => DispatchOutcome::SyncReply(reply),
        Err(err) => DispatchOutcome::Failure(err),
    }
}

fn body_execution_id(fields: &Map<String, Value>) -> Option<String> {
    match fields.get("executionId")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Overall budget for one dispatch, initial call and polling included.
    pub request_deadline: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            request_deadline: Duration::from_secs(240),
        }
    }
}

/// Root of the outbound flow: webhook call, classification, polling.
///
/// Without a webhook the dispatcher answers with a canned analysis; without
/// an execution API asynchronous runs cannot be awaited.
pub struct Dispatcher {
    webhook: Option<WebhookClient>,
    poller: Option<ExecutionPoller>,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(
        webhook: Option<WebhookClient>,
        poller: Option<ExecutionPoller>,
        settings: DispatchSettings,
    ) -> Self {
        if webhook.is_some() && poller.is_none() {
            tracing::warn!(
                "execution API not configured; asynchronous workflows cannot be awaited"
            );
        }
        Self {
            webhook,
            poller,
            settings,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.webhook.is_none()
    }

    pub fn poller(&self) -> Option<&ExecutionPoller> {
        self.poller.as_ref()
    }

    pub async fn dispatch(&self, request: &ChatRequest) -> Result<String, DispatchError> {
        let Some(webhook) = &self.webhook else {
            tracing::info!(session_id = %request.session_id, "mock mode, no webhook configured");
            return Ok(mock_reply(request));
        };

        let deadline = Instant::now() + self.settings.request_deadline;

        let payload = WebhookPayload::from_request(request);
        tracing::debug!(
            session_id = %request.session_id,
            mode = %request.mode,
            url = webhook.url(),
            "posting to workflow webhook"
        );
        let response = tokio::time::timeout_at(deadline, webhook.send(&payload))
            .await
            .map_err(|_| DispatchError::InitialTimeout {
                timeout_secs: self.settings.request_deadline.as_secs(),
            })??;

        match classify(response) {
            DispatchOutcome::SyncReply(reply) => Ok(reply),
            DispatchOutcome::Failure(err) => Err(err),
            DispatchOutcome::AsyncPending(execution_id) => {
                self.await_execution(execution_id, deadline).await
            }
        }
    }

    async fn await_execution(
        &self,
        execution_id: String,
        deadline: Instant,
    ) -> Result<String, DispatchError> {
        let Some(poller) = &self.poller else {
            return Err(DispatchError::PollingUnavailable { execution_id });
        };

        // Dropping the poll future on the deadline abandons the remaining
        // attempts; the remote run itself keeps going.
        match tokio::time::timeout_at(deadline, poller.poll(&execution_id)).await {
            Ok(result) => result.map_err(DispatchError::from),
            Err(_) => {
                tracing::warn!(execution_id = %execution_id, "request deadline exceeded while polling");
                Err(DispatchError::DeadlineExceeded { execution_id })
            }
        }
    }
}
