//! HTTP plumbing towards the workflow engine: the webhook that starts a run
//! and the execution API that reports on it.

use super::execution::ExecutionRecord;
use crate::core::chat::{AnalysisMode, ChatContext, ChatRequest};
use crate::error::{DispatchError, StatusQueryError};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

pub fn build_engine_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}

// ── Webhook ─────────────────────────────────────────────────────────────────

/// Body posted to the workflow webhook.
///
/// Context is sent both nested and flattened so workflow expressions can use
/// either `$json.context.domain` or `$json.domain`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload<'a> {
    action: &'static str,
    chat_input: &'a str,
    session_id: &'a str,
    mode: AnalysisMode,
    context: &'a ChatContext,
    domain: &'a str,
    market: &'a str,
    goals: &'a [String],
    notes: &'a str,
}

impl<'a> WebhookPayload<'a> {
    pub fn from_request(request: &'a ChatRequest) -> Self {
        Self {
            action: "sendMessage",
            chat_input: &request.message,
            session_id: &request.session_id,
            mode: request.mode,
            context: &request.context,
            domain: &request.context.domain,
            market: &request.context.market,
            goals: &request.context.goals,
            notes: &request.context.notes,
        }
    }
}

/// Decoded body of a webhook reply.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookBody {
    /// JSON object.
    Fields(Map<String, Value>),
    /// Plain-text body, or a bare JSON string.
    Text(String),
    /// Declared JSON that is neither an object nor a string, kept verbatim.
    Unrecognized(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebhookResponse {
    pub header_execution_id: Option<String>,
    pub body: WebhookBody,
}

impl WebhookBody {
    pub fn from_raw(raw: String, is_json: bool) -> Self {
        if !is_json {
            return Self::Text(raw);
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(fields)) => Self::Fields(fields),
            Ok(Value::String(text)) => Self::Text(text),
            _ => Self::Unrecognized(raw),
        }
    }
}

pub struct WebhookClient {
    url: String,
    token: Option<String>,
    execution_id_header: String,
    timeout: Duration,
    http: Client,
}

impl WebhookClient {
    pub fn new(
        url: &str,
        token: Option<&str>,
        execution_id_header: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            url: url.to_string(),
            token: token.filter(|t| !t.is_empty()).map(ToString::to_string),
            execution_id_header: execution_id_header.to_ascii_lowercase(),
            timeout,
            http: build_engine_client(timeout),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the payload and decode the reply, aborting after the initial-call timeout.
    pub async fn send(&self, payload: &WebhookPayload<'_>) -> Result<WebhookResponse, DispatchError> {
        let timeout_secs = self.timeout.as_secs();
        tokio::time::timeout(self.timeout, self.exchange(payload))
            .await
            .map_err(|_| DispatchError::InitialTimeout { timeout_secs })?
    }

    async fn exchange(&self, payload: &WebhookPayload<'_>) -> Result<WebhookResponse, DispatchError> {
        let timeout_secs = self.timeout.as_secs();
        let map_err = |err: reqwest::Error| {
            if err.is_timeout() {
                DispatchError::InitialTimeout { timeout_secs }
            } else {
                DispatchError::Network(err.to_string())
            }
        };

        let mut request = self.http.post(&self.url).json(payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(map_err)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::WebhookStatus {
                status: status.as_u16(),
                body,
            });
        }

        let header_execution_id = response
            .headers()
            .get(self.execution_id_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToString::to_string);
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let raw = response.text().await.map_err(map_err)?;

        Ok(WebhookResponse {
            header_execution_id,
            body: WebhookBody::from_raw(raw, is_json),
        })
    }
}

// ── Execution API ───────────────────────────────────────────────────────────

/// Read-only access to the engine's execution records.
#[async_trait]
pub trait ExecutionApi: Send + Sync {
    async fn get_execution(&self, execution_id: &str) -> Result<ExecutionRecord, StatusQueryError>;
}

pub struct HttpExecutionApi {
    base_url: Url,
    api_key: String,
    api_key_header: String,
    http: Client,
}

impl HttpExecutionApi {
    pub fn new(
        base_url: &str,
        api_key: &str,
        api_key_header: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| anyhow::anyhow!("invalid execution API URL {base_url}: {e}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("execution API URL {base_url} cannot carry a path");
        }
        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            api_key_header: api_key_header.to_string(),
            http: build_engine_client(timeout),
        })
    }

    /// `<base>/executions/<id>`, with the id percent-encoded as one path segment.
    pub fn execution_url(&self, execution_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("executions").push(execution_id);
        }
        url
    }
}

#[async_trait]
impl ExecutionApi for HttpExecutionApi {
    async fn get_execution(&self, execution_id: &str) -> Result<ExecutionRecord, StatusQueryError> {
        let url = self.execution_url(execution_id);
        tracing::debug!(execution_id, "fetching execution record");

        let response = self
            .http
            .get(url)
            .query(&[("includeData", "true")])
            .header(self.api_key_header.as_str(), &self.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| StatusQueryError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StatusQueryError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(StatusQueryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| StatusQueryError::Decode(e.to_string()))
    }
}
