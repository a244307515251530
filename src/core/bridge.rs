//! Inbound chat handling: admission, parsing, validation, dispatch.

use crate::config::Config;
use crate::core::chat::validate_chat_request;
use crate::core::engine::{
    Dispatcher, ExecutionApi, ExecutionPhase, ExecutionPoller, HttpExecutionApi, WebhookClient,
    extract_execution_error, extract_execution_output,
};
use crate::error::{BridgeError, StatusQueryError};
use crate::security::rate_limit::{AdmissionControl, RateLimitDecision, SlidingWindowLimiter};
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Result of one chat request, with the metadata every response carries.
#[derive(Debug)]
pub struct ChatExchange {
    pub request_id: String,
    pub duration: Duration,
    pub rate_limit: RateLimitDecision,
    pub result: Result<String, BridgeError>,
}

impl ChatExchange {
    pub fn duration_ms(&self) -> u64 {
        u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX)
    }
}

/// One-shot view of an execution for clients that poll on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionStatusView {
    Success { output: String },
    Error { error: String },
    Running,
}

pub struct ChatBridge {
    limiter: Arc<dyn AdmissionControl>,
    dispatcher: Dispatcher,
    executions: Option<Arc<dyn ExecutionApi>>,
}

impl ChatBridge {
    pub fn new(
        limiter: Arc<dyn AdmissionControl>,
        dispatcher: Dispatcher,
        executions: Option<Arc<dyn ExecutionApi>>,
    ) -> Self {
        Self {
            limiter,
            dispatcher,
            executions,
        }
    }

    /// Wire the bridge from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let engine = &config.engine;

        let limiter: Arc<dyn AdmissionControl> = Arc::new(SlidingWindowLimiter::new(
            config.rate_limit.window(),
            config.rate_limit.max_requests,
            config.rate_limit.sweep_probability,
        ));

        let webhook = engine.webhook_url().map(|url| {
            WebhookClient::new(
                url,
                engine.webhook_token(),
                &engine.execution_id_header,
                engine.initial_timeout(),
            )
        });

        let executions: Option<Arc<dyn ExecutionApi>> = match engine.execution_api() {
            Some((base_url, api_key)) => Some(Arc::new(HttpExecutionApi::new(
                base_url,
                api_key,
                &engine.api_key_header,
                engine.status_timeout(),
            )?)),
            None => None,
        };

        let poller = executions
            .as_ref()
            .map(|api| ExecutionPoller::new(Arc::clone(api), engine.poll_settings()));

        let dispatcher = Dispatcher::new(webhook, poller, engine.dispatch_settings());
        Ok(Self::new(limiter, dispatcher, executions))
    }

    pub fn is_mock(&self) -> bool {
        self.dispatcher.is_mock()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub async fn handle(&self, client_id: &str, raw_body: &[u8]) -> ChatExchange {
        let request_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        let rate_limit = self.limiter.check_and_consume(client_id);
        let result = if rate_limit.allowed {
            self.process(&request_id, raw_body).await
        } else {
            tracing::warn!(request_id = %request_id, client_id, "rate limit exceeded");
            Err(BridgeError::RateLimited {
                reset_at: rate_limit.reset_at,
            })
        };

        let duration = started.elapsed();
        match &result {
            Ok(reply) => tracing::info!(
                request_id = %request_id,
                duration_ms = duration.as_millis(),
                reply_len = reply.len(),
                "chat request completed"
            ),
            Err(err) => tracing::warn!(
                request_id = %request_id,
                code = err.code(),
                error = %err,
                "chat request failed"
            ),
        }

        ChatExchange {
            request_id,
            duration,
            rate_limit,
            result,
        }
    }

    async fn process(&self, request_id: &str, raw_body: &[u8]) -> Result<String, BridgeError> {
        let body: serde_json::Value = serde_json::from_slice(raw_body)
            .map_err(|e| BridgeError::InvalidJson(e.to_string()))?;
        let request = validate_chat_request(&body)?;

        tracing::info!(
            request_id,
            session_id = %request.session_id,
            mode = %request.mode,
            "dispatching chat request"
        );
        Ok(self.dispatcher.dispatch(&request).await?)
    }

    /// Query an execution once, without waiting for it to settle.
    pub async fn execution_status(
        &self,
        execution_id: &str,
    ) -> Result<ExecutionStatusView, BridgeError> {
        let api = self
            .executions
            .as_ref()
            .ok_or(StatusQueryError::NotConfigured)?;
        let record = api.get_execution(execution_id).await?;

        Ok(match record.phase() {
            ExecutionPhase::Succeeded => ExecutionStatusView::Success {
                output: extract_execution_output(&record).unwrap_or_else(|| {
                    "Execution finished successfully but no output was found.".to_string()
                }),
            },
            ExecutionPhase::Failed => ExecutionStatusView::Error {
                error: extract_execution_error(&record)
                    .unwrap_or_else(|| "Workflow execution failed".to_string()),
            },
            ExecutionPhase::Canceled => ExecutionStatusView::Error {
                error: "Workflow execution was canceled".to_string(),
            },
            ExecutionPhase::InProgress => ExecutionStatusView::Running,
        })
    }
}
