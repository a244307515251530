use crate::core::chat::ValidationErrors;
use chrono::{DateTime, Utc};
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `Flowbridge`.
///
/// Every variant maps to a stable, caller-visible code via [`BridgeError::code`].
/// Internal plumbing (config loading, CLI, server startup) keeps using
/// `anyhow::Result` for context chains.
#[derive(Debug, Error)]
pub enum BridgeError {
    // ── Client errors ───────────────────────────────────────────────────
    #[error("Rate limit exceeded. Try again after {}", reset_at.to_rfc3339())]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("Request body must be valid JSON")]
    InvalidJson(String),

    #[error("{0}")]
    Validation(ValidationErrors),

    // ── Dispatch / execution ────────────────────────────────────────────
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    StatusCheck(#[from] StatusQueryError),
}

impl BridgeError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            Self::InvalidJson(_) => "INVALID_JSON",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Dispatch(err) => err.code(),
            Self::StatusCheck(_) => "STATUS_CHECK_FAILED",
        }
    }
}

impl From<ValidationErrors> for BridgeError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

// ─── Dispatch errors ─────────────────────────────────────────────────────────

/// Failures of a single dispatch, from the initial webhook call through polling.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Initial request to workflow webhook timed out after {timeout_secs}s")]
    InitialTimeout { timeout_secs: u64 },

    #[error("workflow webhook request failed: {0}")]
    Network(String),

    #[error("workflow webhook returned status {status}")]
    WebhookStatus { status: u16, body: String },

    #[error(
        "workflow engine returned an invalid execution ID format ({raw}). \
         Ensure the workflow evaluates its execution id expression."
    )]
    InvalidExecutionId { raw: String },

    #[error(
        "Unexpected response format from workflow engine. Expected a field like \
         \"output\", \"reply\", \"message\", or \"text\". Received: {raw}"
    )]
    UnexpectedFormat { raw: String },

    #[error(
        "execution {execution_id} started but the execution API is not configured; \
         poll it through the status endpoint"
    )]
    PollingUnavailable { execution_id: String },

    #[error(
        "request deadline exceeded while waiting for execution {execution_id}; \
         it may still be running"
    )]
    DeadlineExceeded { execution_id: String },

    #[error(transparent)]
    Poll(#[from] PollError),
}

impl DispatchError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InitialTimeout { .. } => "DISPATCH_TIMEOUT",
            Self::Network(_) | Self::WebhookStatus { .. } => "DISPATCH_FAILED",
            Self::InvalidExecutionId { .. } => "INVALID_EXECUTION_ID",
            Self::UnexpectedFormat { .. } => "UNEXPECTED_RESPONSE",
            Self::PollingUnavailable { .. } => "POLLING_UNAVAILABLE",
            Self::DeadlineExceeded { .. } => "POLL_TIMEOUT",
            Self::Poll(err) => err.code(),
        }
    }

    /// Execution the failure refers to, once the engine has started one.
    pub fn execution_id(&self) -> Option<&str> {
        match self {
            Self::PollingUnavailable { execution_id } | Self::DeadlineExceeded { execution_id } => {
                Some(execution_id)
            }
            Self::Poll(
                PollError::ExecutionFailed { execution_id, .. }
                | PollError::Canceled { execution_id }
                | PollError::NoOutput { execution_id }
                | PollError::TimedOut { execution_id, .. }
                | PollError::AttemptsExhausted { execution_id, .. },
            ) => Some(execution_id),
            _ => None,
        }
    }
}

// ─── Polling errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PollError {
    #[error("{message}")]
    ExecutionFailed {
        execution_id: String,
        message: String,
    },

    #[error("Workflow execution was canceled")]
    Canceled { execution_id: String },

    #[error("No output found in execution result")]
    NoOutput { execution_id: String },

    #[error(
        "Polling timeout after {timeout_ms}ms. Execution {execution_id} may still be running."
    )]
    TimedOut {
        execution_id: String,
        timeout_ms: u64,
    },

    #[error(
        "Max polling attempts ({attempts}) reached for execution {execution_id}. \
         Workflow may still be running."
    )]
    AttemptsExhausted { execution_id: String, attempts: u32 },
}

impl PollError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ExecutionFailed { .. } => "EXECUTION_FAILED",
            Self::Canceled { .. } => "EXECUTION_CANCELED",
            Self::NoOutput { .. } => "EXECUTION_NO_OUTPUT",
            Self::TimedOut { .. } | Self::AttemptsExhausted { .. } => "POLL_TIMEOUT",
        }
    }

    /// True when the remote execution may still be progressing.
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, Self::TimedOut { .. } | Self::AttemptsExhausted { .. })
    }
}

// ─── Status query errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StatusQueryError {
    #[error("execution API is not configured")]
    NotConfigured,

    #[error("execution API request failed: {0}")]
    Network(String),

    #[error("execution API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("execution API returned an undecodable record: {0}")]
    Decode(String),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validation(String),
}
