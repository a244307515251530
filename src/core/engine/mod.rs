//! Bridge to the remote workflow engine.
//!
//! A dispatch posts the chat request to the engine's webhook. The engine
//! either answers inline or hands back an execution id, in which case the
//! execution record is polled until the run settles.

pub mod client;
pub mod dispatch;
pub mod execution;
pub mod extract;
pub mod mock;
pub mod poller;

pub use client::{
    ExecutionApi, HttpExecutionApi, WebhookBody, WebhookClient, WebhookPayload, WebhookResponse,
    build_engine_client,
};
pub use dispatch::{DispatchOutcome, DispatchSettings, Dispatcher, classify};
pub use execution::{ExecutionPhase, ExecutionRecord, ExecutionStatus};
pub use extract::{extract_execution_error, extract_execution_output, extract_sync_reply};
pub use poller::{ExecutionPoller, PollSettings};
