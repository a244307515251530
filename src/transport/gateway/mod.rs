//! Axum-based HTTP gateway in front of the chat bridge.
//!
//! - `POST /api/chat` admits, validates and dispatches one chat request
//! - `GET /api/chat/status/{id}` reports a single execution
//! - `GET /health` is a liveness probe
//!
//! Body size is capped and every request runs under a timeout that must
//! outlast the dispatch deadline, so the bridge reports its own timeout
//! codes before the layer cuts the connection.

mod handlers;
mod responses;
mod server;

pub use server::{build_app, run_gateway, run_gateway_with_listener};

use crate::core::ChatBridge;
use std::sync::Arc;

pub const SERVICE_NAME: &str = "flowbridge";

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<ChatBridge>,
}
