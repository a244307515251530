use super::AppState;
use super::handlers::{handle_chat, handle_health, handle_status};

use crate::config::{Config, GatewayConfig};
use crate::core::ChatBridge;
use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderName, Method, StatusCode, header},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Returns true when the bind address is not a loopback address.
fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

/// Run the HTTP gateway, binding `host:port`.
pub async fn run_gateway(host: &str, port: u16, config: Arc<Config>) -> Result<()> {
    if is_public_bind(host) && !config.gateway.allow_public_bind {
        anyhow::bail!(
            "Refusing to bind to {host}: the gateway would be reachable from other hosts.\n\
             Fix: use --host 127.0.0.1 (default), or set\n\
             [gateway] allow_public_bind = true in config.toml."
        );
    }

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    run_gateway_with_listener(host, listener, config).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Arc<Config>,
) -> Result<()> {
    let actual_port = listener
        .local_addr()
        .context("get gateway listener local address")?
        .port();
    let display_addr = format!("{host}:{actual_port}");

    let bridge = ChatBridge::from_config(&config).context("build chat bridge")?;
    print_gateway_banner(&display_addr, &config, bridge.is_mock());

    let state = AppState {
        bridge: Arc::new(bridge),
    };
    let app = build_app(state, &config.gateway);

    tracing::info!(addr = %display_addr, "gateway started");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve HTTP gateway")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to install ctrl-c handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("gateway shutting down");
}

fn print_gateway_banner(display_addr: &str, config: &Config, mock_mode: bool) {
    println!("Gateway listening on {display_addr}");
    println!("  POST /api/chat");
    println!("  GET  /api/chat/status/{{id}}");
    println!("  GET  /health");
    if mock_mode {
        println!("  Mock mode: no workflow webhook configured");
    } else if config.engine.execution_api().is_none() {
        println!("  Execution API not configured: long-running workflows cannot be polled");
    }
    println!(
        "  Rate limit: {} requests / {}s per client",
        config.rate_limit.max_requests, config.rate_limit.window_secs
    );
}

/// Assemble the router with body-limit, timeout and optional CORS layers.
pub fn build_app(state: AppState, gateway: &GatewayConfig) -> Router {
    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/api/chat", post(handle_chat))
        .route("/api/chat/status/{id}", get(handle_status));

    let mut app = app
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(gateway.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(gateway.request_timeout_secs),
        ));

    if !gateway.cors_origins.is_empty() {
        let origins: Vec<_> = gateway
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .expose_headers([
                    HeaderName::from_static("x-ratelimit-remaining"),
                    HeaderName::from_static("x-ratelimit-reset"),
                ]),
        );
    }

    app
}
