use flowbridge::config::Config;
use flowbridge::transport::gateway::run_gateway_with_listener;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

pub struct GatewayTestServer {
    port: u16,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl GatewayTestServer {
    pub async fn start(config: Config) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let host = "127.0.0.1".to_string();
        let config = Arc::new(config);
        let handle =
            tokio::spawn(async move { run_gateway_with_listener(&host, listener, config).await });

        wait_until_gateway_ready(port).await;

        Self { port, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn wait_until_gateway_ready(port: u16) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("reqwest client should be built");

    for _ in 0..80 {
        let health = client
            .get(format!("http://127.0.0.1:{port}/health"))
            .send()
            .await;
        if matches!(health, Ok(resp) if resp.status() == StatusCode::OK) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("gateway did not become ready on port {port}");
}

/// Config pointing both engine endpoints at a mock server, polling quickly.
pub fn engine_config(engine_uri: &str) -> Config {
    let mut config = Config::default();
    config.engine.webhook_url = Some(format!("{engine_uri}/webhook/chat"));
    config.engine.webhook_token = Some("hook-token".to_string());
    config.engine.api_url = Some(format!("{engine_uri}/api/v1"));
    config.engine.api_key = Some("api-key".to_string());
    config.engine.initial_timeout_secs = 5;
    config.engine.polling.interval_ms = 10;
    config.engine.polling.max_attempts = 5;
    config.engine.polling.timeout_secs = 5;
    config.engine.request_deadline_secs = 10;
    config
}

pub fn chat_body(message: &str) -> Value {
    json!({
        "sessionId": "session-42",
        "message": message,
        "mode": "quick",
        "context": {"domain": "example.com", "market": "DE", "goals": ["leads"], "notes": ""}
    })
}

pub fn succeeded_execution(id: &str, output: &str) -> Value {
    json!({
        "id": id,
        "finished": true,
        "status": "success",
        "data": {"resultData": {
            "lastNodeExecuted": "Agent",
            "runData": {"Agent": [{"data": {"main": [[{"json": {"output": output}}]]}}]}
        }}
    })
}

pub fn running_execution(id: &str) -> Value {
    json!({"id": id, "finished": false, "status": "running"})
}
