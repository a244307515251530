use crate::support::{GatewayTestServer, engine_config, running_execution, succeeded_execution};
use flowbridge::config::Config;
use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn get_status(server: &GatewayTestServer, id: &str) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .get(server.url(&format!("/api/chat/status/{id}")))
        .send()
        .await
        .expect("status request should complete");
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn status_reports_each_phase() {
    let engine = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/executions/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(running_execution("1")))
        .mount(&engine)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/executions/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(succeeded_execution("2", "done")))
        .mount(&engine)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/executions/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "finished": true,
            "status": "success",
            "data": {"resultData": {"runData": {}}}
        })))
        .mount(&engine)
        .await;

    let server = GatewayTestServer::start(engine_config(&engine.uri())).await;

    assert_eq!(
        get_status(&server, "1").await,
        (StatusCode::OK, json!({"status": "running"}))
    );
    assert_eq!(
        get_status(&server, "2").await,
        (StatusCode::OK, json!({"status": "success", "output": "done"}))
    );
    assert_eq!(
        get_status(&server, "3").await,
        (
            StatusCode::OK,
            json!({
                "status": "success",
                "output": "Execution finished successfully but no output was found."
            })
        )
    );
}

#[tokio::test]
async fn status_api_failure_is_reported() {
    let engine = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/executions/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&engine)
        .await;

    let server = GatewayTestServer::start(engine_config(&engine.uri())).await;
    let (status, body) = get_status(&server, "9").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "STATUS_CHECK_FAILED");
    assert_eq!(body["meta"]["requestId"], "internal");
}

#[tokio::test]
async fn status_without_execution_api_fails() {
    let server = GatewayTestServer::start(Config::default()).await;
    let (status, body) = get_status(&server, "1").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "STATUS_CHECK_FAILED");
}

#[tokio::test]
async fn health_reports_engine_mode() {
    let engine = MockServer::start().await;
    let server = GatewayTestServer::start(engine_config(&engine.uri())).await;

    let body: Value = reqwest::get(server.url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["mockMode"], false);
}
