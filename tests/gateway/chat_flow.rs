use crate::support::{
    GatewayTestServer, chat_body, engine_config, running_execution, succeeded_execution,
};
use flowbridge::config::Config;
use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn post_chat(server: &GatewayTestServer, body: &Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(server.url("/api/chat"))
        .header("x-forwarded-for", "203.0.113.10")
        .json(body)
        .send()
        .await
        .expect("chat request should complete")
}

#[tokio::test]
async fn mock_mode_replies_without_an_engine() {
    let server = GatewayTestServer::start(Config::default()).await;

    let response = post_chat(&server, &chat_body("How do I rank?")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-ratelimit-remaining"], "29");

    let body: Value = response.json().await.unwrap();
    let reply = body["reply"].as_str().unwrap();
    assert!(reply.contains("Mock Response"));
    assert!(reply.contains("How do I rank?"));
}

#[tokio::test]
async fn synchronous_webhook_reply_is_returned() {
    let engine = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .and(header("authorization", "Bearer hook-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "inline answer"})))
        .expect(1)
        .mount(&engine)
        .await;

    let server = GatewayTestServer::start(engine_config(&engine.uri())).await;
    let response = post_chat(&server, &chat_body("hi")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["reply"], "inline answer");
}

#[tokio::test]
async fn started_execution_is_polled_to_completion() {
    let engine = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"executionStarted": true, "executionId": 101})),
        )
        .mount(&engine)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/executions/101"))
        .and(query_param("includeData", "true"))
        .and(header("x-n8n-api-key", "api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(running_execution("101")))
        .up_to_n_times(2)
        .mount(&engine)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/executions/101"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(succeeded_execution("101", "full report")),
        )
        .mount(&engine)
        .await;

    let server = GatewayTestServer::start(engine_config(&engine.uri())).await;
    let response = post_chat(&server, &chat_body("audit please")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["reply"], "full report");
}

#[tokio::test]
async fn placeholder_execution_id_falls_back_to_header() {
    let engine = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-n8n-execution-id", "202")
                .set_body_json(json!({
                    "executionStarted": true,
                    "executionId": "{{ $execution.id }}"
                })),
        )
        .mount(&engine)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/executions/202"))
        .respond_with(ResponseTemplate::new(200).set_body_json(succeeded_execution("202", "ok")))
        .mount(&engine)
        .await;

    let server = GatewayTestServer::start(engine_config(&engine.uri())).await;
    let response = post_chat(&server, &chat_body("hi")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["reply"], "ok");
}

#[tokio::test]
async fn failed_execution_maps_to_bad_gateway() {
    let engine = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"executionStarted": true, "executionId": "303"})),
        )
        .mount(&engine)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/executions/303"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "303",
            "finished": true,
            "status": "error",
            "data": {"resultData": {"error": {"message": "node exploded"}}}
        })))
        .mount(&engine)
        .await;

    let server = GatewayTestServer::start(engine_config(&engine.uri())).await;
    let response = post_chat(&server, &chat_body("hi")).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "EXECUTION_FAILED");
    assert_eq!(body["error"]["message"], "node exploded");
    assert_eq!(body["error"]["details"]["executionId"], "303");
    assert!(body["meta"]["requestId"].is_string());
}

#[tokio::test]
async fn exhausted_polling_is_a_gateway_timeout() {
    let engine = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"executionStarted": true, "executionId": "404"})),
        )
        .mount(&engine)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/executions/404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(running_execution("404")))
        .expect(5)
        .mount(&engine)
        .await;

    let server = GatewayTestServer::start(engine_config(&engine.uri())).await;
    let response = post_chat(&server, &chat_body("hi")).await;

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "POLL_TIMEOUT");
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("may still be running")
    );
}

#[tokio::test]
async fn webhook_error_status_is_dispatch_failure() {
    let engine = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("workflow crashed"))
        .mount(&engine)
        .await;

    let server = GatewayTestServer::start(engine_config(&engine.uri())).await;
    let response = post_chat(&server, &chat_body("hi")).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "DISPATCH_FAILED");
}

#[tokio::test]
async fn invalid_requests_never_reach_the_engine() {
    let engine = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output": "x"})))
        .expect(0)
        .mount(&engine)
        .await;

    let server = GatewayTestServer::start(engine_config(&engine.uri())).await;

    let invalid_json = reqwest::Client::new()
        .post(server.url("/api/chat"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(invalid_json.status(), StatusCode::BAD_REQUEST);
    let body: Value = invalid_json.json().await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_JSON");

    let too_long = chat_body(&"x".repeat(4001));
    let response = post_chat(&server, &too_long).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn rate_limit_rejects_excess_requests() {
    let mut config = Config::default();
    config.rate_limit.max_requests = 2;
    let server = GatewayTestServer::start(config).await;

    for expected in ["1", "0"] {
        let response = post_chat(&server, &chat_body("hi")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-remaining"], expected);
    }

    let denied = post_chat(&server, &chat_body("hi")).await;
    assert_eq!(denied.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(denied.headers()["x-ratelimit-remaining"], "0");
    let reset: i64 = denied.headers()["x-ratelimit-reset"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(reset > chrono::Utc::now().timestamp_millis());

    let body: Value = denied.json().await.unwrap();
    assert_eq!(body["error"]["code"], "RATE_LIMIT_EXCEEDED");
}
