//! Exercises the assembled router end to end against a mocked OpenRouter
//! backend, driving HTTP requests through `tower::ServiceExt::oneshot`
//! with `wiremock` standing in for the real upstream.

use std::collections::HashMap;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use config::provider::ProviderKind;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn base_config(mock_uri: &str) -> config::Config {
    config::Config {
        providers: config::provider::ProviderSecrets {
            anthropic_api_key: None,
            gemini_api_key: None,
            openrouter_api_key: Some("test-key".to_string().into()),
            fireworks_api_key: None,
            cerebras_api_key: None,
            moonshot_api_key: None,
            grok_api_key: None,
            base_url_overrides: HashMap::from([(ProviderKind::OpenRouter, mock_uri.to_string())]),
        },
        server: config::server::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            api_key: Some("secret-key".to_string().into()),
        },
        council_models: vec!["meta-llama/llama-3-70b".to_string(), "mistralai/mixtral-8x7b".to_string()],
        chairman_model: "meta-llama/llama-3-70b".to_string(),
        cache_dir: std::env::temp_dir().join("llm-council-test-cache"),
    }
}

fn chat_completion_response(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "content": content } }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30 },
    }))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn rejects_missing_api_key() {
    let mock_server = MockServer::start().await;
    let state = server::state::AppState::new(&base_config(&mock_server.uri()));
    let app = server::router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/council")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "query": "hello" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_and_root_are_public() {
    let mock_server = MockServer::start().await;
    let state = server::state::AppState::new(&base_config(&mock_server.uri()));
    let app = server::router(state);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn rejects_empty_query() {
    let mock_server = MockServer::start().await;
    let state = server::state::AppState::new(&base_config(&mock_server.uri()));
    let app = server::router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/council")
        .header("content-type", "application/json")
        .header("x-council-key", "secret-key")
        .body(Body::from(json!({ "query": "" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn runs_a_full_deliberation_against_mocked_models() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(chat_completion_response(
            "FINAL RANKING: 1. Response A\n2. Response B\n\nThis is a considered answer.",
        ))
        .mount(&mock_server)
        .await;

    let state = server::state::AppState::new(&base_config(&mock_server.uri()));
    let app = server::router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/council")
        .header("content-type", "application/json")
        .header("x-council-key", "secret-key")
        .body(Body::from(json!({ "query": "what is the capital of France?" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["markdown"].as_str().unwrap().contains("LLM Council Deliberation"));
    assert_eq!(body["stage1"].as_array().unwrap().len(), 2);
    assert!(body["stage3"]["response"].as_str().unwrap().contains("considered answer"));
}

#[tokio::test]
async fn final_only_skips_stage_two_and_three_ranking() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(chat_completion_response("a synthesized answer"))
        .mount(&mock_server)
        .await;

    let state = server::state::AppState::new(&base_config(&mock_server.uri()));
    let app = server::router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/council")
        .header("content-type", "application/json")
        .header("x-council-key", "secret-key")
        .body(Body::from(json!({ "query": "hello", "final_only": true }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["stage2"].as_array().unwrap().is_empty());
    assert_eq!(body["metadata"]["final_only"], true);
}

#[tokio::test]
async fn async_job_lifecycle_reaches_completed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(chat_completion_response("FINAL RANKING: 1. Response A\n\nsynthesized"))
        .mount(&mock_server)
        .await;

    let state = server::state::AppState::new(&base_config(&mock_server.uri()));
    let app = server::router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/council/async")
        .header("content-type", "application/json")
        .header("x-council-key", "secret-key")
        .body(Body::from(
            json!({ "query": "hello", "webhook_url": "http://127.0.0.1:1/hook" }).to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let job_id = body["job_id"].as_str().unwrap().to_string();

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
    loop {
        let request = Request::builder()
            .uri(format!("/api/council/jobs/{job_id}"))
            .header("x-council-key", "secret-key")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let body = body_json(response).await;
        let status = body["status"].as_str().unwrap().to_string();
        if status != "pending" && status != "running" {
            assert_eq!(status, "webhook_failed");
            break;
        }
        if std::time::Instant::now() > deadline {
            panic!("job never left pending/running");
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn rejects_invalid_job_status_filter() {
    let mock_server = MockServer::start().await;
    let state = server::state::AppState::new(&base_config(&mock_server.uri()));
    let app = server::router(state);

    let request = Request::builder()
        .uri("/api/council/jobs?status=not-a-status")
        .header("x-council-key", "secret-key")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
