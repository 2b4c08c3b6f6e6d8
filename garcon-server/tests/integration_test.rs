//! Integration tests for the garcon service.
//!
//! Tests the full HTTP API with a scripted stub provider standing in for
//! the completion backend.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use garcon_common::config::{ChatConfig, Config};
use garcon_server::provider::{ChatRequest, ChatResponse, Provider, ProviderError, TokenUsage};
use garcon_server::routes::{ChatReply, ErrorResponse, OrdersResponse};
use garcon_server::build_router_with_provider;

/// A completion provider that replays scripted replies and records every
/// request it receives.
struct StubProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl StubProvider {
    fn new(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(String::from).map_err(String::from))
                    .collect(),
            ),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(ChatResponse {
                provider: "stub".into(),
                model: request.model,
                content,
                usage: TokenUsage::default(),
                finish_reason: Some("stop".into()),
                latency_ms: 1,
            }),
            Some(Err(message)) => Err(ProviderError {
                provider: "stub".into(),
                model: request.model,
                message,
                status_code: Some(500),
            }),
            None => panic!("stub provider ran out of scripted replies"),
        }
    }
}

/// Test helper to create the router around a stub provider.
fn create_test_app(provider: Arc<StubProvider>) -> axum::Router {
    build_router_with_provider(&Config::default(), provider)
}

/// Helper to make a request and get JSON response.
async fn request_json<T: serde::de::DeserializeOwned>(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, T) {
    let request = Request::builder().method(method).uri(uri);

    let request = if let Some(b) = body {
        request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&b).unwrap()))
            .unwrap()
    } else {
        request.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json: T = serde_json::from_slice(&body).unwrap();

    (status, json)
}

async fn get_text(app: &axum::Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();

    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

// ─────────────────────────────────────────────────────────────────────────────
// Health Check Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(StubProvider::new(vec![]));

    let (status, json): (_, Value) = request_json(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "garcon-server");
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_chat_passthrough_without_marker() {
    let provider = StubProvider::new(vec![Ok("What would you like to order?")]);
    let app = create_test_app(provider.clone());

    let (status, reply): (_, ChatReply) = request_json(
        &app,
        Method::POST,
        "/chat",
        Some(json!({"text": "hello", "session_id": "s1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply.response, "What would you like to order?");

    // No order was recorded
    let (_, orders): (_, OrdersResponse) = request_json(&app, Method::GET, "/orders", None).await;
    assert_eq!(orders.total_orders, 0);
    assert!(orders.orders.is_empty());
}

#[tokio::test]
async fn test_chat_sends_system_prompt_and_history() {
    let provider = StubProvider::new(vec![
        Ok("Got it! One Biryani, total Rs.450. Your name and number?"),
        Ok("Thanks Ali!"),
    ]);
    let app = create_test_app(provider.clone());

    let (_, _): (_, ChatReply) = request_json(
        &app,
        Method::POST,
        "/chat",
        Some(json!({"text": "one biryani", "session_id": "s1"})),
    )
    .await;
    let (_, _): (_, ChatReply) = request_json(
        &app,
        Method::POST,
        "/chat",
        Some(json!({"text": "Ali, 03001234567", "session_id": "s1"})),
    )
    .await;

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);

    // First turn: just the user message, plus the system prompt out-of-band
    assert_eq!(requests[0].messages.len(), 1);
    assert!(requests[0].system.as_ref().unwrap().contains("ORDER_COMPLETE"));

    // Second turn carries the full transcript so far
    assert_eq!(requests[1].messages.len(), 3);
    assert_eq!(requests[1].messages[0].role, "user");
    assert_eq!(requests[1].messages[1].role, "assistant");
    assert_eq!(requests[1].messages[2].content, "Ali, 03001234567");
}

#[tokio::test]
async fn test_chat_extracts_order() {
    let provider = StubProvider::new(vec![Ok(
        r#"Confirmed! ORDER_COMPLETE:{"name":"Ali","phone":"03001234567","items":["Biryani","Cold Drink"],"total":550}"#,
    )]);
    let app = create_test_app(provider);

    let (status, reply): (_, ChatReply) = request_json(
        &app,
        Method::POST,
        "/chat",
        Some(json!({"text": "Ali, 03001234567", "session_id": "s1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply.response, "Confirmed!");

    let (_, orders): (_, OrdersResponse) = request_json(&app, Method::GET, "/orders", None).await;
    assert_eq!(orders.total_orders, 1);
    let order = &orders.orders[0];
    assert_eq!(order.id, 1);
    assert_eq!(order.name, "Ali");
    assert_eq!(order.items, vec!["Biryani", "Cold Drink"]);
    assert_eq!(order.total, 550.0);
}

#[tokio::test]
async fn test_chat_malformed_marker_passes_through() {
    let provider = StubProvider::new(vec![Ok("Done! ORDER_COMPLETE:{bad json")]);
    let app = create_test_app(provider);

    let (status, reply): (_, ChatReply) = request_json(
        &app,
        Method::POST,
        "/chat",
        Some(json!({"text": "order", "session_id": "s1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    // The reply is untouched, dangling marker included
    assert_eq!(reply.response, "Done! ORDER_COMPLETE:{bad json");

    let (_, orders): (_, OrdersResponse) = request_json(&app, Method::GET, "/orders", None).await;
    assert_eq!(orders.total_orders, 0);
}

#[tokio::test]
async fn test_order_ids_accumulate() {
    let provider = StubProvider::new(vec![
        Ok(r#"ORDER_COMPLETE:{"name":"A","total":100}"#),
        Ok(r#"ORDER_COMPLETE:{"name":"B","total":200}"#),
        Ok(r#"ORDER_COMPLETE:{"name":"C","total":300}"#),
    ]);
    let app = create_test_app(provider);

    for _ in 0..3 {
        let (_, _): (_, ChatReply) =
            request_json(&app, Method::POST, "/chat", Some(json!({"text": "go"}))).await;
    }

    let (_, orders): (_, OrdersResponse) = request_json(&app, Method::GET, "/orders", None).await;
    assert_eq!(orders.total_orders, 3);
    let ids: Vec<u64> = orders.orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let provider = StubProvider::new(vec![Ok("hi a"), Ok("hi b")]);
    let app = create_test_app(provider.clone());

    let (_, _): (_, ChatReply) = request_json(
        &app,
        Method::POST,
        "/chat",
        Some(json!({"text": "from a", "session_id": "a"})),
    )
    .await;
    let (_, _): (_, ChatReply) = request_json(
        &app,
        Method::POST,
        "/chat",
        Some(json!({"text": "from b", "session_id": "b"})),
    )
    .await;

    let requests = provider.requests();
    // Session b sees only its own message, not a's transcript
    assert_eq!(requests[1].messages.len(), 1);
    assert_eq!(requests[1].messages[0].content, "from b");
}

#[tokio::test]
async fn test_omitted_session_id_shares_default_session() {
    let provider = StubProvider::new(vec![Ok("first"), Ok("second")]);
    let app = create_test_app(provider.clone());

    let (_, _): (_, ChatReply) =
        request_json(&app, Method::POST, "/chat", Some(json!({"text": "one"}))).await;
    // An empty session id falls back to the same shared session
    let (_, _): (_, ChatReply) = request_json(
        &app,
        Method::POST,
        "/chat",
        Some(json!({"text": "two", "session_id": ""})),
    )
    .await;

    let requests = provider.requests();
    // Second turn sees the first turn's transcript
    assert_eq!(requests[1].messages.len(), 3);
    assert_eq!(requests[1].messages[0].content, "one");
}

#[tokio::test]
async fn test_history_sent_to_provider_is_bounded() {
    let replies: Vec<Result<&str, &str>> = (0..12).map(|_| Ok("ok")).collect();
    let provider = StubProvider::new(replies);

    let config = Config {
        chat: ChatConfig {
            history_cap: 4,
            ..Default::default()
        },
        ..Default::default()
    };
    let app = build_router_with_provider(&config, provider.clone());

    for i in 0..12 {
        let (_, _): (_, ChatReply) = request_json(
            &app,
            Method::POST,
            "/chat",
            Some(json!({"text": format!("msg {i}"), "session_id": "s"})),
        )
        .await;
    }

    // Trimmed history (cap) plus the just-appended user message
    let requests = provider.requests();
    assert_eq!(requests.last().unwrap().messages.len(), 5);
}

#[tokio::test]
async fn test_provider_failure_surfaces_as_bad_gateway() {
    let provider = StubProvider::new(vec![Err("connection refused")]);
    let app = create_test_app(provider);

    let (status, error): (_, ErrorResponse) = request_json(
        &app,
        Method::POST,
        "/chat",
        Some(json!({"text": "hello", "session_id": "s1"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error.code, "PROVIDER_ERROR");
}

// ─────────────────────────────────────────────────────────────────────────────
// Dashboard and Static Page Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_admin_dashboard_renders_orders() {
    let provider = StubProvider::new(vec![
        Ok(r#"Confirmed! ORDER_COMPLETE:{"name":"Ali","phone":"0300","items":["Biryani"],"total":450}"#),
        Ok(r#"Confirmed! ORDER_COMPLETE:{"name":"Sara","phone":"0311","items":["Biryani","Fries"],"total":600}"#),
    ]);
    let app = create_test_app(provider);

    for _ in 0..2 {
        let (_, _): (_, ChatReply) =
            request_json(&app, Method::POST, "/chat", Some(json!({"text": "go"}))).await;
    }

    let (status, content_type, html) = get_text(&app, "/admin").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(html.contains("<b>Ali</b>"));
    assert!(html.contains("<b>Sara</b>"));
    assert!(html.contains("Rs.1050"));
    assert!(html.contains("Biryani"));
    // Newest first: Sara's row comes before Ali's
    assert!(html.find("Sara").unwrap() < html.find("Ali").unwrap());
}

#[tokio::test]
async fn test_admin_dashboard_empty() {
    let app = create_test_app(StubProvider::new(vec![]));

    let (status, _, html) = get_text(&app, "/admin").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No orders yet"));
}

#[tokio::test]
async fn test_static_pages() {
    let app = create_test_app(StubProvider::new(vec![]));

    let (status, content_type, body) = get_text(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(body.contains("<!DOCTYPE html>"));

    let (status, content_type, body) = get_text(&app, "/app").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(body.contains("chat-form"));
}

#[tokio::test]
async fn test_widget_script_content_type() {
    let app = create_test_app(StubProvider::new(vec![]));

    let (status, content_type, body) = get_text(&app, "/widget.js").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("application/javascript"));
    assert!(body.contains("garcon-btn"));
}
