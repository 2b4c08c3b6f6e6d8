//! Route definitions for the garcon service.
//!
//! Provides the chat endpoint, the order feed, the admin dashboard, static
//! pages, and a health check.

use crate::conversation::{ConversationStore, Role};
use crate::dashboard;
use crate::extract;
use crate::orders::{LedgerStats, OrderLedger, OrderRecord};
use crate::pages;
use crate::provider::{ChatRequest, Message, Provider};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use garcon_common::config::{Config, LlmConfig};

/// Items shown on the dashboard's top-items charts.
const DASHBOARD_TOP_ITEMS: usize = 5;

/// Built-in system prompt for the order-taking assistant.
///
/// The `ORDER_COMPLETE:` line format must stay in sync with the extractor
/// (`crate::extract::ORDER_MARKER`).
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an order-taking assistant for a restaurant. Your ONLY job is taking food orders.

MENU: Zinger Burger Rs.350, Chicken Karahi Rs.850, Biryani Rs.450, Fries Rs.150, Cold Drink Rs.100, Pizza Rs.700

RULES:
- Remember everything said earlier in this conversation.
- If the customer already ordered food, do NOT ask them to order again.
- Once the customer has given a name and phone number, confirm immediately and finish.

FLOW:
1. Customer orders food -> confirm the items and the total, then ask for their name and phone number.
2. Customer gives name and phone -> thank them by name, then append this line exactly:
ORDER_COMPLETE:{"name":"X","phone":"Y","items":["item"],"total":0}

Keep replies SHORT, at most 2-3 lines."#;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConversationStore>,
    pub ledger: Arc<OrderLedger>,
    pub provider: Arc<dyn Provider>,
    pub llm: LlmConfig,
    pub system_prompt: Arc<str>,
    pub default_session: Arc<str>,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub text: String,
    /// Omitted or empty falls back to the shared default session
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Chat response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// Order feed response.
#[derive(Debug, Serialize, Deserialize)]
pub struct OrdersResponse {
    pub total_orders: u64,
    pub orders: Vec<OrderRecord>,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
}

// ============================================================================
// Router
// ============================================================================

/// Build the service routes around the given completion provider.
pub fn build_routes(config: &Config, provider: Arc<dyn Provider>) -> Router {
    let system_prompt: Arc<str> = config
        .chat
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_PROMPT)
        .into();

    let state = AppState {
        store: Arc::new(ConversationStore::with_cap(config.chat.history_cap)),
        ledger: Arc::new(OrderLedger::new()),
        provider,
        llm: config.llm.clone(),
        system_prompt,
        default_session: config.chat.default_session.as_str().into(),
    };

    Router::new()
        .route("/chat", post(chat_handler))
        .route("/orders", get(orders_handler))
        .route("/admin", get(admin_handler))
        .route("/", get(landing_handler))
        .route("/app", get(app_handler))
        .route("/widget.js", get(widget_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat Handler
// ─────────────────────────────────────────────────────────────────────────────

/// One chat turn: append the user message, complete against the full
/// bounded history, append and trim, then lift any embedded order out of
/// the reply before returning it.
async fn chat_handler(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatReply>, (StatusCode, Json<ErrorResponse>)> {
    let session_id = body
        .session_id
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| state.default_session.to_string());

    state.store.append(&session_id, Role::User, body.text);

    let messages: Vec<Message> = state
        .store
        .history(&session_id)
        .iter()
        .map(|m| Message {
            role: m.role.as_str().to_string(),
            content: m.content.clone(),
        })
        .collect();

    let request = ChatRequest {
        model: state.llm.model.clone(),
        messages,
        max_tokens: Some(state.llm.max_tokens),
        temperature: Some(state.llm.temperature),
        system: Some(state.system_prompt.to_string()),
    };

    let reply = state.provider.chat(request).await.map_err(|e| {
        tracing::error!(
            provider = %e.provider,
            model = %e.model,
            error = %e.message,
            "Completion request failed"
        );
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: "Completion provider request failed".into(),
                code: "PROVIDER_ERROR".into(),
            }),
        )
    })?;

    state
        .store
        .append(&session_id, Role::Assistant, reply.content.clone());
    state.store.trim(&session_id);

    let (cleaned, payload) = extract::extract(&reply.content);
    if let Some(payload) = payload {
        let record = state.ledger.record(payload);
        tracing::info!(
            order_id = record.id,
            session = %session_id,
            total = record.total,
            "Order recorded"
        );
    }

    Ok(Json(ChatReply { response: cleaned }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Order Feed and Dashboard
// ─────────────────────────────────────────────────────────────────────────────

/// Full order ledger in insertion order.
async fn orders_handler(State(state): State<AppState>) -> Json<OrdersResponse> {
    let orders = state.ledger.snapshot();
    Json(OrdersResponse {
        total_orders: orders.len() as u64,
        orders,
    })
}

/// Server-rendered admin dashboard, newest orders first.
async fn admin_handler(State(state): State<AppState>) -> Html<String> {
    // Aggregates run over insertion order (tie-breaks are first-encounter);
    // only the table is reversed
    let mut orders = state.ledger.snapshot();
    let stats = LedgerStats::compute(&orders, DASHBOARD_TOP_ITEMS);
    orders.reverse();
    Html(dashboard::render(&stats, &orders))
}

// ─────────────────────────────────────────────────────────────────────────────
// Static Pages
// ─────────────────────────────────────────────────────────────────────────────

async fn landing_handler() -> Html<&'static str> {
    Html(pages::LANDING_HTML)
}

async fn app_handler() -> Html<&'static str> {
    Html(pages::APP_HTML)
}

async fn widget_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        pages::WIDGET_JS,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Health Handler
// ─────────────────────────────────────────────────────────────────────────────

/// Health check handler.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        service: "garcon-server".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_body_session_id_defaults_to_none() {
        let body: ChatBody = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(body.text, "hello");
        assert!(body.session_id.is_none());
    }

    #[test]
    fn chat_body_accepts_session_id() {
        let body: ChatBody =
            serde_json::from_str(r#"{"text": "hi", "session_id": "widget_session_1"}"#).unwrap();
        assert_eq!(body.session_id.as_deref(), Some("widget_session_1"));
    }

    #[test]
    fn system_prompt_carries_marker_format() {
        assert!(DEFAULT_SYSTEM_PROMPT.contains(crate::extract::ORDER_MARKER));
    }
}
