//! Garcon Server - LLM-backed order-taking chat service.
//!
//! This crate provides the HTTP service for garcon:
//! - Chat endpoint forwarding to an OpenAI-compatible completion provider
//! - Per-session bounded conversation history
//! - Order extraction from completion text into an in-memory ledger
//! - Server-rendered admin dashboard over the accumulated orders
//!
//! ## Architecture
//!
//! ```text
//! Widget/App → POST /chat → history append → provider → extract order
//!                                                          ↓
//!                                              ledger ← OrderRecord
//!                                                          ↓
//!                                  GET /orders, GET /admin (dashboard)
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod conversation;
pub mod dashboard;
pub mod extract;
pub mod orders;
pub mod pages;
pub mod provider;
pub mod routes;

pub use conversation::{ChatMessage, ConversationStore, Role};
pub use extract::{extract, Extraction, OrderPayload, ORDER_MARKER};
pub use orders::{OrderLedger, OrderRecord};
pub use provider::{ChatRequest, ChatResponse, CompatibleProvider, Provider, ProviderError};

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use garcon_common::config::Config;

/// Build the service router with all routes and middleware.
pub fn build_router(config: &Config) -> Router {
    let provider = provider::from_config(&config.llm);
    build_router_with_provider(config, provider)
}

/// Build the service router with an explicit completion provider.
/// This is useful for testing with a stub provider.
pub fn build_router_with_provider(config: &Config, provider: Arc<dyn Provider>) -> Router {
    // The chat widget is embedded cross-origin, so CORS stays wide open
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::build_routes(config, provider).layer(cors)
}

/// Start the chat server.
pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    let router = build_router(config);

    tracing::info!("Starting Garcon on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
