//! `api` crate — HTTP JSON surface over the data gateway.
//!
//! Exposes:
//!   GET    /health
//!   GET    /api/v1/dashboard
//!   GET    /api/v1/products?search={text}
//!   POST   /api/v1/products
//!   GET    /api/v1/users
//!   GET    /api/v1/expenses
//!
//! Reads carry an `x-cache-tags` header; the create endpoint carries
//! `x-invalidated-tags`. Failures render as `{"status", "message"}`.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use gateway::CachedGateway;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<CachedGateway>,
}

impl AppState {
    pub fn new(gateway: CachedGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }
}

/// Build the router with tracing and permissive CORS (the dashboard UI is
/// served from another origin).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/dashboard", get(handlers::dashboard::metrics))
        .route(
            "/api/v1/products",
            get(handlers::products::list).post(handlers::products::create),
        )
        .route("/api/v1/users", get(handlers::users::list))
        .route("/api/v1/expenses", get(handlers::expenses::by_category))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `bind` and serve until Ctrl-C.
pub async fn serve(bind: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("API listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
