// Run and routing helpers.

use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Json, Router,
};

use crate::server::AppState;
use anyhow::{Context, Result};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({ "ok": true })) }),
        )
        .route("/ws", get(crate::server::ws::ws_handler))
        .route("/signup", post(crate::server::http::signup_handler))
        .route("/login", post(crate::server::http::login_handler))
        .route("/join-game", post(crate::server::http::join_game_handler))
        .with_state(state)
}

pub async fn run_server(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = build_router(state);

    let display_addr = if addr.ip().to_string() == "127.0.0.1" {
        format!("localhost:{}", addr.port())
    } else {
        addr.to_string()
    };
    tracing::info!(display_addr = %display_addr, "tricktable server running");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", display_addr))?;
    let _ = axum::serve(listener, app).await;
    Ok(())
}
