//! HTTP transport
//!
//! ```text
//! POST /mcp ──▶ McpServer::handle_line ──▶ JSON-RPC response (200)
//!                                     └──▶ notification (202, empty body)
//! GET /health ──▶ {"status":"healthy", ...}
//! ```

use crate::cors::cors_layer;
use crate::error::Result;
use crate::mcp::McpServer;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy" if responding
    pub status: String,
    /// Server name
    pub name: String,
    /// Server version
    pub version: String,
    /// Number of stored values
    pub stored_values: usize,
    /// Number of history records
    pub history_records: usize,
}

/// Build the HTTP router around a shared server
pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(mcp_handler))
        .route("/health", get(health_handler))
        .layer(cors_layer())
        .with_state(server)
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve(server: Arc<McpServer>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("MCP HTTP transport listening on http://{}/mcp", listener.local_addr()?);
    axum::serve(listener, router(server)).await?;
    Ok(())
}

/// JSON-RPC endpoint
#[instrument(skip(server, body))]
async fn mcp_handler(State(server): State<Arc<McpServer>>, body: String) -> Response {
    debug!("Received: {}", body);
    match server.handle_line(&body).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Liveness endpoint
async fn health_handler(State(server): State<Arc<McpServer>>) -> impl IntoResponse {
    debug!("Health check requested");
    let info = server.info();
    let state = server.state();
    Json(HealthResponse {
        status: "healthy".to_string(),
        name: info.name.clone(),
        version: info.version.clone(),
        stored_values: state.value_count(),
        history_records: state.history_len(),
    })
}
