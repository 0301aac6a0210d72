//! HTTP server for the health endpoint.
//!
//! Runs on a separate tokio task and serves `GET /healthz` for liveness
//! probes.

use axum::{Router, routing::get};
use std::net::SocketAddr;

/// Handler for GET /healthz.
async fn healthz_handler() -> &'static str {
    "ok"
}

/// Run the HTTP sidecar.
///
/// Binds to `0.0.0.0:port` and serves the `/healthz` endpoint. This is a
/// long-running task that should be spawned in the background.
pub async fn run_http_server(port: u16) {
    let app = Router::new().route("/healthz", get(healthz_handler));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Health HTTP server listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind HTTP server on {}: {}", addr, e);
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("HTTP server error: {}", e);
    }
}
