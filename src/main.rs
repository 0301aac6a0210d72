//! pollroomd - Room-scoped live poll daemon.
//!
//! Participants join a shared room by code over WebSocket, cast at most one
//! vote each while the countdown runs, and observe synchronized tally and
//! timer updates until the poll closes.

mod config;
mod error;
mod handlers;
mod http;
mod network;
mod state;
mod timer;

use crate::config::Config;
use crate::network::Gateway;
use crate::state::Hub;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(server = %config.server.name, "Starting pollroomd");

    let hub = Hub::new();

    // Health endpoint sidecar
    tokio::spawn(http::run_http_server(config.http.port));

    // WebSocket gateway, runs until shutdown
    let gateway = Gateway::bind(
        config.listen.address,
        config.listen.allow_origins.clone(),
        hub,
    )
    .await?;
    gateway.run().await
}
