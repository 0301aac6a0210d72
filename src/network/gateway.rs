//! Gateway - TCP listener that accepts incoming WebSocket connections.
//!
//! The Gateway binds one socket and spawns a Connection task per client.
//! The WebSocket handshake enforces the configured Origin allow-list
//! (empty list = allow all).

use crate::network::Connection;
use crate::state::Hub;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_hdr_async;
use tracing::{error, info, warn};

/// The Gateway accepts incoming connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    allow_origins: Vec<String>,
    hub: Arc<Hub>,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(
        addr: SocketAddr,
        allow_origins: Vec<String>,
        hub: Arc<Hub>,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "WebSocket listener bound");
        Ok(Self {
            listener,
            allow_origins,
            hub,
        })
    }

    /// The bound address, useful when binding to port 0.
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the gateway, accepting connections forever.
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let hub = Arc::clone(&self.hub);
                    let conn_id = hub.conn_ids.next();
                    let allowed = self.allow_origins.clone();

                    tokio::spawn(async move {
                        // Origin validation callback for the handshake.
                        let origin_callback =
                            |req: &http::Request<()>, response: http::Response<()>| {
                                if allowed.is_empty() {
                                    return Ok(response);
                                }
                                if let Some(origin) =
                                    req.headers().get("Origin").and_then(|o| o.to_str().ok())
                                {
                                    if allowed.iter().any(|a| a == origin || a == "*") {
                                        return Ok(response);
                                    }
                                    warn!(%addr, origin = %origin, "WebSocket origin rejected");
                                }

                                Err(http::Response::builder()
                                    .status(http::StatusCode::FORBIDDEN)
                                    .body(Some("Origin not allowed".to_string()))
                                    .unwrap())
                            };

                        match accept_hdr_async(stream, origin_callback).await {
                            Ok(ws_stream) => {
                                info!(conn = %conn_id, %addr, "WebSocket handshake successful");
                                let connection = Connection::new(conn_id, ws_stream, addr, hub);
                                if let Err(e) = connection.run().await {
                                    error!(conn = %conn_id, %addr, error = %e, "connection error");
                                }
                            }
                            Err(e) => {
                                warn!(%addr, error = %e, "WebSocket handshake failed");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}
