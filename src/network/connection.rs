//! Connection - handles an individual WebSocket client.
//!
//! Each Connection runs in its own tokio task as a `select!` loop over the
//! socket's inbound frames and this connection's outbound event queue. Text
//! frames carry JSON envelopes; everything the daemon pushes to this client
//! goes through the registered mpsc sender. Teardown always releases the
//! session binding, so an abrupt socket loss behaves like a clean leave.

use crate::handlers::{Context, dispatch};
use crate::state::{ConnId, Hub};
use futures_util::{SinkExt, StreamExt};
use pollroom_proto::{ClientEvent, ServerEvent};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info};

/// Outbound queue depth per connection. One second of a busy room fits
/// comfortably; a reader this far behind is effectively dead.
const OUTBOUND_QUEUE: usize = 64;

/// A client connection handler.
pub struct Connection {
    conn_id: ConnId,
    addr: SocketAddr,
    hub: Arc<Hub>,
    ws: WebSocketStream<TcpStream>,
}

impl Connection {
    pub fn new(
        conn_id: ConnId,
        ws: WebSocketStream<TcpStream>,
        addr: SocketAddr,
        hub: Arc<Hub>,
    ) -> Self {
        Self {
            conn_id,
            addr,
            hub,
            ws,
        }
    }

    /// Run the connection until the peer disconnects, then clean up.
    pub async fn run(self) -> anyhow::Result<()> {
        let Self {
            conn_id,
            addr,
            hub,
            ws,
        } = self;
        let (mut sink, mut stream) = ws.split();
        let (tx, mut rx) = mpsc::channel::<ServerEvent>(OUTBOUND_QUEUE);
        hub.register_sender(conn_id, tx.clone());

        let result: anyhow::Result<()> = async {
            loop {
                tokio::select! {
                    outbound = rx.recv() => {
                        let Some(event) = outbound else { break };
                        let text = serde_json::to_string(&event)?;
                        if sink.send(WsMessage::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    frame = stream.next() => {
                        match frame {
                            Some(Ok(WsMessage::Text(text))) => {
                                handle_frame(conn_id, &hub, &tx, &text).await;
                            }
                            Some(Ok(WsMessage::Ping(payload))) => {
                                if sink.send(WsMessage::Pong(payload)).await.is_err() {
                                    break;
                                }
                            }
                            Some(Ok(WsMessage::Close(_))) | None => break,
                            Some(Ok(_)) => {} // binary and control frames ignored
                            Some(Err(e)) => {
                                debug!(conn = %conn_id, error = %e, "WebSocket read error");
                                break;
                            }
                        }
                    }
                }
            }
            Ok(())
        }
        .await;

        // Voluntary close and abrupt loss take the same cleanup path.
        hub.unregister_sender(conn_id);
        hub.remove_participant(conn_id).await;
        info!(conn = %conn_id, %addr, "connection closed");
        result
    }
}

/// Decode one inbound frame and dispatch it.
///
/// Any failure ends here as an `error` event to this connection; room state
/// and other participants are never affected.
async fn handle_frame(
    conn_id: ConnId,
    hub: &Arc<Hub>,
    tx: &mpsc::Sender<ServerEvent>,
    text: &str,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            debug!(conn = %conn_id, error = %e, "malformed client event");
            let _ = tx
                .send(ServerEvent::Error {
                    message: "Malformed request.".to_string(),
                })
                .await;
            return;
        }
    };

    let mut ctx = Context {
        conn_id,
        hub,
        sender: tx,
    };
    if let Err(err) = dispatch(&mut ctx, event).await {
        debug!(conn = %conn_id, code = err.error_code(), error = %err, "request rejected");
        if let Some(reply) = err.to_error_event() {
            let _ = tx.send(reply).await;
        }
    }
}
