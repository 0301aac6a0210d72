//! Test WebSocket client speaking the JSON event envelope.

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use pollroom_proto::{ClientEvent, ServerEvent};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Default receive timeout; poll expiry tests wait longer explicitly.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A connected test client.
pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let (ws, _) = connect_async(url).await.context("websocket connect")?;
        Ok(Self { ws })
    }

    /// Send one client event.
    pub async fn send(&mut self, event: &ClientEvent) -> anyhow::Result<()> {
        let text = serde_json::to_string(event)?;
        self.ws.send(Message::Text(text)).await?;
        Ok(())
    }

    /// Receive the next server event, skipping non-text frames.
    pub async fn recv(&mut self) -> anyhow::Result<ServerEvent> {
        self.recv_within(RECV_TIMEOUT).await
    }

    /// Receive the next server event with an explicit timeout.
    pub async fn recv_within(&mut self, timeout: Duration) -> anyhow::Result<ServerEvent> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let frame = tokio::time::timeout_at(deadline, self.ws.next())
                .await
                .context("timed out waiting for server event")?
                .context("connection closed")??;
            if let Message::Text(text) = frame {
                return Ok(serde_json::from_str(&text)?);
            }
        }
    }

    /// Receive events until one matches the predicate, returning it.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<ServerEvent>
    where
        F: FnMut(&ServerEvent) -> bool,
    {
        self.recv_until_within(RECV_TIMEOUT, &mut predicate).await
    }

    /// `recv_until` with an explicit overall timeout.
    pub async fn recv_until_within<F>(
        &mut self,
        timeout: Duration,
        predicate: &mut F,
    ) -> anyhow::Result<ServerEvent>
    where
        F: FnMut(&ServerEvent) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline
                .checked_duration_since(tokio::time::Instant::now())
                .context("timed out waiting for matching event")?;
            let event = self.recv_within(remaining).await?;
            if predicate(&event) {
                return Ok(event);
            }
        }
    }

    /// Close the connection cleanly.
    pub async fn close(mut self) -> anyhow::Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
