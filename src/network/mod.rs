//! Network layer: WebSocket gateway and per-connection tasks.

mod connection;
mod gateway;

pub use connection::Connection;
pub use gateway::Gateway;
