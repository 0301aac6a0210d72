//! Configuration loading and management.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server information.
    pub server: ServerConfig,
    /// WebSocket listener configuration.
    pub listen: ListenConfig,
    /// Health endpoint configuration.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name (e.g., "pollroom.local"), used in logs.
    pub name: String,
}

/// WebSocket listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:3001").
    pub address: SocketAddr,
    /// Allowed Origin headers for the WebSocket handshake.
    /// Empty means all origins are accepted.
    #[serde(default)]
    pub allow_origins: Vec<String>,
}

/// Health endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Port for the `/healthz` HTTP sidecar.
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
