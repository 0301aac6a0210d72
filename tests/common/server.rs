//! Test server management.
//!
//! Spawns and manages pollroomd instances for integration testing.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    data_dir: PathBuf,
}

impl TestServer {
    /// Spawn a new test server listening on the given WebSocket port.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        let data_dir = std::env::temp_dir().join(format!("pollroomd-test-{}", port));
        std::fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join("config.toml");
        let config_content = format!(
            r#"
[server]
name = "test.pollroom"

[listen]
address = "127.0.0.1:{}"

[http]
port = 0
"#,
            port
        );
        std::fs::write(&config_path, config_content)?;

        let child = Command::new(env!("CARGO_BIN_EXE_pollroomd"))
            .arg(&config_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let server = Self {
            child,
            port,
            data_dir,
        };

        // Wait until the listener accepts connections.
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", port))
                .await
                .is_ok()
            {
                return Ok(server);
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("test server did not start listening on port {}", port)
    }

    /// WebSocket URL of this server.
    pub fn url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}
