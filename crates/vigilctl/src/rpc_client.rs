//! RPC Client - Unix socket client for communicating with the daemon

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use vigil_common::ipc::{Method, Request, Response, ResponseData};

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Default control socket path
pub const SOCKET_PATH: &str = "/run/vigil/vigil.sock";

/// RPC client for communicating with the daemon
pub struct RpcClient {
    reader: BufReader<tokio::net::unix::OwnedReadHalf>,
    writer: tokio::net::unix::OwnedWriteHalf,
}

impl RpcClient {
    /// Discover socket path.
    ///
    /// Priority:
    /// 1. Explicit --socket flag (passed as argument)
    /// 2. $VIGILD_SOCKET environment variable
    /// 3. /run/vigil/vigil.sock (default)
    pub fn discover_socket_path(explicit_path: Option<&str>) -> String {
        if let Some(path) = explicit_path {
            return path.to_string();
        }
        if let Ok(path) = std::env::var("VIGILD_SOCKET") {
            return path;
        }
        SOCKET_PATH.to_string()
    }

    /// Connect to the daemon with a short timeout.
    pub async fn connect(socket_path: Option<&str>) -> Result<Self> {
        let path = Self::discover_socket_path(socket_path);
        match tokio::time::timeout(Duration::from_millis(500), UnixStream::connect(&path)).await {
            Ok(Ok(stream)) => {
                let (reader, writer) = stream.into_split();
                Ok(Self {
                    reader: BufReader::new(reader),
                    writer,
                })
            }
            Ok(Err(e)) => Err(anyhow::anyhow!(
                "Daemon unavailable at {}: {}. Is vigild running?",
                path,
                e
            )),
            Err(_) => Err(anyhow::anyhow!("Connection timeout at {}", path)),
        }
    }

    /// Send a request and wait for the matching response.
    pub async fn call(&mut self, method: Method) -> Result<ResponseData> {
        let id = REQUEST_ID.fetch_add(1, Ordering::SeqCst);
        let request = Request { id, method };
        let request_json = serde_json::to_string(&request)? + "\n";
        self.writer
            .write_all(request_json.as_bytes())
            .await
            .context("Failed to write request")?;

        let mut line = String::new();
        let bytes_read = self
            .reader
            .read_line(&mut line)
            .await
            .context("Failed to read response")?;
        if bytes_read == 0 {
            anyhow::bail!("Daemon closed the connection");
        }

        let response: Response = serde_json::from_str(&line).context("Invalid response JSON")?;
        if response.id != id {
            anyhow::bail!("Response id mismatch: expected {}, got {}", id, response.id);
        }
        response.result.map_err(|e| anyhow::anyhow!(e))
    }
}
