//! RPC Server - Unix socket server for daemon-client communication

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{error, info, warn};
use vigil_common::ipc::{Method, Request, Response, ResponseData};
use vigil_common::ZoneMode;

use crate::zone::ZoneController;

/// Start the RPC server
pub async fn start_server(controller: Arc<ZoneController>, socket_path: &str) -> Result<()> {
    // Ensure socket directory exists
    if let Some(socket_dir) = Path::new(socket_path).parent() {
        tokio::fs::create_dir_all(socket_dir)
            .await
            .context("Failed to create socket directory")?;
    }

    // Remove old socket if it exists
    let _ = tokio::fs::remove_file(socket_path).await;

    // Bind to Unix socket
    let listener = UnixListener::bind(socket_path).context("Failed to bind Unix socket")?;

    info!("RPC server listening on {}", socket_path);

    // Accept connections
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let controller = Arc::clone(&controller);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, controller).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Handle a single client connection
async fn handle_connection(stream: UnixStream, controller: Arc<ZoneController>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .context("Failed to read from socket")?;

        if bytes_read == 0 {
            // Connection closed
            break;
        }

        let request: Request = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                warn!("Invalid request JSON: {}", e);
                continue;
            }
        };

        let response = handle_request(request.id, request.method, &controller).await;

        let response_json = serde_json::to_string(&response)? + "\n";
        writer
            .write_all(response_json.as_bytes())
            .await
            .context("Failed to write response")?;
    }

    Ok(())
}

/// Handle a single request
async fn handle_request(id: u64, method: Method, controller: &ZoneController) -> Response {
    let result = match method {
        Method::Ping => Ok(ResponseData::Ok),

        Method::Status => Ok(ResponseData::Status(controller.status().await)),

        Method::SelectMode { mode, sender } => match ZoneMode::try_from(mode) {
            Ok(mode) => {
                let accepted = controller.select_mode(mode, &sender).await;
                Ok(ResponseData::ModeResult { accepted })
            }
            Err(e) => Err(e.to_string()),
        },
    };

    Response { id, result }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZoneConfig;
    use crate::traits::{FakeMaintenance, FakeNotifier, FakeProtocol, FakeSensorOracle};
    use vigil_common::ArmState;

    fn test_controller() -> Arc<ZoneController> {
        ZoneController::new(
            Arc::new(ZoneConfig::default()),
            Arc::new(FakeMaintenance::new(false)),
            Arc::new(FakeSensorOracle::all_closed(&["Haustür"])),
            Arc::new(FakeProtocol::new()),
            Arc::new(FakeNotifier::new()),
        )
    }

    #[tokio::test]
    async fn test_invalid_mode_is_rejected_at_the_boundary() {
        let controller = test_controller();
        let response = handle_request(
            1,
            Method::SelectMode {
                mode: 9,
                sender: "test".to_string(),
            },
            &controller,
        )
        .await;
        assert!(response.result.is_err());
        // The zone never saw the request.
        assert_eq!(controller.status().await.arm_state, ArmState::Disarmed);
    }

    #[tokio::test]
    async fn test_select_mode_round_trip() {
        let controller = test_controller();
        let response = handle_request(
            2,
            Method::SelectMode {
                mode: 1,
                sender: "test".to_string(),
            },
            &controller,
        )
        .await;
        match response.result {
            Ok(ResponseData::ModeResult { accepted }) => assert!(accepted),
            other => panic!("unexpected response: {:?}", other),
        }
        assert_eq!(controller.status().await.arm_state, ArmState::Armed);
    }

    #[tokio::test]
    async fn test_status_reports_zone_name() {
        let controller = test_controller();
        let response = handle_request(3, Method::Status, &controller).await;
        match response.result {
            Ok(ResponseData::Status(status)) => assert_eq!(status.zone_name, "Alarmzone"),
            other => panic!("unexpected response: {:?}", other),
        }
    }
}
