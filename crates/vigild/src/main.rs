//! Vigil Daemon - security zone controller
//!
//! Owns the zone state machine and serves mode-change requests over the
//! control socket.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, Level};

use vigild::config::{ConfigMaintenance, ZoneConfig};
use vigild::notify::DesktopNotifier;
use vigild::protocol::FileProtocol;
use vigild::rpc_server;
use vigild::sensors_file::FileSensorOracle;
use vigild::zone::ZoneController;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Vigil Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Arc::new(ZoneConfig::load());
    info!(
        "Zone \"{}\" configured, maintenance: {}",
        config.zone_name, config.under_maintenance
    );

    let controller = ZoneController::new(
        Arc::clone(&config),
        Arc::new(ConfigMaintenance::new(Arc::clone(&config))),
        Arc::new(FileSensorOracle::new(&config.sensor_state_path)),
        Arc::new(FileProtocol::new(&config.protocol_path)),
        Arc::new(DesktopNotifier::new(Arc::clone(&config))),
    );

    let socket_path = config.socket_path.clone();
    tokio::spawn(async move {
        if let Err(e) = rpc_server::start_server(controller, &socket_path).await {
            error!("RPC server error: {}", e);
        }
    });

    info!("Vigil Daemon ready");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down gracefully");

    Ok(())
}
