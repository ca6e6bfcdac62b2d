//! Error types for Vigil.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VigilError {
    #[error("Daemon not running. Is vigild started?")]
    DaemonNotRunning,

    #[error("Socket error: {0}")]
    Socket(String),

    #[error("Invalid protection mode: {0}")]
    InvalidMode(u8),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Sensor state unavailable: {0}")]
    SensorState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
