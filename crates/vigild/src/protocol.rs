//! Alarm protocol recorder backed by an append-only file.
//!
//! Delivery is fire-and-forget: a failing write is logged and dropped,
//! it never blocks or reverts the state transition it describes.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::traits::{ProtocolRecorder, Severity};

pub struct FileProtocol {
    path: PathBuf,
}

impl FileProtocol {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn append(&self, text: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", text)
    }
}

impl ProtocolRecorder for FileProtocol {
    fn record(&self, text: &str, severity: Severity) {
        info!(target: "protocol", severity = severity as u8, "{}", text);
        if let Err(e) = self.append(text) {
            warn!("failed to append protocol line: {}", e);
        }
    }
}
