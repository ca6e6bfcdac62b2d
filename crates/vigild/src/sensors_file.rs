//! File-backed sensor oracle.
//!
//! Reads the current door/window state from a JSON file maintained by the
//! sensor integration layer. Each sensor declares which protection modes
//! it is relevant for; the disarmed mode observes all sensors.
//!
//! Any read or parse failure is surfaced as an error so the evaluator
//! treats the state as indeterminate and never silently arms.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use vigil_common::{VigilError, ZoneMode};

use crate::traits::{SensorOracle, SensorReading};

#[derive(Debug, Deserialize)]
struct SensorEntry {
    name: String,
    #[serde(default)]
    open: bool,
    #[serde(default = "default_true")]
    full: bool,
    #[serde(default = "default_true")]
    hull: bool,
    #[serde(default)]
    partial: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct SensorStateFile {
    #[serde(default)]
    sensors: Vec<SensorEntry>,
}

pub struct FileSensorOracle {
    path: PathBuf,
}

impl FileSensorOracle {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SensorOracle for FileSensorOracle {
    fn relevant_sensors(&self, mode: ZoneMode) -> Result<Vec<SensorReading>, VigilError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| VigilError::SensorState(format!("{}: {}", self.path.display(), e)))?;
        let state: SensorStateFile = serde_json::from_str(&content)
            .map_err(|e| VigilError::SensorState(format!("{}: {}", self.path.display(), e)))?;
        Ok(state
            .sensors
            .into_iter()
            .filter(|s| match mode {
                ZoneMode::Disarmed => true,
                ZoneMode::FullProtection => s.full,
                ZoneMode::HullProtection => s.hull,
                ZoneMode::PartialProtection => s.partial,
            })
            .map(|s| SensorReading {
                name: s.name,
                open: s.open,
            })
            .collect())
    }
}
