//! Configuration management for vigild.
//!
//! Loads settings from /etc/vigil/config.toml or uses defaults. The config
//! is read-only at runtime: mode selection never mutates it.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use vigil_common::ZoneMode;

/// Config file path
pub const CONFIG_PATH: &str = "/etc/vigil/config.toml";

/// Default config file path for fallback
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/vigil/config.toml";

/// Notification key fired when the zone is disarmed.
pub const DISARMED_NOTIFICATION: &str = "disarmed";

/// Notification key used by the per-sensor sweep over open doors/windows.
pub const OPEN_SENSOR_NOTIFICATION: &str = "open_sensor";

/// Per-mode protection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectionModeConfig {
    /// Whether this mode is available for the zone at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds before a requested activation commits; 0 = immediate
    #[serde(default)]
    pub activation_delay_secs: u64,

    /// Display name used in protocol lines and logs
    #[serde(default)]
    pub display_name: String,

    /// Notification key fired when a delayed activation is scheduled
    #[serde(default)]
    pub delayed_activation_notification: String,

    /// Notification key fired when the sensor check aborts an activation
    #[serde(default)]
    pub abort_activation_notification: String,

    /// Notification key fired on activation with all sensors closed
    #[serde(default)]
    pub activation_notification: String,

    /// Notification key fired on activation with an open (tolerated) sensor
    #[serde(default)]
    pub activation_with_open_sensor_notification: String,
}

fn default_enabled() -> bool {
    true
}

impl ProtectionModeConfig {
    fn preset(display_name: &str, key_prefix: &str) -> Self {
        Self {
            enabled: true,
            activation_delay_secs: 0,
            display_name: display_name.to_string(),
            delayed_activation_notification: format!("{key_prefix}_delayed_activation"),
            abort_activation_notification: format!("{key_prefix}_abort_activation"),
            activation_notification: format!("{key_prefix}_activation"),
            activation_with_open_sensor_notification: format!(
                "{key_prefix}_activation_open_sensor"
            ),
        }
    }
}

/// Per-notification settings, looked up by key after the notification
/// was sent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotificationSetting {
    /// Whether this notification is delivered at all
    #[serde(default, rename = "use")]
    pub use_notification: bool,

    /// Whether this notification is followed by a per-sensor sweep over
    /// currently open doors/windows
    #[serde(default)]
    pub use_open_sensor_notification: bool,

    /// Optional human-readable text; the key is used when empty
    #[serde(default)]
    pub text: String,
}

/// Zone configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Zone name used in protocol lines and notifications
    #[serde(default = "default_zone_name")]
    pub zone_name: String,

    /// Location prefix for protocol lines
    #[serde(default)]
    pub location: String,

    /// Name of the overall system, used in the disarm protocol line
    #[serde(default = "default_system_name")]
    pub system_name: String,

    /// Display name of the disarmed mode
    #[serde(default = "default_disarmed_name")]
    pub disarmed_name: String,

    /// While true, every mode-selection request fails closed
    #[serde(default)]
    pub under_maintenance: bool,

    /// Unix control socket path
    #[serde(default = "default_socket_path")]
    pub socket_path: String,

    /// Alarm protocol file path
    #[serde(default = "default_protocol_path")]
    pub protocol_path: String,

    /// Sensor state file path consumed by the file-backed sensor oracle
    #[serde(default = "default_sensor_state_path")]
    pub sensor_state_path: String,

    #[serde(default = "default_full_protection")]
    pub full_protection: ProtectionModeConfig,

    #[serde(default = "default_hull_protection")]
    pub hull_protection: ProtectionModeConfig,

    #[serde(default = "default_partial_protection")]
    pub partial_protection: ProtectionModeConfig,

    /// Notification settings by key
    #[serde(default = "default_notifications")]
    pub notifications: HashMap<String, NotificationSetting>,
}

fn default_zone_name() -> String {
    "Alarmzone".to_string()
}

fn default_system_name() -> String {
    "Alarmanlage".to_string()
}

fn default_disarmed_name() -> String {
    "Unscharf".to_string()
}

fn default_socket_path() -> String {
    "/run/vigil/vigil.sock".to_string()
}

fn default_protocol_path() -> String {
    "/var/lib/vigil/protocol.log".to_string()
}

fn default_sensor_state_path() -> String {
    "/var/lib/vigil/sensors.json".to_string()
}

fn default_full_protection() -> ProtectionModeConfig {
    ProtectionModeConfig::preset("Vollschutz", "full")
}

fn default_hull_protection() -> ProtectionModeConfig {
    ProtectionModeConfig::preset("Hüllschutz", "hull")
}

fn default_partial_protection() -> ProtectionModeConfig {
    ProtectionModeConfig::preset("Teilschutz", "partial")
}

fn default_notifications() -> HashMap<String, NotificationSetting> {
    let mut table = HashMap::new();
    let enabled = NotificationSetting {
        use_notification: true,
        use_open_sensor_notification: false,
        text: String::new(),
    };
    table.insert(DISARMED_NOTIFICATION.to_string(), enabled.clone());
    table.insert(OPEN_SENSOR_NOTIFICATION.to_string(), enabled.clone());
    for prefix in ["full", "hull", "partial"] {
        table.insert(format!("{prefix}_delayed_activation"), enabled.clone());
        table.insert(format!("{prefix}_abort_activation"), enabled.clone());
        table.insert(format!("{prefix}_activation"), enabled.clone());
        table.insert(
            format!("{prefix}_activation_open_sensor"),
            NotificationSetting {
                use_notification: true,
                use_open_sensor_notification: true,
                text: String::new(),
            },
        );
    }
    table
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            zone_name: default_zone_name(),
            location: String::new(),
            system_name: default_system_name(),
            disarmed_name: default_disarmed_name(),
            under_maintenance: false,
            socket_path: default_socket_path(),
            protocol_path: default_protocol_path(),
            sensor_state_path: default_sensor_state_path(),
            full_protection: default_full_protection(),
            hull_protection: default_hull_protection(),
            partial_protection: default_partial_protection(),
            notifications: default_notifications(),
        }
    }
}

impl ZoneConfig {
    /// Load config with fallback chain
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_PATH)
            .or_else(|_| Self::load_from_path(DEFAULT_CONFIG_PATH))
            .unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                ZoneConfig::default()
            })
    }

    /// Load config from specific path
    pub fn load_from_path(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ZoneConfig = toml::from_str(&content)?;
        info!("Loaded config from {}", path);
        Ok(config)
    }

    /// Save default config to path (for init)
    #[allow(dead_code)]
    pub fn save_default(path: &str) -> Result<()> {
        let config = ZoneConfig::default();
        let content = toml::to_string_pretty(&config)?;
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        info!("Saved default config to {}", path);
        Ok(())
    }

    /// Per-mode protection config; `None` for the disarmed mode.
    pub fn protection_mode(&self, mode: ZoneMode) -> Option<&ProtectionModeConfig> {
        match mode {
            ZoneMode::Disarmed => None,
            ZoneMode::FullProtection => Some(&self.full_protection),
            ZoneMode::HullProtection => Some(&self.hull_protection),
            ZoneMode::PartialProtection => Some(&self.partial_protection),
        }
    }

    /// Display name of a mode, for protocol lines and logs.
    pub fn mode_display_name(&self, mode: ZoneMode) -> &str {
        match self.protection_mode(mode) {
            Some(cfg) => &cfg.display_name,
            None => &self.disarmed_name,
        }
    }

    /// Settings of a notification key. Unknown keys resolve to an
    /// all-disabled setting, never an error.
    pub fn notification(&self, key: &str) -> NotificationSetting {
        self.notifications.get(key).cloned().unwrap_or_default()
    }
}

/// Config-backed maintenance oracle.
pub struct ConfigMaintenance {
    config: std::sync::Arc<ZoneConfig>,
}

impl ConfigMaintenance {
    pub fn new(config: std::sync::Arc<ZoneConfig>) -> Self {
        Self { config }
    }
}

impl crate::traits::MaintenanceOracle for ConfigMaintenance {
    fn is_under_maintenance(&self) -> bool {
        self.config.under_maintenance
    }
}
