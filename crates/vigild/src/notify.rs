//! Notification delivery - sends zone notifications via notify-send.
//!
//! The dispatcher resolves the notification setting for a key itself, so
//! disabled notifications are dropped here and not in the controller. The
//! controller still reads the same setting afterwards to decide whether an
//! open-sensor sweep follows.

use std::process::Command;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ZoneConfig;
use crate::traits::Notifier;

pub struct DesktopNotifier {
    config: Arc<ZoneConfig>,
}

impl DesktopNotifier {
    pub fn new(config: Arc<ZoneConfig>) -> Self {
        Self { config }
    }
}

impl Notifier for DesktopNotifier {
    fn send(&self, key: &str, payload: &str) {
        let setting = self.config.notification(key);
        if !setting.use_notification {
            debug!(key, "notification disabled, not sent");
            return;
        }
        let body = render_text(&setting.text, key, payload);
        let result = Command::new("notify-send")
            .args([
                "--app-name",
                "Vigil",
                "--icon",
                "security-high",
                &self.config.zone_name,
                &body,
            ])
            .output();
        match result {
            Ok(output) if output.status.success() => {
                info!(key, "notification sent");
            }
            Ok(_) => {
                warn!(key, "notify-send reported failure");
            }
            Err(e) => {
                warn!(key, "error sending notification: {}", e);
            }
        }
    }
}

/// Builds the notification body from the configured text, falling back to
/// the key itself when no text is configured.
fn render_text(text: &str, key: &str, payload: &str) -> String {
    let base = if text.is_empty() { key } else { text };
    if payload.is_empty() {
        base.to_string()
    } else {
        format!("{} ({})", base, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text_falls_back_to_key() {
        assert_eq!(render_text("", "full_activation", ""), "full_activation");
    }

    #[test]
    fn test_render_text_appends_payload() {
        assert_eq!(
            render_text("Vollschutz wird aktiviert", "full_delayed_activation", "30"),
            "Vollschutz wird aktiviert (30)"
        );
        assert_eq!(render_text("", "open_sensor", "Haustür"), "open_sensor (Haustür)");
    }
}
