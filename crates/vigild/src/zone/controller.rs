//! Mode selection and activation commit.
//!
//! `select_mode` is the single entry point for arming and disarming a
//! zone. Side effects are strictly ordered on every path: state mutation,
//! then protocol write, then primary notification, then the conditional
//! open-sensor sweep. Protocol and notification calls never run before the
//! state mutation they describe.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};
use vigil_common::{ArmState, ZoneMode, ZoneStatus};

use super::scheduler::ActivationScheduler;
use super::sensors::SensorCheck;
use super::{Blacklist, ZoneValues};
use crate::config::{ZoneConfig, DISARMED_NOTIFICATION};
use crate::traits::{MaintenanceOracle, Notifier, ProtocolRecorder, SensorOracle, Severity};

/// Pause before an open-sensor sweep, giving downstream notification
/// channels time to settle.
pub(crate) const INTER_STEP_DELAY: Duration = Duration::from_millis(100);

/// Protocol text of an activation aborted by the sensor check.
pub(crate) const ABORT_TEXT: &str =
    "Die Aktivierung wurde durch die Sensorenprüfung abgebrochen!";

/// Lock-protected mutable part of a zone.
pub(crate) struct ZoneInner {
    pub(crate) values: ZoneValues,
    pub(crate) blacklist: Blacklist,
}

/// The arming/disarming decision core of one zone.
///
/// Exactly one mode selection or timer-expiry commit is in flight at a
/// time; the inner mutex serializes them. A timer firing mid-way through a
/// manual `select_mode` call waits for the lock and then detects that it
/// went stale.
pub struct ZoneController {
    pub(crate) config: Arc<ZoneConfig>,
    pub(crate) maintenance: Arc<dyn MaintenanceOracle>,
    pub(crate) sensors: Arc<dyn SensorOracle>,
    pub(crate) protocol: Arc<dyn ProtocolRecorder>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) inner: Mutex<ZoneInner>,
    pub(crate) scheduler: ActivationScheduler,
    pub(crate) self_ref: Weak<ZoneController>,
}

impl ZoneController {
    pub fn new(
        config: Arc<ZoneConfig>,
        maintenance: Arc<dyn MaintenanceOracle>,
        sensors: Arc<dyn SensorOracle>,
        protocol: Arc<dyn ProtocolRecorder>,
        notifier: Arc<dyn Notifier>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            config,
            maintenance,
            sensors,
            protocol,
            notifier,
            inner: Mutex::new(ZoneInner {
                values: ZoneValues::default(),
                blacklist: Blacklist::new(),
            }),
            scheduler: ActivationScheduler::new(),
            self_ref: self_ref.clone(),
        })
    }

    /// Selects the protection mode.
    ///
    /// Returns false when the request was rejected (maintenance active,
    /// mode disabled) or when an immediate activation was aborted by the
    /// sensor check. A scheduled delayed activation returns true right
    /// away; its commit outcome surfaces through protocol and
    /// notifications when the timer fires.
    pub async fn select_mode(&self, mode: ZoneMode, sender_id: &str) -> bool {
        debug!(
            mode = %self.config.mode_display_name(mode),
            sender = sender_id,
            "mode selection requested"
        );
        if self.maintenance.is_under_maintenance() {
            debug!("under maintenance, request rejected");
            return false;
        }
        let mut zone = self.inner.lock().await;
        match mode {
            ZoneMode::Disarmed => {
                self.disarm_locked(&mut zone, sender_id);
                true
            }
            armed => self.arm_locked(&mut zone, armed, sender_id).await,
        }
    }

    /// Timer-fired entry point; commits or aborts the pending delayed
    /// activation based on the current sensor state.
    pub async fn on_activation_timer_expired(&self) {
        let mut zone = self.inner.lock().await;
        self.start_activation_locked(&mut zone).await;
    }

    /// Read-only snapshot for the control socket.
    pub async fn status(&self) -> ZoneStatus {
        let zone = self.inner.lock().await;
        ZoneStatus {
            zone_name: self.config.zone_name.clone(),
            mode: zone.values.mode,
            arm_state: zone.values.arm_state,
            alarm_state: zone.values.alarm_state,
            alerting_sensor: zone.values.alerting_sensor.clone(),
            alarm_siren: zone.values.alarm_siren,
            alarm_light: zone.values.alarm_light,
            alarm_call: zone.values.alarm_call,
            door_window_open: zone.values.door_window_open,
            pending_activation_secs: self.scheduler.pending(),
        }
    }

    fn disarm_locked(&self, zone: &mut ZoneInner, sender_id: &str) {
        zone.values.reset();
        zone.blacklist.clear();
        self.cancel_activation_timer();
        let text = format!("{} deaktiviert. (ID {})", self.config.system_name, sender_id);
        self.record_protocol(&text, Severity::Success);
        self.notifier.send(DISARMED_NOTIFICATION, "");
        // State observation only; keeps door_window_open current.
        self.check_door_window_state(zone, ZoneMode::Disarmed, SensorCheck::observe());
    }

    async fn arm_locked(&self, zone: &mut ZoneInner, mode: ZoneMode, sender_id: &str) -> bool {
        let Some(cfg) = self.config.protection_mode(mode) else {
            return false;
        };
        if !cfg.enabled {
            warn!(
                "mode {} is disabled and not available for this zone",
                cfg.display_name
            );
            return false;
        }

        zone.values.mode = mode;
        zone.values.clear_alarm();
        zone.blacklist.clear();

        let mut result = true;
        if cfg.activation_delay_secs > 0 {
            // Capture the door/window state; the commit happens when the
            // timer fires.
            self.check_door_window_state(zone, mode, SensorCheck::observe());
            self.arm_activation_timer(cfg.activation_delay_secs);
            zone.values.arm_state = if zone.values.door_window_open {
                ArmState::DelayedPartialArmed
            } else {
                ArmState::DelayedArmed
            };
            let text = format!(
                "{} wird in {} Sekunden automatisch aktiviert. (ID {})",
                cfg.display_name, cfg.activation_delay_secs, sender_id
            );
            self.record_protocol(&text, Severity::Info);
            self.notifier.send(
                &cfg.delayed_activation_notification,
                &cfg.activation_delay_secs.to_string(),
            );
            // The open-sensor sweep runs when the timer commits, not here.
        } else {
            let activation = self.check_door_window_state(zone, mode, SensorCheck::observe());
            debug!(activation, "immediate activation sensor check");
            if !activation {
                result = false;
                zone.values.reset();
                zone.blacklist.clear();
                self.cancel_activation_timer();
                self.record_protocol(ABORT_TEXT, Severity::Info);
                self.notifier.send(&cfg.abort_activation_notification, "");
                self.open_sensor_sweep_if_requested(zone, mode, &cfg.abort_activation_notification)
                    .await;
            } else {
                // Blacklist anything that opened since the feasibility
                // check so the open state is tolerated from here on.
                self.check_door_window_state(zone, mode, SensorCheck::commit());
                zone.values.arm_state = if zone.values.door_window_open {
                    ArmState::PartialArmed
                } else {
                    ArmState::Armed
                };
                let text = format!("{} aktiviert. (ID {})", cfg.display_name, sender_id);
                self.record_protocol(&text, Severity::Success);
                let key = if zone.values.door_window_open {
                    &cfg.activation_with_open_sensor_notification
                } else {
                    &cfg.activation_notification
                };
                self.notifier.send(key, "");
                self.open_sensor_sweep_if_requested(zone, mode, key).await;
            }
        }
        result
    }

    /// Commits or aborts a delayed activation. Reached only through the
    /// activation timer; mirrors the immediate branch of `arm_locked` but
    /// has no caller to report to.
    pub(crate) async fn start_activation_locked(&self, zone: &mut ZoneInner) {
        self.cancel_activation_timer();
        if self.maintenance.is_under_maintenance() {
            return;
        }
        let mode = zone.values.mode;
        let Some(cfg) = self.config.protection_mode(mode) else {
            // Disarmed in the meantime; nothing to commit.
            return;
        };
        if !cfg.enabled {
            warn!(
                "mode {} became disabled between scheduling and firing",
                cfg.display_name
            );
            return;
        }
        let activation = self.check_door_window_state(zone, mode, SensorCheck::commit());
        debug!(activation, "delayed activation sensor check");
        if !activation {
            zone.values.reset();
            zone.blacklist.clear();
            self.record_protocol(ABORT_TEXT, Severity::Info);
            self.notifier.send(&cfg.abort_activation_notification, "");
            self.open_sensor_sweep_if_requested(zone, mode, &cfg.abort_activation_notification)
                .await;
        } else {
            zone.values.arm_state = if zone.values.door_window_open {
                ArmState::PartialArmed
            } else {
                ArmState::Armed
            };
            let text = format!("{} aktiviert. (Einschaltverzögerung)", cfg.display_name);
            self.record_protocol(&text, Severity::Success);
            let key = if zone.values.door_window_open {
                &cfg.activation_with_open_sensor_notification
            } else {
                &cfg.activation_notification
            };
            self.notifier.send(key, "");
            self.open_sensor_sweep_if_requested(zone, mode, key).await;
        }
    }

    /// Runs the per-sensor notification sweep if the setting of the
    /// notification that just fired requests it.
    async fn open_sensor_sweep_if_requested(
        &self,
        zone: &mut ZoneInner,
        mode: ZoneMode,
        key: &str,
    ) {
        let setting = self.config.notification(key);
        if !(setting.use_notification && setting.use_open_sensor_notification) {
            return;
        }
        tokio::time::sleep(INTER_STEP_DELAY).await;
        self.check_door_window_state(zone, mode, SensorCheck::notify_sweep());
    }

    pub(crate) fn record_protocol(&self, text: &str, severity: Severity) {
        let timestamp = chrono::Local::now().format("%d.%m.%Y, %H:%M:%S");
        let line = format!(
            "{}, {}, {}, {}",
            timestamp, self.config.location, self.config.zone_name, text
        );
        self.protocol.record(&line, severity);
    }
}
