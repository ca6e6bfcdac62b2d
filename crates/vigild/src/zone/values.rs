//! Mutable zone state aggregate.

use vigil_common::{AlarmState, ArmState, ZoneMode};

/// All mutable values of one zone.
///
/// Only the controller mutates this, always under the per-zone lock.
#[derive(Debug, Clone)]
pub struct ZoneValues {
    pub mode: ZoneMode,
    pub arm_state: ArmState,
    pub alarm_state: AlarmState,
    pub alerting_sensor: String,
    pub alarm_siren: bool,
    pub alarm_light: bool,
    pub alarm_call: bool,
    /// Last known aggregate openness of the relevant sensors. Blacklisted
    /// sensors still count here; the blacklist only exempts them from the
    /// must-be-closed requirement.
    pub door_window_open: bool,
}

impl Default for ZoneValues {
    fn default() -> Self {
        Self {
            mode: ZoneMode::Disarmed,
            arm_state: ArmState::Disarmed,
            alarm_state: AlarmState::None,
            alerting_sensor: String::new(),
            alarm_siren: false,
            alarm_light: false,
            alarm_call: false,
            door_window_open: false,
        }
    }
}

impl ZoneValues {
    /// Resets the zone to the all-zero disarmed state.
    pub fn reset(&mut self) {
        *self = ZoneValues {
            door_window_open: self.door_window_open,
            ..ZoneValues::default()
        };
    }

    /// Clears the alarm side state while keeping the requested mode.
    /// Used as the commit pre-state of every armed mode selection.
    pub fn clear_alarm(&mut self) {
        self.alarm_state = AlarmState::None;
        self.alerting_sensor.clear();
        self.alarm_siren = false;
        self.alarm_light = false;
        self.alarm_call = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_returns_to_disarmed() {
        let mut values = ZoneValues {
            mode: ZoneMode::FullProtection,
            arm_state: ArmState::Armed,
            alarm_state: AlarmState::Alarm,
            alerting_sensor: "Haustür".to_string(),
            alarm_siren: true,
            alarm_light: true,
            alarm_call: true,
            door_window_open: true,
        };
        values.reset();
        assert_eq!(values.mode, ZoneMode::Disarmed);
        assert_eq!(values.arm_state, ArmState::Disarmed);
        assert_eq!(values.alarm_state, AlarmState::None);
        assert!(values.alerting_sensor.is_empty());
        assert!(!values.alarm_siren);
        assert!(!values.alarm_light);
        assert!(!values.alarm_call);
    }

    #[test]
    fn test_clear_alarm_keeps_mode() {
        let mut values = ZoneValues {
            mode: ZoneMode::HullProtection,
            alarm_state: AlarmState::PreAlarm,
            alarm_siren: true,
            ..ZoneValues::default()
        };
        values.clear_alarm();
        assert_eq!(values.mode, ZoneMode::HullProtection);
        assert_eq!(values.alarm_state, AlarmState::None);
        assert!(!values.alarm_siren);
    }
}
