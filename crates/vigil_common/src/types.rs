//! Zone state enums and the status snapshot exchanged over IPC.

use serde::{Deserialize, Serialize};

/// Requested protection mode of a zone.
///
/// The numeric codes are part of the control protocol and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneMode {
    Disarmed,
    FullProtection,
    HullProtection,
    PartialProtection,
}

impl ZoneMode {
    pub fn code(&self) -> u8 {
        match self {
            ZoneMode::Disarmed => 0,
            ZoneMode::FullProtection => 1,
            ZoneMode::HullProtection => 2,
            ZoneMode::PartialProtection => 3,
        }
    }

    /// Whether this mode arms the zone at all.
    pub fn is_armed_mode(&self) -> bool {
        !matches!(self, ZoneMode::Disarmed)
    }
}

impl TryFrom<u8> for ZoneMode {
    type Error = crate::VigilError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ZoneMode::Disarmed),
            1 => Ok(ZoneMode::FullProtection),
            2 => Ok(ZoneMode::HullProtection),
            3 => Ok(ZoneMode::PartialProtection),
            other => Err(crate::VigilError::InvalidMode(other)),
        }
    }
}

/// Coarse externally visible arming state of a zone.
///
/// Fully determined by the mode and the door/window aggregate at commit
/// time: the partial variants are selected iff a relevant sensor was open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmState {
    Disarmed,
    Armed,
    DelayedArmed,
    PartialArmed,
    DelayedPartialArmed,
}

impl ArmState {
    pub fn code(&self) -> u8 {
        match self {
            ArmState::Disarmed => 0,
            ArmState::Armed => 1,
            ArmState::DelayedArmed => 2,
            ArmState::PartialArmed => 3,
            ArmState::DelayedPartialArmed => 4,
        }
    }
}

/// Alarm side state. The controller only ever resets this to `None`;
/// raising alarms is the detection layer's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmState {
    None,
    Alarm,
    PreAlarm,
}

/// Read-only snapshot of a zone, served over the control socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneStatus {
    pub zone_name: String,
    pub mode: ZoneMode,
    pub arm_state: ArmState,
    pub alarm_state: AlarmState,
    pub alerting_sensor: String,
    pub alarm_siren: bool,
    pub alarm_light: bool,
    pub alarm_call: bool,
    pub door_window_open: bool,
    /// Seconds of the currently pending delayed activation, if any.
    pub pending_activation_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_codes_round_trip() {
        for code in 0..=3u8 {
            let mode = ZoneMode::try_from(code).unwrap();
            assert_eq!(mode.code(), code);
        }
    }

    #[test]
    fn test_invalid_mode_rejected() {
        assert!(ZoneMode::try_from(4).is_err());
        assert!(ZoneMode::try_from(255).is_err());
    }

    #[test]
    fn test_armed_mode_predicate() {
        assert!(!ZoneMode::Disarmed.is_armed_mode());
        assert!(ZoneMode::FullProtection.is_armed_mode());
        assert!(ZoneMode::HullProtection.is_armed_mode());
        assert!(ZoneMode::PartialProtection.is_armed_mode());
    }
}
