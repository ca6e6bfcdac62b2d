//! Collaborator trait abstractions for the zone controller.
//!
//! The controller core performs no I/O of its own; everything it observes
//! or drives in the outside world goes through these traits:
//! - Deterministic testing with fake implementations
//! - No subprocess or filesystem access required for testing
//! - Clear interface boundaries
//!
//! Production code uses the real implementations in `notify`, `protocol`
//! and `sensors_file`. Test code uses the fakes below, which record every
//! call for assertions.
//!
//! All calls are synchronous from the controller's point of view and
//! fire-and-forget where they have no return value: a failing recorder or
//! notifier logs its own failure and never reverts a state transition that
//! already happened.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use vigil_common::{VigilError, ZoneMode};

/// Severity of an alarm protocol line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info = 0,
    Success = 1,
}

/// One door/window sensor as reported by the sensor oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorReading {
    pub name: String,
    pub open: bool,
}

impl SensorReading {
    pub fn closed(name: &str) -> Self {
        Self {
            name: name.to_string(),
            open: false,
        }
    }

    pub fn open(name: &str) -> Self {
        Self {
            name: name.to_string(),
            open: true,
        }
    }
}

/// Maintenance oracle: while active, every mode-selection request fails
/// closed without mutating anything.
pub trait MaintenanceOracle: Send + Sync {
    fn is_under_maintenance(&self) -> bool;
}

/// Sensor oracle: reports the door/window sensors relevant for a mode.
///
/// An `Err` means the state is indeterminate; callers must treat that as
/// "not closed" and never silently arm.
pub trait SensorOracle: Send + Sync {
    fn relevant_sensors(&self, mode: ZoneMode) -> Result<Vec<SensorReading>, VigilError>;
}

/// Receives formatted alarm protocol lines.
pub trait ProtocolRecorder: Send + Sync {
    fn record(&self, text: &str, severity: Severity);
}

/// Delivers notifications by key with an optional payload.
pub trait Notifier: Send + Sync {
    fn send(&self, key: &str, payload: &str);
}

// ============================================================================
// Fake implementations (testing)
// ============================================================================

/// Fake maintenance oracle with a switchable flag.
#[derive(Default)]
pub struct FakeMaintenance {
    active: AtomicBool,
}

impl FakeMaintenance {
    pub fn new(active: bool) -> Self {
        Self {
            active: AtomicBool::new(active),
        }
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }
}

impl MaintenanceOracle for FakeMaintenance {
    fn is_under_maintenance(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Fake sensor oracle with scriptable readings and failure injection.
///
/// Readings queued with [`push_readings`](Self::push_readings) are consumed
/// one call at a time; once the queue is empty the baseline readings set via
/// [`set_readings`](Self::set_readings) are returned. This makes two-phase
/// "decide then commit" sequences scriptable (e.g. a sensor that opens
/// between the feasibility check and the commit evaluation).
#[derive(Default)]
pub struct FakeSensorOracle {
    baseline: Mutex<Vec<SensorReading>>,
    queued: Mutex<Vec<Vec<SensorReading>>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeSensorOracle {
    pub fn new(readings: Vec<SensorReading>) -> Self {
        Self {
            baseline: Mutex::new(readings),
            ..Default::default()
        }
    }

    pub fn all_closed(names: &[&str]) -> Self {
        Self::new(names.iter().map(|n| SensorReading::closed(n)).collect())
    }

    pub fn set_readings(&self, readings: Vec<SensorReading>) {
        *self.baseline.lock().unwrap() = readings;
    }

    /// Queue readings for the next call only.
    pub fn push_readings(&self, readings: Vec<SensorReading>) {
        self.queued.lock().unwrap().push(readings);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SensorOracle for FakeSensorOracle {
    fn relevant_sensors(&self, _mode: ZoneMode) -> Result<Vec<SensorReading>, VigilError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(VigilError::SensorState("oracle offline".to_string()));
        }
        let mut queued = self.queued.lock().unwrap();
        if queued.is_empty() {
            Ok(self.baseline.lock().unwrap().clone())
        } else {
            Ok(queued.remove(0))
        }
    }
}

/// Fake protocol recorder that keeps every line for assertions.
#[derive(Default)]
pub struct FakeProtocol {
    lines: Mutex<Vec<(String, Severity)>>,
}

impl FakeProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(String, Severity)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(text, _)| text.contains(needle))
            .count()
    }
}

impl ProtocolRecorder for FakeProtocol {
    fn record(&self, text: &str, severity: Severity) {
        self.lines
            .lock()
            .unwrap()
            .push((text.to_string(), severity));
    }
}

/// Fake notifier that records every (key, payload) pair.
#[derive(Default)]
pub struct FakeNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count_for(&self, key: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k == key)
            .count()
    }
}

impl Notifier for FakeNotifier {
    fn send(&self, key: &str, payload: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((key.to_string(), payload.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_sensor_oracle_queue_then_baseline() {
        let oracle = FakeSensorOracle::all_closed(&["Haustür"]);
        oracle.push_readings(vec![SensorReading::open("Haustür")]);

        let first = oracle.relevant_sensors(ZoneMode::FullProtection).unwrap();
        assert!(first[0].open);

        let second = oracle.relevant_sensors(ZoneMode::FullProtection).unwrap();
        assert!(!second[0].open);
        assert_eq!(oracle.call_count(), 2);
    }

    #[test]
    fn test_fake_sensor_oracle_failure_injection() {
        let oracle = FakeSensorOracle::all_closed(&["Haustür"]);
        oracle.set_failing(true);
        assert!(oracle.relevant_sensors(ZoneMode::FullProtection).is_err());
        oracle.set_failing(false);
        assert!(oracle.relevant_sensors(ZoneMode::FullProtection).is_ok());
    }

    #[test]
    fn test_fake_notifier_counts_by_key() {
        let notifier = FakeNotifier::new();
        notifier.send("full_activation", "");
        notifier.send("open_sensor", "Haustür");
        notifier.send("open_sensor", "Fenster West");
        assert_eq!(notifier.count_for("open_sensor"), 2);
        assert_eq!(notifier.count_for("full_activation"), 1);
    }

    #[test]
    fn test_fake_protocol_records_severity() {
        let protocol = FakeProtocol::new();
        protocol.record("Vollschutz aktiviert.", Severity::Success);
        let lines = protocol.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].1, Severity::Success);
    }
}
