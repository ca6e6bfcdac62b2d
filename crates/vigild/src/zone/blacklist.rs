//! Temporary exception list of sensors allowed to be open.

use std::collections::HashSet;

/// Sensor identifiers exempted from the must-be-closed check for the
/// current arm cycle. Created empty, cleared on disarm and on every new
/// mode-selection attempt; never persisted.
#[derive(Debug, Default)]
pub struct Blacklist {
    sensors: HashSet<String>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the sensor was newly added.
    pub fn add(&mut self, sensor: &str) -> bool {
        self.sensors.insert(sensor.to_string())
    }

    pub fn contains(&self, sensor: &str) -> bool {
        self.sensors.contains(sensor)
    }

    pub fn clear(&mut self) {
        self.sensors.clear();
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_contains() {
        let mut blacklist = Blacklist::new();
        assert!(!blacklist.contains("Haustür"));
        assert!(blacklist.add("Haustür"));
        assert!(blacklist.contains("Haustür"));
        // Second add of the same sensor is not a new entry
        assert!(!blacklist.add("Haustür"));
        assert_eq!(blacklist.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut blacklist = Blacklist::new();
        blacklist.add("Haustür");
        blacklist.add("Fenster West");
        blacklist.clear();
        assert!(blacklist.is_empty());
        assert!(!blacklist.contains("Haustür"));
    }
}
