//! The arming/disarming decision core of a zone.

mod blacklist;
mod controller;
mod scheduler;
mod sensors;
mod values;

pub use blacklist::Blacklist;
pub use controller::ZoneController;
pub use sensors::SensorCheck;
pub use values::ZoneValues;
