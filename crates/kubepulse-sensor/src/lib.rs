//! kubepulse-sensor: synthetic IoT readings.
//!
//! `SensorSimulator` draws uniform temperature and humidity samples and
//! keeps the most recent ones in a bounded `History`. It has no notion of
//! time beyond the timestamp it is handed; the runtime decides when to
//! sample.

pub mod history;
pub mod simulator;

pub use history::History;
pub use simulator::SensorSimulator;
