//! Domain types shared across KubePulse crates.
//!
//! None of these are persisted. They are plain values that the
//! simulation creates, mutates through clamped arithmetic, and hands to
//! the dashboard for display.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub type EpochMillis = u64;

/// Milliseconds of virtual time since the simulation started.
pub type VirtualMillis = u64;

// ── Sensor ────────────────────────────────────────────────────────

/// One synthetic sensor sample. Immutable once created.
///
/// Serializes as `{ "temperature", "humidity", "timestamp" }`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorReading {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// When the sample was taken.
    pub timestamp: EpochMillis,
}

impl SensorReading {
    pub fn new(temperature: f64, humidity: f64, timestamp: EpochMillis) -> Self {
        Self {
            temperature,
            humidity,
            timestamp,
        }
    }
}

// ── Replicas ──────────────────────────────────────────────────────

/// Direction of a single autoscale step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleDirection {
    Up,
    Down,
}

impl fmt::Display for ScaleDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleDirection::Up => f.write_str("up"),
            ScaleDirection::Down => f.write_str("down"),
        }
    }
}

/// Inclusive min/max replica count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaBounds {
    pub min: u32,
    pub max: u32,
}

impl Default for ReplicaBounds {
    fn default() -> Self {
        Self { min: 1, max: 5 }
    }
}

impl ReplicaBounds {
    pub fn clamp(&self, n: u32) -> u32 {
        n.clamp(self.min, self.max)
    }

    pub fn contains(&self, n: u32) -> bool {
        (self.min..=self.max).contains(&n)
    }
}

/// Number of simulated pods. Always inside the bounds it was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplicaCount(u32);

impl ReplicaCount {
    /// Create a replica count clamped into `bounds`.
    pub fn new(n: u32, bounds: ReplicaBounds) -> Self {
        Self(bounds.clamp(n))
    }

    /// The smallest allowed count.
    pub fn min(bounds: ReplicaBounds) -> Self {
        Self(bounds.min)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// One step in `direction`, saturating at the bounds.
    pub fn step(self, direction: ScaleDirection, bounds: ReplicaBounds) -> Self {
        let next = match direction {
            ScaleDirection::Up => self.0.saturating_add(1).min(bounds.max),
            ScaleDirection::Down => self.0.saturating_sub(1).max(bounds.min),
        };
        Self(bounds.clamp(next))
    }
}

impl fmt::Display for ReplicaCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── CPU load ──────────────────────────────────────────────────────

/// Synthetic CPU usage in percent, 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CpuLoad(u8);

impl CpuLoad {
    pub const MAX: u8 = 100;

    /// Create a load value, saturating at 100%.
    pub fn new(percent: u8) -> Self {
        Self(percent.min(Self::MAX))
    }

    pub fn percent(self) -> u8 {
        self.0
    }
}

impl fmt::Display for CpuLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
