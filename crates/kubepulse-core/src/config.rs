//! kubepulse.toml configuration parser.
//!
//! Every field is optional; an empty file yields the stock demo:
//! a 2 s sensor poll, a 15 s load test at 85% CPU, and an HPA band of
//! 1..=5 replicas that steps up after 1 s and down after 2 s.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::duration::DurationMs;
use crate::error::{ConfigError, ConfigResult};
use crate::types::{CpuLoad, ReplicaBounds};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PulseConfig {
    /// Seed for the sensor RNG. A fresh seed is drawn when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub sensor: SensorConfig,
    pub load_test: LoadTestConfig,
    pub autoscale: AutoscaleConfig,
}

/// Half-open sampling interval `[low, high)`, written as `[low, high]` in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct SampleRange {
    pub low: f64,
    pub high: f64,
}

impl SampleRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.low && v < self.high
    }
}

impl From<[f64; 2]> for SampleRange {
    fn from([low, high]: [f64; 2]) -> Self {
        Self { low, high }
    }
}

impl From<SampleRange> for [f64; 2] {
    fn from(r: SampleRange) -> Self {
        [r.low, r.high]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorConfig {
    pub poll_interval: DurationMs,
    pub history_capacity: usize,
    /// Temperature range in °C.
    pub temperature: SampleRange,
    /// Humidity range in %.
    pub humidity: SampleRange,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DurationMs::from_secs(2),
            history_capacity: 20,
            temperature: SampleRange::new(20.0, 40.0),
            humidity: SampleRange::new(30.0, 80.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadTestConfig {
    pub duration: DurationMs,
    /// CPU load while a test runs.
    pub peak_cpu: u8,
    /// CPU load at rest, also the initial value.
    pub idle_cpu: u8,
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            duration: DurationMs::from_secs(15),
            peak_cpu: 85,
            idle_cpu: 20,
        }
    }
}

impl LoadTestConfig {
    pub fn peak(&self) -> CpuLoad {
        CpuLoad::new(self.peak_cpu)
    }

    pub fn idle(&self) -> CpuLoad {
        CpuLoad::new(self.idle_cpu)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutoscaleConfig {
    pub min_replicas: u32,
    pub max_replicas: u32,
    /// Scale up while CPU load is strictly above this.
    pub scale_up_threshold: u8,
    /// Scale down while CPU load is strictly below this.
    pub scale_down_threshold: u8,
    pub scale_up_delay: DurationMs,
    pub scale_down_delay: DurationMs,
    /// Advertised HPA target, shown on the dashboard only.
    pub target_cpu: u8,
}

impl Default for AutoscaleConfig {
    fn default() -> Self {
        Self {
            min_replicas: 1,
            max_replicas: 5,
            scale_up_threshold: 50,
            scale_down_threshold: 30,
            scale_up_delay: DurationMs::from_secs(1),
            scale_down_delay: DurationMs::from_secs(2),
            target_cpu: 50,
        }
    }
}

impl AutoscaleConfig {
    pub fn bounds(&self) -> ReplicaBounds {
        ReplicaBounds {
            min: self.min_replicas,
            max: self.max_replicas,
        }
    }
}

impl PulseConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load `path` if given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: PulseConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        let s = &self.sensor;
        if s.poll_interval.is_zero() {
            return Err(ConfigError::invalid("sensor.poll_interval", "must be non-zero"));
        }
        if s.history_capacity == 0 {
            return Err(ConfigError::invalid("sensor.history_capacity", "must be at least 1"));
        }
        check_range("sensor.temperature", s.temperature)?;
        check_range("sensor.humidity", s.humidity)?;

        let l = &self.load_test;
        if l.duration.is_zero() {
            return Err(ConfigError::invalid("load_test.duration", "must be non-zero"));
        }
        check_percent("load_test.peak_cpu", l.peak_cpu)?;
        check_percent("load_test.idle_cpu", l.idle_cpu)?;

        let a = &self.autoscale;
        if a.min_replicas == 0 {
            return Err(ConfigError::invalid("autoscale.min_replicas", "must be at least 1"));
        }
        if a.min_replicas > a.max_replicas {
            return Err(ConfigError::invalid(
                "autoscale.max_replicas",
                format!("{} is below min_replicas {}", a.max_replicas, a.min_replicas),
            ));
        }
        check_percent("autoscale.scale_up_threshold", a.scale_up_threshold)?;
        check_percent("autoscale.scale_down_threshold", a.scale_down_threshold)?;
        if a.scale_down_threshold > a.scale_up_threshold {
            return Err(ConfigError::invalid(
                "autoscale.scale_down_threshold",
                format!(
                    "{} is above scale_up_threshold {}",
                    a.scale_down_threshold, a.scale_up_threshold
                ),
            ));
        }
        check_percent("autoscale.target_cpu", a.target_cpu)?;

        Ok(())
    }
}

fn check_range(field: &'static str, r: SampleRange) -> ConfigResult<()> {
    // Uniform sampling needs a finite width as well as finite bounds.
    let finite = r.low.is_finite() && r.high.is_finite() && (r.high - r.low).is_finite();
    if !finite || r.low >= r.high {
        return Err(ConfigError::invalid(
            field,
            format!("[{}, {}] is not a non-empty finite range", r.low, r.high),
        ));
    }
    Ok(())
}

fn check_percent(field: &'static str, v: u8) -> ConfigResult<()> {
    if v > CpuLoad::MAX {
        return Err(ConfigError::invalid(field, format!("{v} exceeds 100")));
    }
    Ok(())
}
