//! kubepulse-core: shared types and configuration for KubePulse.
//!
//! Holds the value types every other crate agrees on (sensor readings,
//! replica counts, CPU load), the `kubepulse.toml` configuration model,
//! and the duration syntax used in it.

pub mod config;
pub mod duration;
pub mod error;
pub mod types;

pub use config::{AutoscaleConfig, LoadTestConfig, PulseConfig, SensorConfig};
pub use duration::{DurationMs, parse_duration_ms};
pub use error::{ConfigError, ConfigResult};
pub use types::*;
