//! Load test state machine.

use tracing::{debug, info};

use kubepulse_core::{CpuLoad, LoadTestConfig};

/// Effects of an accepted trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTestStarted {
    /// CPU load to apply immediately.
    pub cpu: CpuLoad,
    /// When the reset should fire, relative to now.
    pub reset_after_ms: u64,
}

/// Tracks whether a load test is running and what load it implies.
#[derive(Debug, Clone)]
pub struct LoadTrigger {
    peak: CpuLoad,
    idle: CpuLoad,
    duration_ms: u64,
    active: bool,
    runs: u64,
}

impl LoadTrigger {
    pub fn new(config: &LoadTestConfig) -> Self {
        Self {
            peak: config.peak(),
            idle: config.idle(),
            duration_ms: config.duration.as_millis(),
            active: false,
            runs: 0,
        }
    }

    /// The load test status flag.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// CPU load when no test is running.
    pub fn idle_load(&self) -> CpuLoad {
        self.idle
    }

    /// Number of load tests started so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Begin a load test. Returns `None` if one is already running.
    pub fn start(&mut self) -> Option<LoadTestStarted> {
        if self.active {
            debug!(run = self.runs, "load test already running, trigger ignored");
            return None;
        }

        self.active = true;
        self.runs += 1;
        info!(
            run = self.runs,
            cpu = self.peak.percent(),
            duration_ms = self.duration_ms,
            "load test started"
        );

        Some(LoadTestStarted {
            cpu: self.peak,
            reset_after_ms: self.duration_ms,
        })
    }

    /// End the running load test, returning the load to restore.
    /// Returns `None` if no test was running.
    pub fn finish(&mut self) -> Option<CpuLoad> {
        if !self.active {
            return None;
        }
        self.active = false;
        info!(run = self.runs, cpu = self.idle.percent(), "load test finished");
        Some(self.idle)
    }
}
