//! Autoscale controller: CPU-driven replica stepping.
//!
//! `evaluate()` is pure: it looks at the current load and replica count
//! and says which single step to schedule, if any. `apply()` performs a
//! step when its timer fires.

use tracing::debug;

use kubepulse_core::{AutoscaleConfig, CpuLoad, ReplicaBounds, ReplicaCount, ScaleDirection};

/// A scaling decision for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDecision {
    /// Schedule one step in `direction` after `delay_ms`.
    Step {
        direction: ScaleDirection,
        delay_ms: u64,
    },
    /// No change needed.
    NoChange,
}

/// The reactive HPA rule.
#[derive(Debug, Clone)]
pub struct AutoscaleController {
    bounds: ReplicaBounds,
    scale_up_threshold: u8,
    scale_down_threshold: u8,
    scale_up_delay_ms: u64,
    scale_down_delay_ms: u64,
    target_cpu: u8,
}

impl AutoscaleController {
    pub fn new(config: &AutoscaleConfig) -> Self {
        Self {
            bounds: config.bounds(),
            scale_up_threshold: config.scale_up_threshold,
            scale_down_threshold: config.scale_down_threshold,
            scale_up_delay_ms: config.scale_up_delay.as_millis(),
            scale_down_delay_ms: config.scale_down_delay.as_millis(),
            target_cpu: config.target_cpu,
        }
    }

    pub fn bounds(&self) -> ReplicaBounds {
        self.bounds
    }

    /// Advertised target CPU percentage.
    pub fn target_cpu(&self) -> u8 {
        self.target_cpu
    }

    /// Initial replica count.
    pub fn initial_replicas(&self) -> ReplicaCount {
        ReplicaCount::min(self.bounds)
    }

    /// Decide the next step for the given load and replica count.
    pub fn evaluate(&self, cpu: CpuLoad, replicas: ReplicaCount) -> ScaleDecision {
        let load = cpu.percent();
        let current = replicas.get();

        // Scale up: load above the band and room to grow.
        if load > self.scale_up_threshold && current < self.bounds.max {
            debug!(
                cpu = load,
                replicas = current,
                delay_ms = self.scale_up_delay_ms,
                "scheduling scale up"
            );
            return ScaleDecision::Step {
                direction: ScaleDirection::Up,
                delay_ms: self.scale_up_delay_ms,
            };
        }

        // Scale down: load below the band and above the floor.
        if load < self.scale_down_threshold && current > self.bounds.min {
            debug!(
                cpu = load,
                replicas = current,
                delay_ms = self.scale_down_delay_ms,
                "scheduling scale down"
            );
            return ScaleDecision::Step {
                direction: ScaleDirection::Down,
                delay_ms: self.scale_down_delay_ms,
            };
        }

        ScaleDecision::NoChange
    }

    /// Perform one step, clamped to the bounds. Saturated steps return the
    /// input unchanged.
    pub fn apply(&self, replicas: ReplicaCount, direction: ScaleDirection) -> ReplicaCount {
        replicas.step(direction, self.bounds)
    }
}
