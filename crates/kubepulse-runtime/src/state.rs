//! The dashboard state and the changes made to it.

use std::fmt;

use serde::Serialize;

use kubepulse_core::{CpuLoad, ReplicaCount, ScaleDirection, SensorReading, VirtualMillis};
use kubepulse_sensor::History;

/// Everything the presentation layer reads. Only `Simulation` mutates it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardState {
    /// Virtual time of the last update.
    pub now_ms: VirtualMillis,
    /// Latest sample, shown on the status cards. Zeroed until the first
    /// sample is taken.
    pub current: SensorReading,
    pub history: History,
    pub replicas: ReplicaCount,
    pub cpu_load: CpuLoad,
    /// The load test status flag.
    pub load_test_active: bool,
}

impl DashboardState {
    pub(crate) fn initial(replicas: ReplicaCount, cpu_load: CpuLoad, history_capacity: usize) -> Self {
        Self {
            now_ms: 0,
            current: SensorReading::default(),
            history: History::with_capacity(history_capacity),
            replicas,
            cpu_load,
            load_test_active: false,
        }
    }
}

/// One mutation of `DashboardState`, passed to observers with the new state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StateChange {
    ReadingSampled { reading: SensorReading },
    LoadTestStarted { cpu: CpuLoad },
    LoadTestFinished { cpu: CpuLoad },
    ReplicasScaled {
        direction: ScaleDirection,
        from: ReplicaCount,
        to: ReplicaCount,
    },
}

impl fmt::Display for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateChange::ReadingSampled { reading } => write!(
                f,
                "reading {:.1}°C {:.1}%",
                reading.temperature, reading.humidity
            ),
            StateChange::LoadTestStarted { cpu } => write!(f, "load test started, cpu {cpu}"),
            StateChange::LoadTestFinished { cpu } => write!(f, "load test finished, cpu {cpu}"),
            StateChange::ReplicasScaled {
                direction,
                from,
                to,
            } => write!(f, "scaled {direction} {from} -> {to}"),
        }
    }
}
