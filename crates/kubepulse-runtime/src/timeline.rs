//! Event recorder for batch runs.
//!
//! `Timeline` hands out an `Observer` that appends every change with its
//! virtual timestamp. The `simulate` command prints the result.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use kubepulse_core::{CpuLoad, ReplicaCount, VirtualMillis};

use crate::simulation::Observer;
use crate::state::StateChange;

/// One recorded change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub at_ms: VirtualMillis,
    #[serde(flatten)]
    pub change: StateChange,
    /// Replica count after the change.
    pub replicas: ReplicaCount,
    /// CPU load after the change.
    pub cpu_load: CpuLoad,
}

/// Shared, append-only list of changes.
#[derive(Clone, Default)]
pub struct Timeline(Arc<Mutex<Vec<TimelineEntry>>>);

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// An observer that records into this timeline.
    pub fn recorder(&self) -> Observer {
        let timeline = self.clone();
        Box::new(move |state, change| {
            timeline.entries_mut().push(TimelineEntry {
                at_ms: state.now_ms,
                change: *change,
                replicas: state.replicas,
                cpu_load: state.cpu_load,
            });
        })
    }

    /// Copy of everything recorded so far.
    pub fn entries(&self) -> Vec<TimelineEntry> {
        self.entries_mut().clone()
    }

    /// Only the changes that are not sensor samples.
    pub fn scaling_entries(&self) -> Vec<TimelineEntry> {
        self.entries_mut()
            .iter()
            .filter(|e| !matches!(e.change, StateChange::ReadingSampled { .. }))
            .copied()
            .collect()
    }

    fn entries_mut(&self) -> MutexGuard<'_, Vec<TimelineEntry>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Simulation;
    use kubepulse_core::PulseConfig;

    #[test]
    fn records_changes_with_virtual_time() {
        let config = PulseConfig {
            seed: Some(5),
            ..PulseConfig::default()
        };
        let mut sim = Simulation::from_config(&config, 0);
        let timeline = Timeline::new();
        sim.subscribe(timeline.recorder());

        sim.start();
        sim.start_load_test();
        sim.advance_to(2000);

        let all = timeline.entries();
        // Samples at 0 and 2000, load start, steps at 1000 and 2000.
        assert_eq!(all.len(), 5);

        let scaling: Vec<(u64, u32)> = timeline
            .scaling_entries()
            .iter()
            .map(|e| (e.at_ms, e.replicas.get()))
            .collect();
        assert_eq!(scaling, vec![(0, 1), (1000, 2), (2000, 3)]);
    }

    #[test]
    fn entry_serializes_flat() {
        let entry = TimelineEntry {
            at_ms: 1000,
            change: StateChange::LoadTestStarted { cpu: CpuLoad::new(85) },
            replicas: ReplicaCount::new(1, Default::default()),
            cpu_load: CpuLoad::new(85),
        };
        let json = serde_json::to_value(entry).unwrap();
        assert_eq!(json["event"], "load_test_started");
        assert_eq!(json["at_ms"], 1000);
        assert_eq!(json["cpu"], 85);
        assert_eq!(json["replicas"], 1);
    }
}
