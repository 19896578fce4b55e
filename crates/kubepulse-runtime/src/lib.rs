//! kubepulse-runtime: drives the KubePulse simulation.
//!
//! `Simulation` is the single owner of all dashboard state. It wires the
//! sensor simulator, load trigger, and autoscale rule to one virtual-time
//! scheduler and tells observers about every change.
//!
//! # Architecture
//!
//! ```text
//! Simulation
//!   ├── start()            ← immediate sample, arm sensor-poll, first evaluation
//!   ├── start_load_test()  ← the one user action
//!   ├── advance_to(t)      → fires due timers in order
//!   │     ├── sensor-poll  → SensorSimulator::sample
//!   │     ├── load-reset   → LoadTrigger::finish
//!   │     └── scale-step   → AutoscaleController::apply
//!   └── subscribe()        → observers see (state, change)
//!
//! live::spawn_live()
//!   └── tokio task mapping virtual time to wall-clock time,
//!       publishing states on a watch channel
//! ```
//!
//! Whenever CPU load or the replica count actually changes, the autoscale
//! rule is evaluated again and may arm another one-shot step. Steps are
//! never cancelled; a step that finds the count already saturated is a
//! no-op.

pub mod live;
pub mod simulation;
pub mod state;
pub mod timeline;

pub use live::{Command, LiveHandle, spawn_live};
pub use simulation::{Observer, Simulation};
pub use state::{DashboardState, StateChange};
pub use timeline::{Timeline, TimelineEntry};
