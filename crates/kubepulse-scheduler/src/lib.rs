//! kubepulse-scheduler: virtual-time timer queue.
//!
//! Every delayed effect in the simulation (sensor polling, the end of a
//! load test, a single autoscale step) is a timer in this queue. Time only
//! moves when the owner pops due timers, so tests can replay minutes of
//! simulated activity without sleeping.
//!
//! # Ordering
//!
//! ```text
//! key = (due_ms, seq)
//!
//! pop_due(until) yields the smallest key with due_ms <= until,
//! moves `now` to due_ms, and re-arms repeating timers at
//! due_ms + period with a fresh seq.
//! ```
//!
//! Timers due at the same instant therefore fire in the order they were
//! (re-)armed.

pub mod timer;

pub use timer::{FiredTimer, Scheduler, TimerId, TimerPurpose};
