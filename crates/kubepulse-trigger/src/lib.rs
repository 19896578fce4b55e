//! kubepulse-trigger: the "Start Load Test" action.
//!
//! A load test pins synthetic CPU load at the configured peak for a fixed
//! duration, then drops it back to idle. While one is running, further
//! triggers are ignored. This crate only holds the transitions; arming the
//! reset timer is the runtime's job.
//!
//! ```text
//! idle ──start()──▶ running (cpu = peak, reset armed for `duration`)
//!   ▲                  │
//!   └────finish()──────┘ (cpu = idle)
//! ```

pub mod load;

pub use load::{LoadTestStarted, LoadTrigger};
