//! kubepulse-autoscale: a mock Horizontal Pod Autoscaler.
//!
//! Compares synthetic CPU load against a band and asks for one delayed
//! replica step at a time. The caller re-evaluates after every change to
//! load or replica count, which turns single steps into a gradual ramp.
//!
//! # Scaling Rule
//!
//! ```text
//! if cpu > scale_up_threshold and replicas < max:
//!     after scale_up_delay:   replicas = min(max, replicas + 1)
//! elif cpu < scale_down_threshold and replicas > min:
//!     after scale_down_delay: replicas = max(min, replicas - 1)
//! else:
//!     no change
//! ```
//!
//! Scale-up wins when both conditions hold.

pub mod controller;

pub use controller::{AutoscaleController, ScaleDecision};
