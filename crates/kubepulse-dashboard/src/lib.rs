//! kubepulse-dashboard: the presentation layer.
//!
//! Turns a `DashboardState` into text. View types in `views.rs` carry
//! pre-formatted strings so the Askama templates under `templates/` stay
//! dumb; `pages.rs` does the rendering.
//!
//! # Sections
//!
//! | Section | Source |
//! |---|---|
//! | Status cards | current reading, replica count, CPU load |
//! | Load testing | load test flag, replica progress |
//! | Pod grid | replica count against `max_replicas` |
//! | Sensor trend | history, scaled to the top of each sample range |

pub mod pages;
pub mod views;

pub use pages::{render_dashboard, render_status_line};
pub use views::DashboardView;
