//! View types for dashboard template rendering.
//!
//! These types are purpose-built for Askama templates: they carry
//! pre-formatted strings and computed fields so templates stay simple.

use kubepulse_core::{PulseConfig, SensorReading};
use kubepulse_runtime::DashboardState;

pub const TITLE: &str = "IoT Sensor Monitoring";
pub const SUBTITLE: &str = "Kubernetes Auto-Scaling Demo";

const BAR_WIDTH: usize = 24;
const PROGRESS_WIDTH: usize = 30;

// ── Whole page ──────────────────────────────────────────────────

pub struct DashboardView {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub elapsed_display: String,
    pub cards: Vec<StatusCard>,
    pub load_panel: LoadTestPanel,
    pub pods: Vec<PodSlot>,
    pub pod_row: String,
    pub hpa_line: String,
    pub trend: Vec<TrendBar>,
    pub last_updated: String,
}

impl DashboardView {
    pub fn from_state(state: &DashboardState, config: &PulseConfig) -> Self {
        let max = config.autoscale.max_replicas;
        let replicas = state.replicas.get();

        let pods: Vec<PodSlot> = (0..max)
            .map(|i| PodSlot { active: i < replicas })
            .collect();
        let pod_row = pods
            .iter()
            .map(PodSlot::glyph)
            .collect::<Vec<_>>()
            .join(" ");

        let temp_top = config.sensor.temperature.high;
        let hum_top = config.sensor.humidity.high;
        let trend = state
            .history
            .iter()
            .map(|r| TrendBar::from_reading(r, temp_top, hum_top))
            .collect();

        let last_updated = state
            .history
            .latest()
            .map(|r| format_timestamp_ms(r.timestamp))
            .unwrap_or_else(|| "never".to_string());

        Self {
            title: TITLE,
            subtitle: SUBTITLE,
            elapsed_display: format_elapsed(state.now_ms),
            cards: StatusCard::all(state),
            load_panel: LoadTestPanel::new(state.load_test_active, replicas, max),
            pods,
            pod_row,
            hpa_line: hpa_line(config),
            trend,
            last_updated,
        }
    }
}

// ── Status cards ────────────────────────────────────────────────

pub struct StatusCard {
    pub label: &'static str,
    pub badge: &'static str,
    pub value: String,
}

impl StatusCard {
    fn all(state: &DashboardState) -> Vec<Self> {
        vec![
            Self {
                label: "Temperature",
                badge: "Real-time",
                value: format!("{:.1}°C", state.current.temperature),
            },
            Self {
                label: "Humidity",
                badge: "Real-time",
                value: format!("{:.1}%", state.current.humidity),
            },
            Self {
                label: "Active Pods",
                badge: "Auto-scale",
                value: state.replicas.to_string(),
            },
            Self {
                label: "CPU Usage",
                badge: "Average",
                value: state.cpu_load.to_string(),
            },
        ]
    }
}

// ── Load testing ────────────────────────────────────────────────

pub struct LoadTestPanel {
    pub active: bool,
    pub button_label: &'static str,
    pub message: &'static str,
    pub progress_bar: String,
    pub progress_display: String,
}

impl LoadTestPanel {
    fn new(active: bool, replicas: u32, max: u32) -> Self {
        let fraction = if max > 0 {
            f64::from(replicas) / f64::from(max)
        } else {
            0.0
        };
        Self {
            active,
            button_label: if active { "Load Testing..." } else { "Start Load Test" },
            message: if active {
                "Generating high CPU load... Pods scaling up!"
            } else {
                "Trigger high CPU load to observe HPA auto-scaling behavior"
            },
            progress_bar: text_bar(fraction, PROGRESS_WIDTH),
            progress_display: format!("{:.0}%", fraction * 100.0),
        }
    }
}

// ── Pods ────────────────────────────────────────────────────────

pub struct PodSlot {
    pub active: bool,
}

impl PodSlot {
    pub fn glyph(&self) -> &'static str {
        if self.active { "[■]" } else { "[ ]" }
    }
}

fn hpa_line(config: &PulseConfig) -> String {
    let a = &config.autoscale;
    format!(
        "Min: {} {} | Max: {} {} | Target CPU: {}%",
        a.min_replicas,
        plural(a.min_replicas, "replica"),
        a.max_replicas,
        plural(a.max_replicas, "replica"),
        a.target_cpu
    )
}

fn plural(n: u32, word: &str) -> String {
    if n == 1 { word.to_string() } else { format!("{word}s") }
}

// ── Sensor trend ────────────────────────────────────────────────

pub struct TrendBar {
    pub time_display: String,
    pub temp_bar: String,
    pub temp_display: String,
    pub hum_bar: String,
    pub hum_display: String,
}

impl TrendBar {
    /// Bar heights are `value / top` of each sample range, capped at 100%.
    fn from_reading(r: &SensorReading, temp_top: f64, hum_top: f64) -> Self {
        Self {
            time_display: format_clock_ms(r.timestamp),
            temp_bar: text_bar(ratio(r.temperature, temp_top), BAR_WIDTH),
            temp_display: format!("{:.1}°C", r.temperature),
            hum_bar: text_bar(ratio(r.humidity, hum_top), BAR_WIDTH),
            hum_display: format!("{:.1}%", r.humidity),
        }
    }
}

fn ratio(value: f64, top: f64) -> f64 {
    if top > 0.0 { value / top } else { 0.0 }
}

// ── Formatting helpers ──────────────────────────────────────────

/// A `width`-cell bar, `fraction` clamped to 0..=1.
pub fn text_bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = ((fraction * width as f64).round() as usize).min(width);
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(width - filled));
    bar
}

pub fn format_timestamp_ms(timestamp_ms: u64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn format_clock_ms(timestamp_ms: u64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms as i64)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

/// Virtual time as `mm:ss.s`.
pub fn format_elapsed(ms: u64) -> String {
    let mins = ms / 60_000;
    let secs = (ms % 60_000) as f64 / 1000.0;
    format!("{mins:02}:{secs:04.1}")
}
