//! Dashboard renderers.
//!
//! Each renderer builds view types and renders an Askama template. A
//! template error is reported inline rather than aborting the redraw.

use askama::Template;

use kubepulse_core::PulseConfig;
use kubepulse_runtime::DashboardState;

use crate::views::*;

fn render<T: Template>(tmpl: T) -> String {
    tmpl.render()
        .unwrap_or_else(|e| format!("template error: {e}"))
}

// ── Full dashboard ──────────────────────────────────────────────

#[derive(Template)]
#[template(path = "dashboard.txt")]
struct DashboardTemplate {
    title: &'static str,
    subtitle: &'static str,
    elapsed_display: String,
    cards: Vec<StatusCard>,
    load_panel: LoadTestPanel,
    pod_row: String,
    hpa_line: String,
    trend: Vec<TrendBar>,
    last_updated: String,
}

/// Render the full dashboard: cards, load panel, pod grid, trend chart.
pub fn render_dashboard(state: &DashboardState, config: &PulseConfig) -> String {
    let view = DashboardView::from_state(state, config);
    render(DashboardTemplate {
        title: view.title,
        subtitle: view.subtitle,
        elapsed_display: view.elapsed_display,
        cards: view.cards,
        load_panel: view.load_panel,
        pod_row: view.pod_row,
        hpa_line: view.hpa_line,
        trend: view.trend,
        last_updated: view.last_updated,
    })
}

// ── One-line status ─────────────────────────────────────────────

#[derive(Template)]
#[template(path = "status_line.txt")]
struct StatusLineTemplate {
    elapsed_display: String,
    temperature: String,
    humidity: String,
    cpu: String,
    replicas: u32,
    max_replicas: u32,
    load_test_active: bool,
}

/// Render a single status line, for plain terminals and logs.
pub fn render_status_line(state: &DashboardState, config: &PulseConfig) -> String {
    render(StatusLineTemplate {
        elapsed_display: format_elapsed(state.now_ms),
        temperature: format!("{:.1}°C", state.current.temperature),
        humidity: format!("{:.1}%", state.current.humidity),
        cpu: state.cpu_load.to_string(),
        replicas: state.replicas.get(),
        max_replicas: config.autoscale.max_replicas,
        load_test_active: state.load_test_active,
    })
    .trim_end()
    .to_string()
}
