//! `kubepulse simulate`: replay a run on the virtual clock.

use std::fmt::Write as _;

use serde::Serialize;
use tracing::{info, warn};

use kubepulse_core::{DurationMs, PulseConfig, VirtualMillis};
use kubepulse_dashboard::render_dashboard;
use kubepulse_dashboard::views::format_elapsed;
use kubepulse_runtime::{DashboardState, Simulation, Timeline, TimelineEntry};

use super::OutputFormat;

pub struct ReplayOptions {
    pub duration: DurationMs,
    pub load_test_at: Vec<DurationMs>,
    pub skip_readings: bool,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub seed: u64,
    pub duration_ms: VirtualMillis,
    pub load_tests_started: Vec<VirtualMillis>,
    /// Triggers that landed while a test was already running.
    pub load_tests_ignored: Vec<VirtualMillis>,
    pub peak_replicas: u32,
    pub events: Vec<TimelineEntry>,
    pub final_state: DashboardState,
}

pub fn run(config: &PulseConfig, opts: &ReplayOptions, format: OutputFormat) -> anyhow::Result<()> {
    let report = replay(config, opts);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", format_text(&report, config)),
    }
    Ok(())
}

/// Run the simulation from virtual time zero to `opts.duration`, pressing
/// the load test button at each requested time.
pub fn replay(config: &PulseConfig, opts: &ReplayOptions) -> ReplayReport {
    let seed = config.seed.unwrap_or_else(rand::random);
    let config = PulseConfig {
        seed: Some(seed),
        ..config.clone()
    };

    let mut sim = Simulation::from_config(&config, 0);
    let timeline = Timeline::new();
    sim.subscribe(timeline.recorder());
    sim.start();

    let end = opts.duration.as_millis();
    let mut triggers: Vec<VirtualMillis> = opts.load_test_at.iter().map(|d| d.as_millis()).collect();
    triggers.sort_unstable();

    let mut started = Vec::new();
    let mut ignored = Vec::new();
    for at in triggers {
        if at > end {
            warn!(at_ms = at, end_ms = end, "load test trigger is past the end of the run, skipped");
            continue;
        }
        sim.advance_to(at);
        if sim.start_load_test() {
            started.push(at);
        } else {
            ignored.push(at);
        }
    }
    sim.advance_to(end);
    sim.teardown();

    let final_state = sim.state().clone();
    let peak_replicas = timeline
        .scaling_entries()
        .iter()
        .map(|e| e.replicas.get())
        .chain(std::iter::once(final_state.replicas.get()))
        .max()
        .unwrap_or_default();
    let events = if opts.skip_readings {
        timeline.scaling_entries()
    } else {
        timeline.entries()
    };

    info!(
        seed,
        duration_ms = end,
        events = events.len(),
        peak_replicas,
        "replay finished"
    );

    ReplayReport {
        seed,
        duration_ms: end,
        load_tests_started: started,
        load_tests_ignored: ignored,
        peak_replicas,
        events,
        final_state,
    }
}

pub fn format_text(report: &ReplayReport, config: &PulseConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "kubepulse replay: seed {}, {} of virtual time",
        report.seed,
        DurationMs::from_millis(report.duration_ms)
    );
    let _ = writeln!(out, "load tests started at: {}", list_times(&report.load_tests_started));
    if !report.load_tests_ignored.is_empty() {
        let _ = writeln!(
            out,
            "ignored (already running): {}",
            list_times(&report.load_tests_ignored)
        );
    }
    out.push('\n');

    for entry in &report.events {
        let _ = writeln!(
            out,
            "  {}  {:<34} pods {} | cpu {}",
            format_elapsed(entry.at_ms),
            entry.change.to_string(),
            entry.replicas,
            entry.cpu_load
        );
    }

    let _ = writeln!(
        out,
        "\npeak replicas: {} | final replicas: {} | final cpu: {}\n",
        report.peak_replicas, report.final_state.replicas, report.final_state.cpu_load
    );
    out.push_str(&render_dashboard(&report.final_state, config));
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn list_times(times: &[VirtualMillis]) -> String {
    if times.is_empty() {
        return "none".to_string();
    }
    times
        .iter()
        .map(|&t| DurationMs::from_millis(t).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubepulse_core::ScaleDirection;
    use kubepulse_runtime::StateChange;

    fn seeded() -> PulseConfig {
        PulseConfig {
            seed: Some(42),
            ..PulseConfig::default()
        }
    }

    fn opts(load_test_at: &[u64], skip_readings: bool) -> ReplayOptions {
        ReplayOptions {
            duration: DurationMs::from_secs(40),
            load_test_at: load_test_at.iter().map(|&ms| DurationMs::from_millis(ms)).collect(),
            skip_readings,
        }
    }

    #[test]
    fn replay_ramps_up_and_back_down() {
        let report = replay(&seeded(), &opts(&[0], true));

        assert_eq!(report.seed, 42);
        assert_eq!(report.load_tests_started, vec![0]);
        assert_eq!(report.peak_replicas, 5);
        assert_eq!(report.final_state.replicas.get(), 1);
        assert!(!report.final_state.load_test_active);

        let scaled: Vec<(u64, ScaleDirection, u32)> = report
            .events
            .iter()
            .filter_map(|e| match e.change {
                StateChange::ReplicasScaled { direction, to, .. } => Some((e.at_ms, direction, to.get())),
                _ => None,
            })
            .collect();
        assert_eq!(
            scaled,
            vec![
                (1_000, ScaleDirection::Up, 2),
                (2_000, ScaleDirection::Up, 3),
                (3_000, ScaleDirection::Up, 4),
                (4_000, ScaleDirection::Up, 5),
                (17_000, ScaleDirection::Down, 4),
                (19_000, ScaleDirection::Down, 3),
                (21_000, ScaleDirection::Down, 2),
                (23_000, ScaleDirection::Down, 1),
            ]
        );
        assert!(
            report
                .events
                .iter()
                .all(|e| !matches!(e.change, StateChange::ReadingSampled { .. }))
        );
    }

    #[test]
    fn retrigger_and_late_trigger() {
        let report = replay(&seeded(), &opts(&[5_000, 0, 90_000], false));
        assert_eq!(report.load_tests_started, vec![0]);
        assert_eq!(report.load_tests_ignored, vec![5_000]);
        // Samples every 2 s from 0 through 40 s.
        let samples = report
            .events
            .iter()
            .filter(|e| matches!(e.change, StateChange::ReadingSampled { .. }))
            .count();
        assert_eq!(samples, 21);
    }

    #[test]
    fn same_seed_same_report() {
        let a = serde_json::to_value(replay(&seeded(), &opts(&[0], false))).unwrap();
        let b = serde_json::to_value(replay(&seeded(), &opts(&[0], false))).unwrap();
        assert_eq!(a, b);
        assert_eq!(a["seed"], 42);
        assert_eq!(a["final_state"]["replicas"], 1);
    }

    #[test]
    fn text_report_lists_events_and_dashboard() {
        let config = seeded();
        let report = replay(&config, &opts(&[0], true));
        let text = format_text(&report, &config);

        assert!(text.starts_with("kubepulse replay: seed 42, 40s of virtual time\n"));
        assert!(text.contains("load tests started at: 0s"));
        assert!(text.contains("00:01.0  scaled up 1 -> 2"));
        assert!(text.contains("00:23.0  scaled down 2 -> 1"));
        assert!(text.contains("peak replicas: 5 | final replicas: 1 | final cpu: 20%"));
        assert!(text.contains("IoT Sensor Monitoring"));
        assert!(!text.contains("ignored"));
    }
}
