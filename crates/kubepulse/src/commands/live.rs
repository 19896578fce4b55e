//! `kubepulse live`: the real-time dashboard.

use std::io::{BufRead, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use kubepulse_core::PulseConfig;
use kubepulse_dashboard::{render_dashboard, render_status_line};
use kubepulse_runtime::{Command, DashboardState, Simulation, spawn_live};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const KEY_HELP: &str = "Enter: start load test | q + Enter: quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    StartLoadTest,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim() {
        "" | "l" | "load" => Some(Input::StartLoadTest),
        "q" | "quit" | "exit" => Some(Input::Quit),
        _ => None,
    }
}

pub async fn run(config: PulseConfig, plain: bool) -> anyhow::Result<()> {
    let epoch_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut handle = spawn_live(Simulation::from_config(&config, epoch_ms), shutdown_rx);
    let mut input = spawn_stdin_reader();
    let mut input_open = true;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    draw(&handle.states.borrow_and_update(), &config, plain)?;

    loop {
        tokio::select! {
            changed = handle.states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = handle.states.borrow_and_update().clone();
                draw(&state, &config, plain)?;
            }
            line = input.recv(), if input_open => match line.as_deref().map(parse_input) {
                Some(Some(Input::StartLoadTest)) => {
                    if handle.commands.send(Command::StartLoadTest).await.is_err() {
                        break;
                    }
                }
                Some(Some(Input::Quit)) => break,
                Some(None) => debug!("unrecognized input ignored"),
                None => {
                    debug!("stdin closed, waiting for ctrl-c");
                    input_open = false;
                }
            },
            _ = &mut ctrl_c => break,
        }
    }

    let _ = shutdown_tx.send(true);
    let sim = handle.task.await?;
    info!(at_ms = sim.now(), "dashboard closed");
    println!("{}", render_status_line(sim.state(), &config));
    Ok(())
}

/// Blocking stdin lives on its own thread so it cannot hold up runtime
/// shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(8);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn frame(state: &DashboardState, config: &PulseConfig, plain: bool) -> String {
    if plain {
        format!("{}\n", render_status_line(state, config))
    } else {
        format!(
            "{CLEAR_SCREEN}{}\n\n  {KEY_HELP}\n",
            render_dashboard(state, config).trim_end()
        )
    }
}

fn draw(state: &DashboardState, config: &PulseConfig, plain: bool) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(frame(state, config, plain).as_bytes())?;
    out.flush()
}
