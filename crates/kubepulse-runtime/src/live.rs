//! Wall-clock driver: runs a `Simulation` inside a tokio task.
//!
//! Virtual millisecond `t` maps to `origin + t` on the tokio clock. The
//! task sleeps until the next deadline, advances the simulation, and
//! publishes the new state. Other tasks never touch the simulation
//! directly; they send `Command`s and watch states.

use std::time::Duration;

use rand::Rng;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::simulation::Simulation;
use crate::state::DashboardState;

/// Requests accepted by a running driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// The "Start Load Test" button.
    StartLoadTest,
}

/// Handles to a spawned driver.
pub struct LiveHandle<R = rand::rngs::StdRng> {
    pub commands: mpsc::Sender<Command>,
    pub states: watch::Receiver<DashboardState>,
    /// Resolves to the torn-down simulation once `shutdown` fires.
    pub task: JoinHandle<Simulation<R>>,
}

const COMMAND_BUFFER: usize = 16;

/// Start `sim` and drive it in real time until `shutdown` flips to true
/// (or its sender is dropped).
pub fn spawn_live<R>(mut sim: Simulation<R>, shutdown: watch::Receiver<bool>) -> LiveHandle<R>
where
    R: Rng + Send + 'static,
{
    sim.start();
    let (state_tx, states) = watch::channel(sim.state().clone());
    let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER);

    let task = tokio::spawn(run(sim, command_rx, state_tx, shutdown));

    LiveHandle {
        commands,
        states,
        task,
    }
}

async fn run<R: Rng>(
    mut sim: Simulation<R>,
    mut commands: mpsc::Receiver<Command>,
    states: watch::Sender<DashboardState>,
    mut shutdown: watch::Receiver<bool>,
) -> Simulation<R> {
    let origin = Instant::now() - Duration::from_millis(sim.now());
    let mut commands_open = true;
    info!("live driver started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        let deadline = sim.next_deadline();
        let wake_at = origin + Duration::from_millis(deadline.unwrap_or(0));

        tokio::select! {
            _ = tokio::time::sleep_until(wake_at), if deadline.is_some() => {
                let target = elapsed_ms(origin).max(deadline.unwrap_or(0));
                if sim.advance_to(target) > 0 {
                    states.send_replace(sim.state().clone());
                }
            }
            cmd = commands.recv(), if commands_open => match cmd {
                Some(cmd) => {
                    if apply_command(&mut sim, cmd, elapsed_ms(origin)) {
                        states.send_replace(sim.state().clone());
                    }
                }
                None => {
                    debug!("command channel closed");
                    commands_open = false;
                }
            },
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    sim.teardown();
    states.send_replace(sim.state().clone());
    info!(at_ms = sim.now(), "live driver stopped");
    sim
}

/// Catch the simulation up to `now_ms`, then apply `cmd`. Returns whether
/// the state changed, either from timers that came due or from the command.
fn apply_command<R: Rng>(sim: &mut Simulation<R>, cmd: Command, now_ms: u64) -> bool {
    let fired = sim.advance_to(now_ms);
    let accepted = match cmd {
        Command::StartLoadTest => sim.start_load_test(),
    };
    if !accepted {
        debug!(?cmd, "command had no effect");
    }
    fired > 0 || accepted
}

fn elapsed_ms(origin: Instant) -> u64 {
    u64::try_from(origin.elapsed().as_millis()).unwrap_or(u64::MAX)
}
