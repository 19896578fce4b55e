//! kubepulse: IoT sensor dashboard with a mock Kubernetes autoscaler.
//!
//! # Usage
//!
//! ```text
//! kubepulse live                          # real-time dashboard, Enter = load test
//! kubepulse simulate --duration 40s       # virtual-clock replay of one load test
//! kubepulse --config kubepulse.toml config
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use kubepulse_core::{DurationMs, PulseConfig};

mod commands;

use commands::OutputFormat;

#[derive(Parser)]
#[command(
    name = "kubepulse",
    about = "KubePulse: simulated IoT sensors and a mock HPA",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to a kubepulse.toml (defaults are used when omitted).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the dashboard in real time.
    ///
    /// Press Enter to start a load test, type `q` then Enter (or Ctrl-C) to quit.
    Live {
        /// Sensor RNG seed (overrides the config file).
        #[arg(long)]
        seed: Option<u64>,
        /// Print one status line per change instead of redrawing the screen.
        #[arg(long)]
        plain: bool,
    },
    /// Replay on a virtual clock and print the event timeline.
    Simulate {
        /// Sensor RNG seed (overrides the config file).
        #[arg(long)]
        seed: Option<u64>,
        /// How much virtual time to run.
        #[arg(long, default_value = "40s")]
        duration: DurationMs,
        /// When to press "Start Load Test". Repeatable.
        #[arg(long = "load-test-at", default_value = "0s")]
        load_test_at: Vec<DurationMs>,
        /// Leave sensor samples out of the timeline.
        #[arg(long)]
        skip_readings: bool,
        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The live dashboard owns the terminal; keep logs quiet unless asked.
    let default_filter = match cli.command {
        Command::Live { .. } => "warn",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_filter))?,
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = PulseConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Live { seed, plain } => {
            commands::apply_seed(&mut config, seed);
            commands::live::run(config, plain).await
        }
        Command::Simulate {
            seed,
            duration,
            load_test_at,
            skip_readings,
            format,
        } => {
            commands::apply_seed(&mut config, seed);
            let opts = commands::simulate::ReplayOptions {
                duration,
                load_test_at,
                skip_readings,
            };
            commands::simulate::run(&config, &opts, format)
        }
        Command::Config => commands::config::show(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulate_defaults() {
        let cli = Cli::try_parse_from(["kubepulse", "simulate"]).unwrap();
        match cli.command {
            Command::Simulate {
                seed,
                duration,
                load_test_at,
                skip_readings,
                format,
            } => {
                assert_eq!(seed, None);
                assert_eq!(duration.as_millis(), 40_000);
                assert_eq!(load_test_at, vec![DurationMs::from_millis(0)]);
                assert!(!skip_readings);
                assert_eq!(format, OutputFormat::Text);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn simulate_repeated_triggers_and_json() {
        let cli = Cli::try_parse_from([
            "kubepulse",
            "--config",
            "pulse.toml",
            "simulate",
            "--load-test-at",
            "1s",
            "--load-test-at",
            "20s",
            "--duration",
            "1m",
            "--format",
            "json",
            "--seed",
            "9",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("pulse.toml")));
        match cli.command {
            Command::Simulate {
                seed,
                duration,
                load_test_at,
                format,
                ..
            } => {
                assert_eq!(seed, Some(9));
                assert_eq!(duration.as_millis(), 60_000);
                assert_eq!(
                    load_test_at,
                    vec![DurationMs::from_secs(1), DurationMs::from_secs(20)]
                );
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn rejects_bad_duration() {
        assert!(Cli::try_parse_from(["kubepulse", "simulate", "--duration", "forever"]).is_err());
    }

    #[test]
    fn live_flags() {
        let cli = Cli::try_parse_from(["kubepulse", "live", "--plain", "--seed", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Live {
                seed: Some(3),
                plain: true
            }
        ));
    }
}
