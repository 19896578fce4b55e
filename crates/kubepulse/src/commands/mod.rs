pub mod config;
pub mod live;
pub mod simulate;

use clap::ValueEnum;

use kubepulse_core::PulseConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// A `--seed` flag wins over the config file.
pub fn apply_seed(config: &mut PulseConfig, seed: Option<u64>) {
    if seed.is_some() {
        config.seed = seed;
    }
}
