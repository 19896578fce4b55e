//! Sensor simulator: uniform random readings into a rolling history.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::trace;

use kubepulse_core::config::{SampleRange, SensorConfig};
use kubepulse_core::{EpochMillis, SensorReading};

use crate::history::History;

/// Produces synthetic readings and owns the history they land in.
pub struct SensorSimulator<R = StdRng> {
    rng: R,
    temperature: SampleRange,
    humidity: SampleRange,
    history: History,
    samples_taken: u64,
}

impl SensorSimulator<StdRng> {
    /// Build a simulator with a seeded `StdRng`.
    pub fn seeded(config: &SensorConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SensorSimulator<R> {
    pub fn with_rng(config: &SensorConfig, rng: R) -> Self {
        Self {
            rng,
            temperature: config.temperature,
            humidity: config.humidity,
            history: History::with_capacity(config.history_capacity),
            samples_taken: 0,
        }
    }

    /// Draw a reading stamped `timestamp` and append it to the history.
    pub fn sample(&mut self, timestamp: EpochMillis) -> SensorReading {
        let reading = SensorReading::new(
            draw(&mut self.rng, self.temperature),
            draw(&mut self.rng, self.humidity),
            timestamp,
        );
        self.samples_taken += 1;

        if let Some(evicted) = self.history.push(reading) {
            trace!(evicted_ts = evicted.timestamp, "history full, evicted oldest reading");
        }
        reading
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Total readings generated, including evicted ones.
    pub fn samples_taken(&self) -> u64 {
        self.samples_taken
    }
}

fn draw<R: Rng>(rng: &mut R, range: SampleRange) -> f64 {
    rng.gen_range(range.low..range.high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_stay_in_half_open_ranges() {
        let mut sim = SensorSimulator::seeded(&SensorConfig::default(), 7);
        for ts in 0..5_000 {
            let r = sim.sample(ts);
            assert!((20.0..40.0).contains(&r.temperature), "temperature {}", r.temperature);
            assert!((30.0..80.0).contains(&r.humidity), "humidity {}", r.humidity);
            assert_eq!(r.timestamp, ts);
        }
        assert_eq!(sim.samples_taken(), 5_000);
    }

    #[test]
    fn custom_ranges_are_respected() {
        let config = SensorConfig {
            temperature: SampleRange::new(-5.0, -4.0),
            humidity: SampleRange::new(99.0, 99.5),
            ..SensorConfig::default()
        };
        let mut sim = SensorSimulator::seeded(&config, 1);
        for ts in 0..500 {
            let r = sim.sample(ts);
            assert!(config.temperature.contains(r.temperature));
            assert!(config.humidity.contains(r.humidity));
        }
    }

    #[test]
    fn history_holds_latest_twenty_in_generation_order() {
        let mut sim = SensorSimulator::seeded(&SensorConfig::default(), 3);
        let mut generated = Vec::new();
        for ts in 0..33 {
            generated.push(sim.sample(ts * 2000));
        }

        assert_eq!(sim.history().len(), 20);
        assert_eq!(sim.history().to_vec(), generated[13..].to_vec());
        assert_eq!(sim.history().latest(), generated.last());
    }

    #[test]
    fn same_seed_same_readings() {
        let config = SensorConfig::default();
        let mut a = SensorSimulator::seeded(&config, 99);
        let mut b = SensorSimulator::seeded(&config, 99);
        for ts in 0..10 {
            assert_eq!(a.sample(ts), b.sample(ts));
        }
    }
}
