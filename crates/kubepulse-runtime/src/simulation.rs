//! Simulation controller: owns the state and dispatches timers.

use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace};

use kubepulse_autoscale::{AutoscaleController, ScaleDecision};
use kubepulse_core::{EpochMillis, PulseConfig, ScaleDirection, VirtualMillis};
use kubepulse_scheduler::{FiredTimer, Scheduler, TimerId, TimerPurpose};
use kubepulse_sensor::SensorSimulator;
use kubepulse_trigger::LoadTrigger;

use crate::state::{DashboardState, StateChange};

/// Callback invoked after every state change.
pub type Observer = Box<dyn FnMut(&DashboardState, &StateChange) + Send>;

/// The single controller object behind the dashboard.
pub struct Simulation<R = StdRng> {
    state: DashboardState,
    scheduler: Scheduler,
    sensor: SensorSimulator<R>,
    trigger: LoadTrigger,
    autoscaler: AutoscaleController,
    poll_interval_ms: u64,
    /// Wall-clock time at virtual time zero, used to stamp readings.
    epoch_ms: EpochMillis,
    poll_timer: Option<TimerId>,
    started: bool,
    observers: Vec<Observer>,
}

impl Simulation<StdRng> {
    /// Build from config, seeding the sensor RNG from `config.seed` or a
    /// random seed when absent.
    pub fn from_config(config: &PulseConfig, epoch_ms: EpochMillis) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        debug!(seed, "sensor rng seeded");
        Self::with_sensor(config, SensorSimulator::seeded(&config.sensor, seed), epoch_ms)
    }
}

impl<R: Rng> Simulation<R> {
    /// Build with a caller-supplied random source.
    pub fn with_rng(config: &PulseConfig, rng: R, epoch_ms: EpochMillis) -> Self {
        Self::with_sensor(config, SensorSimulator::with_rng(&config.sensor, rng), epoch_ms)
    }

    fn with_sensor(config: &PulseConfig, sensor: SensorSimulator<R>, epoch_ms: EpochMillis) -> Self {
        let trigger = LoadTrigger::new(&config.load_test);
        let autoscaler = AutoscaleController::new(&config.autoscale);
        let state = DashboardState::initial(
            autoscaler.initial_replicas(),
            trigger.idle_load(),
            config.sensor.history_capacity,
        );

        Self {
            state,
            scheduler: Scheduler::new(),
            sensor,
            trigger,
            autoscaler,
            poll_interval_ms: config.sensor.poll_interval.as_millis(),
            epoch_ms,
            poll_timer: None,
            started: false,
            observers: Vec::new(),
        }
    }

    /// Register an observer. It sees every change from now on.
    pub fn subscribe(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn now(&self) -> VirtualMillis {
        self.scheduler.now()
    }

    pub fn autoscaler(&self) -> &AutoscaleController {
        &self.autoscaler
    }

    /// Take the first sample, arm the sensor-poll timer, and run the
    /// autoscale rule once. Later calls do nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        self.sample_sensor();
        self.poll_timer = Some(
            self.scheduler
                .schedule_repeating(self.poll_interval_ms, TimerPurpose::SensorPoll),
        );
        self.evaluate_autoscale();

        info!(
            replicas = self.state.replicas.get(),
            cpu = self.state.cpu_load.percent(),
            poll_interval_ms = self.poll_interval_ms,
            "simulation started"
        );
    }

    /// Start a load test. Returns false, changing nothing, if one is
    /// already running.
    pub fn start_load_test(&mut self) -> bool {
        let Some(started) = self.trigger.start() else {
            return false;
        };

        self.scheduler
            .schedule_once(started.reset_after_ms, TimerPurpose::LoadReset);

        let cpu_changed = self.state.cpu_load != started.cpu;
        self.state.cpu_load = started.cpu;
        self.state.load_test_active = true;
        self.notify(StateChange::LoadTestStarted { cpu: started.cpu });

        if cpu_changed {
            self.evaluate_autoscale();
        }
        true
    }

    /// Fire every timer due at or before `until`, then move the clock to
    /// `until`. Returns the number of timers fired.
    pub fn advance_to(&mut self, until: VirtualMillis) -> usize {
        let mut fired = 0;
        while let Some(timer) = self.scheduler.pop_due(until) {
            self.state.now_ms = timer.due;
            self.fire(timer);
            fired += 1;
        }
        self.scheduler.advance_clock(until);
        self.state.now_ms = self.scheduler.now();
        fired
    }

    /// `advance_to(now + delta_ms)`.
    pub fn advance_by(&mut self, delta_ms: u64) -> usize {
        self.advance_to(self.now().saturating_add(delta_ms))
    }

    /// Virtual time of the next pending timer.
    pub fn next_deadline(&self) -> Option<VirtualMillis> {
        self.scheduler.next_deadline()
    }

    /// Number of pending timers with `purpose`.
    pub fn pending_timers(&self, purpose: TimerPurpose) -> usize {
        self.scheduler.pending_for(purpose)
    }

    /// Stop sensor polling. Pending one-shot timers stay armed.
    pub fn teardown(&mut self) {
        if let Some(id) = self.poll_timer.take() {
            self.scheduler.cancel(id);
            info!(at_ms = self.now(), "simulation torn down, sensor polling stopped");
        }
    }

    fn fire(&mut self, timer: FiredTimer) {
        trace!(timer = %timer.id, purpose = %timer.purpose, due = timer.due, "timer fired");
        match timer.purpose {
            TimerPurpose::SensorPoll => self.sample_sensor(),
            TimerPurpose::LoadReset => self.finish_load_test(),
            TimerPurpose::ScaleStep(direction) => self.step_replicas(direction),
        }
    }

    fn sample_sensor(&mut self) {
        let timestamp = self.epoch_ms.saturating_add(self.scheduler.now());
        let reading = self.sensor.sample(timestamp);
        self.state.current = reading;
        self.state.history.clone_from(self.sensor.history());
        self.notify(StateChange::ReadingSampled { reading });
    }

    fn finish_load_test(&mut self) {
        let Some(idle) = self.trigger.finish() else {
            return;
        };

        let cpu_changed = self.state.cpu_load != idle;
        self.state.cpu_load = idle;
        self.state.load_test_active = false;
        self.notify(StateChange::LoadTestFinished { cpu: idle });

        if cpu_changed {
            self.evaluate_autoscale();
        }
    }

    fn step_replicas(&mut self, direction: ScaleDirection) {
        let from = self.state.replicas;
        let to = self.autoscaler.apply(from, direction);
        if to == from {
            debug!(%direction, replicas = from.get(), "scale step saturated, ignored");
            return;
        }

        self.state.replicas = to;
        info!(
            %direction,
            from = from.get(),
            to = to.get(),
            cpu = self.state.cpu_load.percent(),
            "replicas scaled"
        );
        self.notify(StateChange::ReplicasScaled {
            direction,
            from,
            to,
        });
        self.evaluate_autoscale();
    }

    fn evaluate_autoscale(&mut self) {
        let decision = self
            .autoscaler
            .evaluate(self.state.cpu_load, self.state.replicas);

        if let ScaleDecision::Step {
            direction,
            delay_ms,
        } = decision
        {
            self.scheduler
                .schedule_once(delay_ms, TimerPurpose::ScaleStep(direction));
        }
    }

    fn notify(&mut self, change: StateChange) {
        for observer in &mut self.observers {
            observer(&self.state, &change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use kubepulse_core::{CpuLoad, ReplicaCount};

    fn sim() -> Simulation {
        let config = PulseConfig {
            seed: Some(11),
            ..PulseConfig::default()
        };
        Simulation::from_config(&config, 1_700_000_000_000)
    }

    #[test]
    fn initial_state_before_start() {
        let s = sim();
        let state = s.state();
        assert_eq!(state.replicas.get(), 1);
        assert_eq!(state.cpu_load, CpuLoad::new(20));
        assert!(!state.load_test_active);
        assert!(state.history.is_empty());
        assert_eq!(state.current.temperature, 0.0);
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn start_samples_immediately_and_arms_poll() {
        let mut s = sim();
        s.start();

        assert_eq!(s.state().history.len(), 1);
        assert_eq!(s.state().current.timestamp, 1_700_000_000_000);
        assert_eq!(s.pending_timers(TimerPurpose::SensorPoll), 1);
        assert_eq!(s.next_deadline(), Some(2000));

        // Idle load with one replica: nothing to scale.
        assert_eq!(s.pending_timers(TimerPurpose::ScaleStep(ScaleDirection::Up)), 0);
        assert_eq!(s.pending_timers(TimerPurpose::ScaleStep(ScaleDirection::Down)), 0);
    }

    #[test]
    fn start_twice_is_noop() {
        let mut s = sim();
        s.start();
        s.start();
        assert_eq!(s.state().history.len(), 1);
        assert_eq!(s.pending_timers(TimerPurpose::SensorPoll), 1);
    }

    #[test]
    fn readings_stamped_with_virtual_time() {
        let mut s = sim();
        s.start();
        s.advance_to(6000);

        let stamps: Vec<u64> = s.state().history.iter().map(|r| r.timestamp).collect();
        let base = 1_700_000_000_000;
        assert_eq!(stamps, vec![base, base + 2000, base + 4000, base + 6000]);
        assert_eq!(s.state().now_ms, 6000);
    }

    #[test]
    fn load_test_arms_reset_and_first_step() {
        let mut s = sim();
        s.start();
        assert!(s.start_load_test());

        assert_eq!(s.state().cpu_load, CpuLoad::new(85));
        assert!(s.state().load_test_active);
        assert_eq!(s.pending_timers(TimerPurpose::LoadReset), 1);
        assert_eq!(s.pending_timers(TimerPurpose::ScaleStep(ScaleDirection::Up)), 1);
    }

    #[test]
    fn second_trigger_changes_nothing() {
        let mut s = sim();
        s.start();
        s.start_load_test();
        s.advance_by(500);
        let before = s.state().clone();

        assert!(!s.start_load_test());
        assert_eq!(s.state(), &before);
        assert_eq!(s.pending_timers(TimerPurpose::LoadReset), 1);
        assert_eq!(s.pending_timers(TimerPurpose::ScaleStep(ScaleDirection::Up)), 1);
    }

    #[test]
    fn observers_see_each_change() {
        let mut s = sim();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        s.subscribe(Box::new(move |state, change| {
            sink.lock().unwrap().push((state.now_ms, *change));
        }));

        s.start();
        s.start_load_test();
        s.advance_to(1000);

        let seen = seen.lock().unwrap();
        assert!(matches!(seen[0], (0, StateChange::ReadingSampled { .. })));
        assert_eq!(seen[1], (0, StateChange::LoadTestStarted { cpu: CpuLoad::new(85) }));
        let bounds = s.autoscaler().bounds();
        assert_eq!(
            seen[2],
            (
                1000,
                StateChange::ReplicasScaled {
                    direction: ScaleDirection::Up,
                    from: ReplicaCount::new(1, bounds),
                    to: ReplicaCount::new(2, bounds),
                }
            )
        );
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn teardown_stops_polling_but_keeps_one_shots() {
        let mut s = sim();
        s.start();
        s.start_load_test();
        s.teardown();

        assert_eq!(s.pending_timers(TimerPurpose::SensorPoll), 0);
        assert_eq!(s.pending_timers(TimerPurpose::LoadReset), 1);

        s.advance_to(60_000);
        assert_eq!(s.state().history.len(), 1);
        assert_eq!(s.state().cpu_load, CpuLoad::new(20));
        assert_eq!(s.state().replicas.get(), 1);
    }

    #[test]
    fn advance_backwards_is_noop() {
        let mut s = sim();
        s.start();
        s.advance_to(4000);
        assert_eq!(s.advance_to(1000), 0);
        assert_eq!(s.now(), 4000);
    }
}
