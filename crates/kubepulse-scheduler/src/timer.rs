//! Timer queue with cancellable handles.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use kubepulse_core::{ScaleDirection, VirtualMillis};

/// What a timer is for. The owner dispatches on this when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPurpose {
    /// Repeating sensor sample.
    SensorPoll,
    /// End of a running load test.
    LoadReset,
    /// One delayed replica step.
    ScaleStep(ScaleDirection),
}

impl fmt::Display for TimerPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerPurpose::SensorPoll => f.write_str("sensor-poll"),
            TimerPurpose::LoadReset => f.write_str("load-reset"),
            TimerPurpose::ScaleStep(dir) => write!(f, "scale-step-{dir}"),
        }
    }
}

/// Handle returned when a timer is armed. Used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A timer that just fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub purpose: TimerPurpose,
    /// The virtual time it was due at (and the clock now reads).
    pub due: VirtualMillis,
}

struct TimerEntry {
    id: TimerId,
    purpose: TimerPurpose,
    /// `Some` for repeating timers.
    period: Option<u64>,
}

type QueueKey = (VirtualMillis, u64);

/// Deterministic timer queue over a virtual millisecond clock.
#[derive(Default)]
pub struct Scheduler {
    now: VirtualMillis,
    next_id: u64,
    next_seq: u64,
    queue: BTreeMap<QueueKey, TimerEntry>,
    /// Timer id → its current queue key, for cancellation.
    index: HashMap<TimerId, QueueKey>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> VirtualMillis {
        self.now
    }

    /// Arm a one-shot timer `delay_ms` from now.
    pub fn schedule_once(&mut self, delay_ms: u64, purpose: TimerPurpose) -> TimerId {
        self.arm(delay_ms, purpose, None)
    }

    /// Arm a timer that fires every `period_ms` until cancelled.
    ///
    /// A zero period is bumped to 1 ms so the queue always makes progress.
    pub fn schedule_repeating(&mut self, period_ms: u64, purpose: TimerPurpose) -> TimerId {
        let period = period_ms.max(1);
        self.arm(period, purpose, Some(period))
    }

    fn arm(&mut self, delay_ms: u64, purpose: TimerPurpose, period: Option<u64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let due = self.now.saturating_add(delay_ms);
        self.insert(due, TimerEntry { id, purpose, period });

        debug!(timer = %id, %purpose, due, repeating = period.is_some(), "timer armed");
        id
    }

    fn insert(&mut self, due: VirtualMillis, entry: TimerEntry) {
        let key = (due, self.next_seq);
        self.next_seq += 1;
        self.index.insert(entry.id, key);
        self.queue.insert(key, entry);
    }

    /// Cancel a pending timer. Returns false if it already fired (one-shot)
    /// or was never armed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.index.remove(&id) {
            Some(key) => {
                if let Some(entry) = self.queue.remove(&key) {
                    debug!(timer = %id, purpose = %entry.purpose, "timer cancelled");
                }
                true
            }
            None => false,
        }
    }

    /// Due time of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<VirtualMillis> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its due time. Repeating timers are re-armed before returning.
    pub fn pop_due(&mut self, until: VirtualMillis) -> Option<FiredTimer> {
        let (&key, _) = self.queue.first_key_value()?;
        if key.0 > until {
            return None;
        }

        let (key, entry) = self.queue.pop_first()?;
        let due = key.0;
        self.index.remove(&entry.id);
        self.now = self.now.max(due);

        let fired = FiredTimer {
            id: entry.id,
            purpose: entry.purpose,
            due,
        };

        if let Some(period) = entry.period {
            self.insert(due.saturating_add(period), entry);
        }

        Some(fired)
    }

    /// Move the clock forward to `to` without firing anything.
    ///
    /// Callers drain `pop_due(to)` first; the clock never moves backwards.
    pub fn advance_clock(&mut self, to: VirtualMillis) {
        self.now = self.now.max(to);
    }

    /// Whether `id` is still armed.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of armed timers.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of armed timers with the given purpose.
    pub fn pending_for(&self, purpose: TimerPurpose) -> usize {
        self.queue.values().filter(|e| e.purpose == purpose).count()
    }
}
