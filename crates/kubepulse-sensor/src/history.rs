//! Rolling window of recent sensor readings.

use std::collections::VecDeque;

use serde::Serialize;

use kubepulse_core::SensorReading;

/// Insertion-ordered readings, capped at `capacity` (oldest evicted first).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct History {
    #[serde(skip)]
    capacity: usize,
    readings: VecDeque<SensorReading>,
}

impl History {
    pub const DEFAULT_CAPACITY: usize = 20;

    /// Create an empty history. A zero capacity is treated as 1.
    ///
    /// Only up to `DEFAULT_CAPACITY` slots are reserved up front; larger
    /// windows grow as readings arrive.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            readings: VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY)),
        }
    }

    /// Append a reading, returning the evicted one if the window was full.
    pub fn push(&mut self, reading: SensorReading) -> Option<SensorReading> {
        let evicted = if self.readings.len() >= self.capacity {
            self.readings.pop_front()
        } else {
            None
        };
        self.readings.push_back(reading);
        evicted
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Most recent reading.
    pub fn latest(&self) -> Option<&SensorReading> {
        self.readings.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &SensorReading> + '_ {
        self.readings.iter()
    }

    pub fn to_vec(&self) -> Vec<SensorReading> {
        self.readings.iter().copied().collect()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(ts: u64) -> SensorReading {
        SensorReading::new(25.0, 50.0, ts)
    }

    #[test]
    fn fills_up_to_capacity_without_eviction() {
        let mut h = History::with_capacity(3);
        assert!(h.is_empty());
        for ts in 0..3 {
            assert_eq!(h.push(reading(ts)), None);
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.latest().map(|r| r.timestamp), Some(2));
    }

    #[test]
    fn evicts_oldest_on_overflow() {
        let mut h = History::with_capacity(3);
        for ts in 0..3 {
            h.push(reading(ts));
        }
        assert_eq!(h.push(reading(3)).map(|r| r.timestamp), Some(0));

        let stamps: Vec<u64> = h.iter().map(|r| r.timestamp).collect();
        assert_eq!(stamps, vec![1, 2, 3]);
    }

    #[test]
    fn keeps_most_recent_in_order_after_many_pushes() {
        let mut h = History::default();
        for ts in 0..57 {
            h.push(reading(ts));
            assert!(h.len() <= History::DEFAULT_CAPACITY);
        }
        let stamps: Vec<u64> = h.to_vec().iter().map(|r| r.timestamp).collect();
        assert_eq!(stamps, (37..57).collect::<Vec<_>>());
    }

    #[test]
    fn huge_capacity_does_not_reserve_up_front() {
        let mut h = History::with_capacity(1_000_000_000_000_000_000);
        assert_eq!(h.capacity(), 1_000_000_000_000_000_000);
        for ts in 0..25 {
            assert_eq!(h.push(reading(ts)), None);
        }
        assert_eq!(h.len(), 25);
    }

    #[test]
    fn zero_capacity_keeps_one() {
        let mut h = History::with_capacity(0);
        h.push(reading(1));
        h.push(reading(2));
        assert_eq!(h.capacity(), 1);
        assert_eq!(h.to_vec(), vec![reading(2)]);
    }
}
