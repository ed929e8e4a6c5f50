//! Cadence tracker: measures the real spacing between window changes and
//! hands it to the renderer as the next transition's duration.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Default transition length before any change has been observed.
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(1000);

/// Tracks when a dependency value last changed.
///
/// Each instance owns its state; nothing is shared between charts.
#[derive(Debug, Clone)]
pub struct CadenceTracker<T> {
    last_value: T,
    last_change: DateTime<Utc>,
    period: Duration,
}

impl<T: PartialEq + Clone> CadenceTracker<T> {
    /// Start tracking from `initial`, measuring from now.
    pub fn new(initial: T, default: Duration) -> Self {
        Self::starting_at(initial, default, Utc::now())
    }

    /// Start tracking from `initial`, measuring from `start`.
    pub fn starting_at(initial: T, default: Duration, start: DateTime<Utc>) -> Self {
        Self {
            last_value: initial,
            last_change: start,
            period: default,
        }
    }

    /// Observe the dependency on a render pass at the current time.
    pub fn observe(&mut self, value: &T) -> Duration {
        self.observe_at(value, Utc::now())
    }

    /// Observe the dependency at `now`. When it differs from the last value
    /// seen, the elapsed time since the previous change becomes the cadence.
    pub fn observe_at(&mut self, value: &T, now: DateTime<Utc>) -> Duration {
        if *value != self.last_value {
            self.period = (now - self.last_change).to_std().unwrap_or(Duration::ZERO);
            self.last_change = now;
            self.last_value = value.clone();
        }
        self.period
    }

    /// The current cadence.
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn last_change(&self) -> DateTime<Utc> {
        self.last_change
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn at(start: DateTime<Utc>, ms: i64) -> DateTime<Utc> {
        start + TimeDelta::milliseconds(ms)
    }

    #[test]
    fn test_default_before_any_change() {
        let tracker = CadenceTracker::new(0u64, DEFAULT_CADENCE);
        assert_eq!(tracker.period(), Duration::from_millis(1000));
    }

    #[test]
    fn test_cadence_follows_change_spacing() {
        let start = Utc::now();
        let mut tracker = CadenceTracker::starting_at(0u64, DEFAULT_CADENCE, start);

        // First change at t=0 measures from construction.
        assert_eq!(tracker.observe_at(&1, at(start, 0)), Duration::ZERO);
        assert_eq!(tracker.observe_at(&2, at(start, 1000)), Duration::from_millis(1000));
        assert_eq!(tracker.observe_at(&3, at(start, 1300)), Duration::from_millis(300));
    }

    #[test]
    fn test_unchanged_value_keeps_cadence() {
        let start = Utc::now();
        let mut tracker = CadenceTracker::starting_at(0u64, DEFAULT_CADENCE, start);
        tracker.observe_at(&1, at(start, 500));
        assert_eq!(tracker.observe_at(&1, at(start, 5000)), Duration::from_millis(500));
        // The repeated observation does not move the reference instant.
        assert_eq!(tracker.observe_at(&2, at(start, 800)), Duration::from_millis(300));
    }

    #[test]
    fn test_clock_going_backwards_clamps_to_zero() {
        let start = Utc::now();
        let mut tracker = CadenceTracker::starting_at(0u64, DEFAULT_CADENCE, start);
        assert_eq!(tracker.observe_at(&1, at(start, -50)), Duration::ZERO);
    }

    #[test]
    fn test_tracks_any_comparable_value() {
        let start = Utc::now();
        let mut tracker = CadenceTracker::starting_at(vec![1.0], DEFAULT_CADENCE, start);
        assert_eq!(tracker.observe_at(&vec![1.0], at(start, 100)), DEFAULT_CADENCE);
        assert_eq!(tracker.observe_at(&vec![1.0, 2.0], at(start, 250)), Duration::from_millis(250));
    }
}
