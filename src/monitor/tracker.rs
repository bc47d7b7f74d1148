//! Increase detection across polls.

use crate::models::{ChannelStats, Observation};
use chrono::{DateTime, Utc};

/// Remembers the last observed total and flags growth.
#[derive(Debug, Default)]
pub struct ViewTracker {
    last_total: Option<u64>,
}

impl ViewTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record fresh stats, stamped now.
    pub fn observe(&mut self, stats: ChannelStats) -> Observation {
        self.observe_at(stats, Utc::now())
    }

    /// Record fresh stats with an explicit timestamp.
    ///
    /// `increased` is only true when a previous total exists and the new
    /// total is strictly greater. The stored total always follows the latest
    /// poll, so a drop followed by a recovery rings again.
    pub fn observe_at(&mut self, stats: ChannelStats, observed_at: DateTime<Utc>) -> Observation {
        let previous_total = self.last_total;
        let increased = matches!(previous_total, Some(prev) if stats.total_views > prev);
        self.last_total = Some(stats.total_views);

        Observation {
            observed_at,
            stats,
            previous_total,
            increased,
        }
    }

    #[allow(dead_code)] // Accessor for callers inspecting state between polls
    pub fn last_total(&self) -> Option<u64> {
        self.last_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total_views: u64) -> ChannelStats {
        ChannelStats {
            total_views,
            video_count: 1,
        }
    }

    #[test]
    fn test_first_observation_never_increases() {
        let mut tracker = ViewTracker::new();
        let obs = tracker.observe(stats(500));
        assert!(!obs.increased);
        assert_eq!(obs.previous_total, None);
        assert_eq!(tracker.last_total(), Some(500));
    }

    #[test]
    fn test_increase_only_when_strictly_greater() {
        let mut tracker = ViewTracker::new();
        tracker.observe(stats(100));

        assert!(!tracker.observe(stats(100)).increased);
        assert!(tracker.observe(stats(101)).increased);
        assert!(!tracker.observe(stats(99)).increased);
    }

    #[test]
    fn test_drop_then_recovery_rings_again() {
        let mut tracker = ViewTracker::new();
        tracker.observe(stats(200));
        tracker.observe(stats(150));

        let obs = tracker.observe(stats(180));
        assert!(obs.increased);
        assert_eq!(obs.previous_total, Some(150));
        assert_eq!(obs.delta(), 30);
    }

    #[test]
    fn test_zero_to_positive() {
        let mut tracker = ViewTracker::new();
        tracker.observe(stats(0));
        assert!(tracker.observe(stats(1)).increased);
    }
}
