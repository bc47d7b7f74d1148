//! Data models for the view monitor.
//!
//! Aggregated channel statistics and the per-poll observation that the
//! renderers consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregated statistics for one channel's latest uploads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStats {
    /// Sum of view counts over the fetched videos.
    pub total_views: u64,
    /// Number of videos on the fetched uploads page.
    pub video_count: u64,
}

impl ChannelStats {
    /// Build stats from individual per-video view counts.
    pub fn from_view_counts<I>(video_count: u64, views: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let total_views = views
            .into_iter()
            .fold(0u64, |sum, v| sum.saturating_add(v));

        Self {
            total_views,
            video_count,
        }
    }
}

/// Result of a single successful poll.
#[derive(Debug, Clone, Serialize)]
pub struct Observation {
    /// When the poll completed.
    pub observed_at: DateTime<Utc>,
    /// Freshly fetched stats.
    #[serde(flatten)]
    pub stats: ChannelStats,
    /// Total seen on the previous successful poll, if any.
    pub previous_total: Option<u64>,
    /// Whether the total grew compared to the previous poll.
    pub increased: bool,
}

impl Observation {
    /// Views gained since the previous poll (zero when unknown or not grown).
    pub fn delta(&self) -> u64 {
        match self.previous_total {
            Some(prev) => self.stats.total_views.saturating_sub(prev),
            None => 0,
        }
    }
}

/// Summary returned when monitoring stops.
#[derive(Debug, Clone, Default)]
pub struct MonitorSummary {
    /// Number of successful polls.
    pub polls: u64,
    /// Number of polls that detected growth.
    pub increases: u64,
    /// Last stats seen.
    pub last_stats: Option<ChannelStats>,
}
