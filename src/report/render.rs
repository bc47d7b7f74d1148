//! Text and JSON Lines rendering of observations.
//!
//! Text output is meant for a watching human; JSON Lines for piping into
//! other tools. Both go to stdout, one line per poll.

use crate::models::{MonitorSummary, Observation};
use anyhow::Result;

/// Group digits in thousands: `1234567` → `1,234,567`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

/// Render one observation as a human-readable line.
pub fn render_text(observation: &Observation) -> String {
    let mut line = format!(
        "[{}] 🎬 Videos: {} | 👁  Total views: {}",
        observation.observed_at.format("%Y-%m-%d %H:%M:%S"),
        format_count(observation.stats.video_count),
        format_count(observation.stats.total_views),
    );

    if observation.increased {
        line.push_str(&format!(" (🔔 +{})", format_count(observation.delta())));
    } else if let Some(prev) = observation.previous_total {
        if observation.stats.total_views < prev {
            line.push_str(&format!(
                " (-{})",
                format_count(prev - observation.stats.total_views)
            ));
        }
    }

    line
}

/// Render one observation as a single JSON object (no trailing newline).
pub fn render_json(observation: &Observation) -> Result<String> {
    serde_json::to_string(observation).map_err(|e| anyhow::anyhow!("Failed to serialize: {}", e))
}

/// Closing summary printed when monitoring stops.
pub fn render_summary(summary: &MonitorSummary) -> String {
    let mut text = String::new();

    text.push_str("📊 Monitoring Summary:\n");
    text.push_str(&format!("   Polls: {}\n", summary.polls));
    text.push_str(&format!("   Increases: {}\n", summary.increases));
    if let Some(stats) = summary.last_stats {
        text.push_str(&format!("   Videos: {}\n", format_count(stats.video_count)));
        text.push_str(&format!(
            "   Total views: {}\n",
            format_count(stats.total_views)
        ));
    }

    text
}
