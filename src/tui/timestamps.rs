use chrono::{DateTime, Utc};

use crate::utils::format_date;

/// List timestamp with tiered display:
/// - Relative for <7 days: "2h ago", "3d ago"
/// - Absolute otherwise: "2024-12-03 4:05 PM"
pub fn format_timestamp(timestamp_ms: i64) -> String {
    format_timestamp_at(timestamp_ms, Utc::now())
}

fn format_timestamp_at(timestamp_ms: i64, now: DateTime<Utc>) -> String {
    let Some(timestamp) = DateTime::from_timestamp_millis(timestamp_ms) else {
        return format_date(timestamp_ms);
    };
    let duration = now.signed_duration_since(timestamp);

    // Future mtimes (clock skew) fall through to the absolute form
    if duration.num_seconds() >= 0 && duration.num_days() < 7 {
        format_relative(duration.num_seconds())
    } else {
        format_date(timestamp_ms)
    }
}

fn format_relative(seconds: i64) -> String {
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        "just now".to_string()
    }
}
