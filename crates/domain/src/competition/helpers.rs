//! Competition timing, ranking and formatting helpers.

use chrono::{DateTime, NaiveDateTime, Utc};

use super::LeaderboardRow;

const MS_PER_MINUTE: i64 = 60 * 1000;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Returns true if a raw competition object has any v2-only field.
#[must_use]
pub fn looks_like_v2(value: &serde_json::Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    ["state", "rules", "theme", "prizes"]
        .iter()
        .any(|key| obj.contains_key(*key))
        || obj.get("_isV2").and_then(serde_json::Value::as_bool) == Some(true)
}

/// Parses a backend timestamp.
///
/// Accepts RFC 3339 and offset-less ISO 8601 (read as UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Human-readable time left until `end`.
#[must_use]
pub fn time_remaining(end: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (end - now).num_milliseconds();
    if diff <= 0 {
        return "Competition Ended".to_string();
    }

    let days = diff / MS_PER_DAY;
    let hours = (diff % MS_PER_DAY) / MS_PER_HOUR;
    let minutes = (diff % MS_PER_HOUR) / MS_PER_MINUTE;

    if days > 0 {
        format!("{days}d {hours}h remaining")
    } else if hours > 0 {
        format!("{hours}h {minutes}m remaining")
    } else {
        format!("{minutes}m remaining")
    }
}

/// Share of the competition window already elapsed, in `[0, 100]`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn progress_percent(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    if now < start {
        return 0.0;
    }
    if now >= end {
        return 100.0;
    }
    let elapsed = (now - start).num_milliseconds() as f64;
    let total = (end - start).num_milliseconds() as f64;
    (elapsed / total) * 100.0
}

/// 1-based rank of `player_name` by descending points.
///
/// Ties keep server order.
#[must_use]
pub fn player_rank(rows: &[LeaderboardRow], player_name: &str) -> Option<usize> {
    let mut sorted: Vec<&LeaderboardRow> = rows.iter().collect();
    sorted.sort_by(|a, b| b.total_points.total_cmp(&a.total_points));
    sorted
        .iter()
        .position(|row| row.player_name == player_name)
        .map(|idx| idx + 1)
}

/// Compact points label: `1.5K`, `2.3M`.
#[must_use]
pub fn format_points(points: f64) -> String {
    if points >= 1_000_000.0 {
        format!("{:.1}M", points / 1_000_000.0)
    } else if points >= 1_000.0 {
        format!("{:.1}K", points / 1_000.0)
    } else {
        points.to_string()
    }
}
