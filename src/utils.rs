use chrono::{DateTime, NaiveDate};
use rand::Rng;

use crate::types::SavedEpisode;

/// Generates the opaque CSRF `state` value for one authorization attempt.
///
/// 16 random bytes, hex encoded (32 characters).
pub fn generate_state() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Formats an ISO date (`2024-01-15`) or timestamp (`2024-01-15T10:00:00Z`)
/// as `January 15, 2024`. Anything else, e.g. year-only release dates, is
/// returned unchanged.
pub fn format_date(date: &str) -> String {
    if date.contains('T') {
        return match DateTime::parse_from_rfc3339(date) {
            Ok(dt) => dt.format("%B %d, %Y").to_string(),
            Err(_) => date.to_string(),
        };
    }

    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%B %d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Compact duration for list views: `42:07` or `1h 5m`.
pub fn format_duration_short(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    if minutes >= 60 {
        return format!("{}h {}m", minutes / 60, minutes % 60);
    }
    format!("{}:{:02}", minutes, seconds)
}

/// Verbose duration for detail views: `42m 7s` or `1h 5m 3s`.
pub fn format_duration_long(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    if minutes >= 60 {
        return format!("{}h {}m {}s", minutes / 60, minutes % 60, seconds);
    }
    format!("{}m {}s", minutes, seconds)
}

/// Remaining token lifetime as shown by `auth status`.
pub fn format_remaining(seconds: i64) -> String {
    if seconds > 3600 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else if seconds > 60 {
        format!("{}m", seconds / 60)
    } else {
        format!("{}s", seconds)
    }
}

/// Shortens descriptions longer than 150 characters to 147 plus `...`.
pub fn truncate_description(text: &str) -> String {
    if text.chars().count() <= 150 {
        return text.to_string();
    }
    let mut short: String = text.chars().take(147).collect();
    short.push_str("...");
    short
}

/// Case-insensitive match on episode or show name, keeping at most `limit`
/// hits in library order.
pub fn filter_saved_episodes(
    episodes: &[SavedEpisode],
    query: &str,
    limit: usize,
) -> Vec<SavedEpisode> {
    let needle = query.to_lowercase();
    episodes
        .iter()
        .filter(|saved| {
            let episode_name = saved.episode.name.to_lowercase();
            let show_name = saved
                .episode
                .show
                .as_ref()
                .map(|s| s.name.to_lowercase())
                .unwrap_or_default();
            episode_name.contains(&needle) || show_name.contains(&needle)
        })
        .take(limit)
        .cloned()
        .collect()
}

/// Minimal escaping for text echoed into the callback pages.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
