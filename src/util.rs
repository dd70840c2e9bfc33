// src/util.rs — Shared display helpers

use chrono::{DateTime, TimeZone, Utc};

/// Truncate a string for display/logging (UTF-8 safe).
///
/// Returns a substring of at most `max_len` bytes, cut on a character boundary.
pub fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}

/// Single-line preview with an ellipsis when shortened.
pub fn preview(s: &str, max_len: usize) -> String {
    let line = s.lines().next().unwrap_or("").trim();
    if line.len() <= max_len && !s.trim().contains('\n') {
        line.to_string()
    } else {
        format!("{}...", truncate_str(line, max_len.saturating_sub(3)))
    }
}

/// "5 minutes ago"-style distance between an epoch-ms timestamp and `now`.
pub fn relative_time(epoch_ms: i64, now: DateTime<Utc>) -> String {
    let Some(then) = Utc.timestamp_millis_opt(epoch_ms).single() else {
        return "unknown".into();
    };
    let secs = (now - then).num_seconds();
    if secs < 45 {
        return "just now".into();
    }
    let (n, unit) = match secs {
        s if s < 3_600 => ((s + 30) / 60, "minute"),
        s if s < 86_400 => ((s + 1_800) / 3_600, "hour"),
        s if s < 2_592_000 => ((s + 43_200) / 86_400, "day"),
        s if s < 31_536_000 => ((s + 1_296_000) / 2_592_000, "month"),
        s => ((s + 15_768_000) / 31_536_000, "year"),
    };
    let n = n.max(1);
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn test_truncate_multibyte() {
        // "café" is 5 bytes (é = 2 bytes), truncating at 4 should not split é
        assert_eq!(truncate_str("café", 4), "caf");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 20), "short");
        assert_eq!(preview("a fairly long line of text", 10), "a fairl...");
        assert_eq!(preview("first\nsecond", 20), "first...");
    }

    #[test]
    fn test_relative_time() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let ms = now.timestamp_millis();
        assert_eq!(relative_time(ms - 10_000, now), "just now");
        assert_eq!(relative_time(ms - 60_000, now), "1 minute ago");
        assert_eq!(relative_time(ms - 5 * 60_000, now), "5 minutes ago");
        assert_eq!(relative_time(ms - 3 * 3_600_000, now), "3 hours ago");
        assert_eq!(relative_time(ms - 2 * 86_400_000, now), "2 days ago");
    }
}
