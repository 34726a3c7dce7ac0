// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
///
/// Sub-second digits are kept so that a formatted timestamp parses back to
/// the exact same instant.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse an RFC3339 timestamp into UTC. Returns `None` on malformed input.
pub fn parse_utc_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Current time, strictly later than `previous` when one is given.
///
/// Entity versions are compared by timestamp, so two writes in the same clock
/// tick must still produce distinct, increasing values.
pub fn monotonic_now(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(prev) if prev >= now => prev + Duration::microseconds(1),
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_round_trips_subsecond_precision() {
        let date = Utc.timestamp_opt(1_767_225_600, 123_456_789).unwrap();
        let formatted = format_utc_rfc3339(date);
        assert!(formatted.ends_with('Z'));
        assert_eq!(parse_utc_rfc3339(&formatted), Some(date));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_utc_rfc3339("yesterday"), None);
    }

    #[test]
    fn test_monotonic_now_advances_past_future_previous() {
        let future = Utc::now() + Duration::hours(1);
        let next = monotonic_now(Some(future));
        assert!(next > future);
    }
}
