//! Human-readable date parsing.
//!
//! Parses strings like "2 days ago", "yesterday", "in 1 week" into UTC
//! instants for the `updated_from` filter.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Parse a human-readable date string into a UTC instant.
///
/// Supports:
/// - RFC 3339: "2026-01-28T12:00:00Z"
/// - Plain datetime: "2026-01-28 12:00:00" (taken as UTC)
/// - Date only: "2026-01-28" (midnight UTC)
/// - Relative past: "2 days ago", "1 week ago", "3 hours ago"
/// - Relative future: "in 2 days", "in 1 week"
/// - Named: "today", "yesterday", "tomorrow", "now"
///
/// Returns None if the string cannot be parsed.
pub fn parse_human_date(input: &str) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    let input = trimmed.to_lowercase();

    if let Ok(dt) = NaiveDateTime::parse_from_str(&input, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    let now = Utc::now();

    match input.as_str() {
        "now" => return Some(now),
        "today" => return start_of_day(now),
        "yesterday" => {
            return start_of_day(now)?.checked_sub_signed(Duration::try_days(1)?);
        }
        "tomorrow" => {
            return start_of_day(now)?.checked_add_signed(Duration::try_days(1)?);
        }
        _ => {}
    }

    if input.ends_with(" ago") {
        return now.checked_sub_signed(parse_ago(&input)?);
    }

    if input.starts_with("in ") {
        return now.checked_add_signed(parse_in_future(&input)?);
    }

    None
}

fn start_of_day(dt: DateTime<Utc>) -> Option<DateTime<Utc>> {
    dt.date_naive().and_hms_opt(0, 0, 0).map(|d| d.and_utc())
}

/// Parse "X unit(s) ago" pattern
fn parse_ago(input: &str) -> Option<Duration> {
    let without_ago = input.trim().strip_suffix(" ago")?;
    parse_duration(without_ago)
}

/// Parse "in X unit(s)" pattern
fn parse_in_future(input: &str) -> Option<Duration> {
    let without_in = input.trim().strip_prefix("in ")?;
    parse_duration(without_in)
}

/// Parse a duration like "2 days", "1 week", "3h"
fn parse_duration(input: &str) -> Option<Duration> {
    let parts: Vec<&str> = input.split_whitespace().collect();

    match parts.as_slice() {
        [num, unit] => unit_to_duration(unit, num.parse().ok()?),
        [word] => {
            let num_end = word.chars().take_while(|c| c.is_ascii_digit()).count();
            if num_end == 0 || num_end == word.len() {
                return None;
            }
            unit_to_duration(&word[num_end..], word[..num_end].parse().ok()?)
        }
        _ => None,
    }
}

/// Returns `None` for unknown units and for amounts outside the `Duration` range.
fn unit_to_duration(unit: &str, num: i64) -> Option<Duration> {
    let unit = unit.trim_end_matches('s');
    match unit {
        "second" | "sec" => Duration::try_seconds(num),
        "minute" | "min" => Duration::try_minutes(num),
        "hour" | "hr" | "h" => Duration::try_hours(num),
        "day" | "d" => Duration::try_days(num),
        "week" | "wk" | "w" => Duration::try_weeks(num),
        "month" | "mon" => Duration::try_days(num.checked_mul(30)?),
        "year" | "yr" | "y" => Duration::try_days(num.checked_mul(365)?),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rfc3339() {
        assert_eq!(
            parse_human_date("2026-01-28T12:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2026, 1, 28, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_plain_datetime() {
        assert_eq!(
            parse_human_date("2026-01-28 12:00:00"),
            Some(Utc.with_ymd_and_hms(2026, 1, 28, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_date_only() {
        assert_eq!(
            parse_human_date("2026-01-28"),
            Some(Utc.with_ymd_and_hms(2026, 1, 28, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_named_dates() {
        let today = parse_human_date("today").unwrap();
        let yesterday = parse_human_date("yesterday").unwrap();
        let tomorrow = parse_human_date("tomorrow").unwrap();
        assert_eq!(today - yesterday, Duration::days(1));
        assert_eq!(tomorrow - today, Duration::days(1));
        assert!(parse_human_date("now").is_some());
    }

    #[test]
    fn test_ago_pattern() {
        let now = Utc::now();
        let two_days = parse_human_date("2 days ago").unwrap();
        assert!(two_days < now - Duration::days(2) + Duration::minutes(1));
        assert!(parse_human_date("1 week ago").is_some());
        assert!(parse_human_date("3h ago").is_some());
        assert!(parse_human_date("30 minutes ago").is_some());
    }

    #[test]
    fn test_in_future_pattern() {
        assert!(parse_human_date("in 2 days").unwrap() > Utc::now());
        assert!(parse_human_date("in 1 week").is_some());
    }

    #[test]
    fn test_invalid() {
        assert!(parse_human_date("not a date").is_none());
        assert!(parse_human_date("blah blah").is_none());
        assert!(parse_human_date("12 ago").is_none());
    }

    #[test]
    fn test_out_of_range_durations() {
        assert!(parse_human_date("9999999999999999 days ago").is_none());
        assert!(parse_human_date("999999999999 years ago").is_none());
        assert!(parse_human_date("99999999999999999 months ago").is_none());
        assert!(parse_human_date("in 9999999999999999 weeks").is_none());
        assert!(parse_human_date("in 9999999999999999999 seconds").is_none());
        // Fits in a Duration but not in the calendar range.
        assert!(parse_human_date("in 999999999 days").is_none());
    }
}
