// LogTriage - GPL-3.0-or-later
// This file is part of LogTriage.
//
// Copyright (C) 2025 Daniel Freiermuth
//
// LogTriage is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// LogTriage is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with LogTriage.  If not, see <https://www.gnu.org/licenses/>.

//! Heuristic, schema-less line normalization.
//!
//! Every raw line becomes a [`LogEntry`]; extraction misses are resolved by
//! fallbacks (ingestion time, `INFO`, omitted metadata keys) and never fail.

pub mod line;
pub mod metadata;

use chrono::{DateTime, Local, NaiveDateTime};
use fancy_regex::Regex;
use line::{LogEntry, LogLevel, TimestampSource};
use std::ops::Range;
use std::sync::LazyLock;

// Group 1 is parsed; the fraction and zone suffix are only consumed
static ISO_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?")
        .expect("valid regex literal")
});

static STANDARD_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2}\s\d{2}:\d{2}:\d{2})").expect("valid regex literal")
});

// 10 to 13 digits, read as milliseconds since the epoch
static EPOCH_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{10,13})").expect("valid regex literal"));

static LOG_LEVEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(DEBUG|INFO|WARNING|ERROR|CRITICAL|WARN|ERR)\b")
        .expect("valid regex literal")
});

static LEADING_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s\[\]()\-:|,;]+").expect("valid regex literal"));

/// Log timestamps are zone-less wall-clock readings and never pass through
/// the host timezone.
type TimestampParser = fn(&str) -> Option<NaiveDateTime>;

/// Timestamp patterns in priority order. The first pattern whose first match
/// parses wins; a match that fails to parse falls through to the next pattern.
static TIMESTAMP_PATTERNS: [(&LazyLock<Regex>, TimestampParser); 3] = [
    (&ISO_TIMESTAMP, parse_iso),
    (&STANDARD_TIMESTAMP, parse_standard),
    (&EPOCH_TIMESTAMP, parse_epoch_millis),
];

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok()
}

fn parse_standard(s: &str) -> Option<NaiveDateTime> {
    // The separator may be any single whitespace character
    let normalized: String = s
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S").ok()
}

// Epoch readings are expressed as UTC wall-clock time
fn parse_epoch_millis(s: &str) -> Option<NaiveDateTime> {
    let millis = s.parse::<i64>().ok()?;
    DateTime::from_timestamp_millis(millis).map(|utc| utc.naive_utc())
}

/// Find the timestamp and the byte range it was read from
fn extract_timestamp(line: &str) -> Option<(NaiveDateTime, Range<usize>)> {
    TIMESTAMP_PATTERNS.iter().find_map(|(pattern, parse)| {
        let caps = pattern.captures(line).ok().flatten()?;
        let m = caps.get(1)?;
        let whole = caps.get(0)?;
        parse(m.as_str()).map(|ts| (ts, whole.range()))
    })
}

fn extract_level(line: &str) -> Option<LogLevel> {
    let caps = LOG_LEVEL.captures(line).ok().flatten()?;
    caps.get(1).and_then(|m| LogLevel::from_token(m.as_str()))
}

/// Remove every match of `pattern` from `text`
fn strip_all(text: &str, pattern: &Regex) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in pattern.find_iter(text).filter_map(Result::ok) {
        out.push_str(&text[last..m.start()]);
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

fn strip_first(text: &str, pattern: &Regex) -> String {
    match pattern.find(text) {
        Ok(Some(m)) => format!("{}{}", &text[..m.start()], &text[m.end()..]),
        _ => text.to_string(),
    }
}

/// Strip timestamps, the level token and leading bracket/dash/colon noise
fn extract_message(line: &str, epoch_range: Option<Range<usize>>) -> String {
    let mut message = match epoch_range {
        Some(range) => format!("{}{}", &line[..range.start], &line[range.end..]),
        None => line.to_string(),
    };
    message = strip_all(&message, &ISO_TIMESTAMP);
    message = strip_all(&message, &STANDARD_TIMESTAMP);
    message = strip_first(&message, &LOG_LEVEL);
    message = strip_first(&message, &LEADING_NOISE);
    message.trim().to_string()
}

/// Normalize one non-empty raw line, falling back to the current local wall
/// clock when no timestamp can be extracted.
pub fn normalize_line(raw: &str) -> LogEntry {
    normalize_line_at(raw, Local::now().naive_local())
}

/// Normalize one non-empty raw line using `now` as the fallback timestamp
pub fn normalize_line_at(raw: &str, now: NaiveDateTime) -> LogEntry {
    let (timestamp, timestamp_source, epoch_range) = match extract_timestamp(raw) {
        Some((ts, range)) => {
            // ISO and standard timestamps are stripped by pattern anyway
            let epoch_range = is_epoch_match(raw, &range).then_some(range);
            (ts, TimestampSource::Extracted, epoch_range)
        }
        None => (now, TimestampSource::Ingested, None),
    };

    let level = extract_level(raw).unwrap_or_default();
    let message = extract_message(raw, epoch_range);

    LogEntry::new(timestamp, level, message)
        .with_timestamp_source(timestamp_source)
        .with_metadata(metadata::extract_metadata(raw))
        .with_raw_line(raw)
}

fn is_epoch_match(raw: &str, range: &Range<usize>) -> bool {
    raw[range.clone()].bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::line::MAX_MESSAGE_CHARS;
    use crate::parser::metadata::{KEY_ERROR_CODES, KEY_HTTP_STATUS, KEY_IPS};
    use chrono::{Datelike, NaiveDate, Timelike};

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 6, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid fixed time")
    }

    #[test]
    fn test_standard_timestamp_line() {
        let entry = normalize_line("2024-01-15 10:30:45 INFO Application started");
        assert_eq!(entry.level(), LogLevel::Info);
        assert_eq!(entry.message(), "Application started");
        assert!(entry.has_extracted_timestamp());
        assert_eq!(entry.timestamp().year(), 2024);
        assert_eq!(entry.timestamp().hour(), 10);
        assert_eq!(entry.timestamp().second(), 45);
    }

    #[test]
    fn test_iso_timestamp_line() {
        let entry = normalize_line("2025-11-20T14:23:45.123Z ERROR Connection failed");
        assert!(entry.has_extracted_timestamp());
        assert_eq!(entry.timestamp().minute(), 23);
        assert_eq!(entry.level(), LogLevel::Error);
        assert_eq!(entry.message(), "Connection failed");
    }

    #[test]
    fn test_iso_offset_suffix_is_stripped() {
        let entry = normalize_line("2024-05-01T08:00:00+02:00 WARN slow start");
        assert_eq!(entry.timestamp().hour(), 8);
        assert_eq!(entry.message(), "slow start");
    }

    #[test]
    fn test_timestamp_in_skipped_local_hour_is_extracted() {
        // 02:30 does not exist on US spring-forward day; the log still says it
        let entry = normalize_line("2024-03-10 02:30:00 INFO nightly job started");
        assert!(entry.has_extracted_timestamp());
        assert_eq!(entry.timestamp().hour(), 2);
        assert_eq!(entry.timestamp().minute(), 30);
    }

    #[test]
    fn test_iso_has_priority_over_standard() {
        let entry = normalize_line("2024-01-01 00:00:00 INFO replayed 2024-02-02T05:06:07");
        assert_eq!(entry.timestamp().month(), 2);
        assert_eq!(entry.timestamp().hour(), 5);
    }

    #[test]
    fn test_epoch_millis_timestamp() {
        let entry = normalize_line("1700000000000 WARN cache miss ratio high");
        assert!(entry.has_extracted_timestamp());
        assert_eq!(entry.timestamp().and_utc().timestamp_millis(), 1_700_000_000_000);
        assert_eq!(entry.level(), LogLevel::Warning);
        assert_eq!(entry.message(), "cache miss ratio high");
    }

    #[test]
    fn test_invalid_date_falls_through_to_next_pattern() {
        // 2024-13-45 is not a date; the epoch pattern then gets its turn
        let entry = normalize_line("2024-13-45T99:99:99 job 1700000000000 done");
        assert!(entry.has_extracted_timestamp());
        assert_eq!(entry.timestamp().and_utc().timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_missing_timestamp_uses_fallback_clock() {
        let now = fixed_now();
        let entry = normalize_line_at("INFO No timestamp message", now);
        assert_eq!(entry.timestamp(), now);
        assert_eq!(entry.timestamp_source(), TimestampSource::Ingested);
        assert_eq!(entry.message(), "No timestamp message");
    }

    #[test]
    fn test_level_canonicalization() {
        for (token, expected) in [
            ("WARN", LogLevel::Warning),
            ("ERR", LogLevel::Error),
            ("DEBUG", LogLevel::Debug),
            ("INFO", LogLevel::Info),
            ("WARNING", LogLevel::Warning),
            ("ERROR", LogLevel::Error),
            ("CRITICAL", LogLevel::Critical),
            ("critical", LogLevel::Critical),
        ] {
            let entry = normalize_line(&format!("2024-01-15 10:30:45 {token} Test message"));
            assert_eq!(entry.level(), expected, "token {token}");
        }
    }

    #[test]
    fn test_level_requires_whole_word() {
        let entry = normalize_line("ERRORS happen to INFORMED people");
        assert_eq!(entry.level(), LogLevel::Info);
        assert_eq!(entry.message(), "ERRORS happen to INFORMED people");
    }

    #[test]
    fn test_leading_noise_is_stripped() {
        let entry = normalize_line("[2024-01-15 10:30:45] [ERROR] - : Disk full on /var");
        assert_eq!(entry.level(), LogLevel::Error);
        assert_eq!(entry.message(), "Disk full on /var");
        assert_eq!(
            entry.raw_line(),
            "[2024-01-15 10:30:45] [ERROR] - : Disk full on /var"
        );
    }

    #[test]
    fn test_metadata_scenario() {
        let entry = normalize_line(
            "2024-01-15 10:30:45 ERROR HTTP 500 error code ERR_DB_CONN from 192.168.1.1",
        );
        assert_eq!(entry.level(), LogLevel::Error);
        assert_eq!(entry.metadata()[KEY_IPS], vec!["192.168.1.1".to_string()]);
        assert!(entry.metadata().contains_key(KEY_HTTP_STATUS));
        assert!(!entry.metadata()[KEY_ERROR_CODES].is_empty());
        assert_eq!(
            entry.message(),
            "HTTP 500 error code ERR_DB_CONN from 192.168.1.1"
        );
    }

    #[test]
    fn test_message_bound() {
        let raw = format!("2024-01-15 10:30:45 INFO {}", "x".repeat(2000));
        let entry = normalize_line(&raw);
        assert_eq!(entry.message().chars().count(), MAX_MESSAGE_CHARS);
        assert_eq!(entry.raw_line(), raw);
    }

    #[test]
    fn test_garbage_never_fails() {
        for raw in ["\u{fffd}\u{fffd}", "::::", "[", "9999999999999", "-"] {
            let entry = normalize_line_at(raw, fixed_now());
            assert!(entry.message().chars().count() <= MAX_MESSAGE_CHARS);
        }
    }
}
