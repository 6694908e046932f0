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

//! Descriptive statistics over an entry sequence.
//!
//! Also home of the small statistical helpers the detectors share, so that
//! "mean", "standard deviation" and "gap" mean the same thing everywhere.

use crate::parser::line::{LogEntry, LogLevel};
use indexmap::IndexMap;
use serde::Serialize;

pub const DEFAULT_TOP_ERRORS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LengthStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageCount {
    pub message: String,
    pub count: usize,
}

/// Aggregate statistics of one batch. A pure function of its input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_entries: usize,
    /// Level histogram in first-seen order
    pub level_distribution: IndexMap<LogLevel, usize>,
    /// Percentage of WARNING, ERROR and CRITICAL entries
    pub error_rate: f64,
    pub message_length: LengthStats,
    /// `gap[i] = t[i + 1] - t[i]` in seconds; negative when input is out of order
    pub time_gaps: Vec<f64>,
    pub unique_messages: usize,
    /// Most frequent ERROR/CRITICAL messages
    pub top_errors: Vec<MessageCount>,
}

impl MetricsSnapshot {
    pub fn error_count(&self) -> usize {
        self.level_distribution
            .iter()
            .filter(|(level, _)| level.is_error())
            .map(|(_, count)| count)
            .sum()
    }
}

/// Compute the metrics snapshot. Empty input yields an all-zero snapshot.
pub fn extract_metrics(entries: &[LogEntry], top_errors: usize) -> MetricsSnapshot {
    if entries.is_empty() {
        return MetricsSnapshot::default();
    }

    let mut level_distribution = IndexMap::new();
    for entry in entries {
        *level_distribution.entry(entry.level()).or_insert(0) += 1;
    }

    let error_like = entries.iter().filter(|e| e.level().is_error_like()).count();

    let lengths: Vec<f64> = entries
        .iter()
        .map(|e| e.message().chars().count() as f64)
        .collect();
    let message_length = LengthStats {
        mean: mean(&lengths),
        std: population_std(&lengths),
        min: lengths.iter().copied().fold(f64::INFINITY, f64::min),
        max: lengths.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    };

    let error_messages = entries.iter().filter(|e| e.level().is_error());

    MetricsSnapshot {
        total_entries: entries.len(),
        level_distribution,
        error_rate: percentage(error_like, entries.len()),
        message_length,
        time_gaps: time_gaps(entries),
        unique_messages: message_frequencies(entries.iter()).len(),
        top_errors: most_common(&message_frequencies(error_messages), top_errors)
            .into_iter()
            .map(|(message, count)| MessageCount {
                message: message.to_string(),
                count,
            })
            .collect(),
    }
}

pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N)
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Seconds between consecutive entries, in sequence order
pub fn time_gaps(entries: &[LogEntry]) -> Vec<f64> {
    entries
        .windows(2)
        .map(|pair| gap_seconds(&pair[0], &pair[1]))
        .collect()
}

pub fn gap_seconds(earlier: &LogEntry, later: &LogEntry) -> f64 {
    (later.timestamp() - earlier.timestamp()).num_milliseconds() as f64 / 1000.0
}

/// Exact-message frequency table in first-appearance order
pub fn message_frequencies<'a>(
    entries: impl Iterator<Item = &'a LogEntry>,
) -> IndexMap<&'a str, usize> {
    let mut counts = IndexMap::new();
    for entry in entries {
        *counts.entry(entry.message()).or_insert(0) += 1;
    }
    counts
}

/// The `k` most frequent messages, highest count first; ties keep first-appearance order
pub fn most_common<'a>(counts: &IndexMap<&'a str, usize>, k: usize) -> Vec<(&'a str, usize)> {
    let mut ranked: Vec<(&str, usize)> = counts.iter().map(|(m, c)| (*m, *c)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::normalize_line;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn base_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .expect("valid base time")
    }

    fn entry(offset_secs: i64, level: LogLevel, message: &str) -> LogEntry {
        LogEntry::new(base_time() + Duration::seconds(offset_secs), level, message)
    }

    #[test]
    fn test_gaps_ignore_daylight_saving_transitions() {
        // US fall-back night: the wall clock repeats 01:00-02:00 locally
        let lines = [
            "2024-11-03 00:59:59 INFO a",
            "2024-11-03 01:00:00 INFO b",
            "2024-11-03 01:59:59 INFO c",
            "2024-11-03 02:00:00 INFO d",
        ];
        let entries: Vec<LogEntry> = lines.into_iter().map(normalize_line).collect();
        assert_eq!(time_gaps(&entries), vec![1.0, 3599.0, 1.0]);
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let metrics = extract_metrics(&[], DEFAULT_TOP_ERRORS);
        assert_eq!(metrics, MetricsSnapshot::default());
        assert_eq!(metrics.total_entries, 0);
        assert!(metrics.time_gaps.is_empty());
    }

    #[test]
    fn test_level_distribution_and_error_rate() {
        let mut entries = Vec::new();
        for i in 0..10 {
            entries.push(entry(i, LogLevel::Info, "ok"));
        }
        for i in 10..15 {
            entries.push(entry(i, LogLevel::Error, "db down"));
        }
        for i in 15..18 {
            entries.push(entry(i, LogLevel::Warning, "slow"));
        }
        for i in 18..20 {
            entries.push(entry(i, LogLevel::Debug, "trace"));
        }

        let metrics = extract_metrics(&entries, DEFAULT_TOP_ERRORS);
        assert_eq!(metrics.total_entries, 20);
        assert_eq!(metrics.level_distribution[&LogLevel::Info], 10);
        assert_eq!(metrics.level_distribution[&LogLevel::Error], 5);
        assert_eq!(metrics.level_distribution[&LogLevel::Warning], 3);
        // Warnings count as error-like: (5 + 3) / 20
        assert!((metrics.error_rate - 40.0).abs() < 1e-9);
        assert_eq!(metrics.error_count(), 5);
        assert_eq!(metrics.unique_messages, 4);
        assert_eq!(
            metrics.top_errors,
            vec![MessageCount {
                message: "db down".to_string(),
                count: 5
            }]
        );
    }

    #[test]
    fn test_message_length_stats() {
        let entries = vec![
            entry(0, LogLevel::Info, "ab"),
            entry(1, LogLevel::Info, "abcd"),
            entry(2, LogLevel::Info, "abcdef"),
        ];
        let stats = extract_metrics(&entries, DEFAULT_TOP_ERRORS).message_length;
        assert!((stats.mean - 4.0).abs() < 1e-9);
        assert!((stats.std - (8.0_f64 / 3.0).sqrt()).abs() < 1e-9);
        assert!((stats.min - 2.0).abs() < 1e-9);
        assert!((stats.max - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_gaps_may_be_negative() {
        let entries = vec![
            entry(10, LogLevel::Info, "a"),
            entry(5, LogLevel::Info, "b"),
            entry(7, LogLevel::Info, "c"),
        ];
        assert_eq!(time_gaps(&entries), vec![-5.0, 2.0]);
    }

    #[test]
    fn test_most_common_ties_keep_first_appearance() {
        let entries = vec![
            entry(0, LogLevel::Error, "b"),
            entry(1, LogLevel::Error, "a"),
            entry(2, LogLevel::Error, "a"),
            entry(3, LogLevel::Error, "c"),
            entry(4, LogLevel::Error, "b"),
        ];
        let counts = message_frequencies(entries.iter());
        assert_eq!(most_common(&counts, 3), vec![("b", 2), ("a", 2), ("c", 1)]);
        assert_eq!(most_common(&counts, 1), vec![("b", 2)]);
    }

    #[test]
    fn test_std_of_constant_values_is_zero() {
        assert!(population_std(&[3.0, 3.0, 3.0]).abs() < f64::EPSILON);
        assert!(population_std(&[]).abs() < f64::EPSILON);
        assert!(mean(&[]).abs() < f64::EPSILON);
    }
}
