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

//! Statistical anomaly detection over a materialized entry sequence.
//!
//! The detectors are pure functions of their input: no state survives a
//! call, so they can run in any order, repeatedly, or concurrently.

pub mod error_spike;
pub mod pattern;
pub mod timing;

use crate::config::AnalyzerConfig;
use crate::parser::line::LogEntry;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

pub use error_spike::ErrorSpikeDetector;
pub use pattern::PatternDetector;
pub use timing::TimingDetector;

/// Coarse urgency label attached to every anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chunk whose ERROR/CRITICAL rate stands out from the per-chunk baseline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorSpike {
    pub severity: Severity,
    pub description: String,
    pub chunk_start: NaiveDateTime,
    pub chunk_end: NaiveDateTime,
    pub affected_entries: usize,
    pub chunk_index: usize,
    pub error_rate: f64,
    pub baseline_rate: f64,
}

/// Why a message was singled out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Occupies an outsized share of the batch
    Frequent,
    /// Appears exactly once in a large batch
    Rare,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternAnomaly {
    pub severity: Severity,
    pub kind: PatternKind,
    /// At most [`pattern::MAX_REPORTED_MESSAGE_CHARS`] characters
    pub message: String,
    pub occurrence_count: usize,
    pub percentage: f64,
}

/// An inter-arrival gap far above the mean gap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingAnomaly {
    pub severity: Severity,
    pub description: String,
    pub gap_duration_seconds: f64,
    /// Index of the later entry of the gap
    pub entry_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Anomaly {
    ErrorSpike(ErrorSpike),
    PatternAnomaly(PatternAnomaly),
    TimingAnomaly(TimingAnomaly),
}

impl Anomaly {
    pub const fn severity(&self) -> Severity {
        match self {
            Self::ErrorSpike(a) => a.severity,
            Self::PatternAnomaly(a) => a.severity,
            Self::TimingAnomaly(a) => a.severity,
        }
    }

    /// The wire name of the variant, as used in the `type` tag
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::ErrorSpike(_) => "error_spike",
            Self::PatternAnomaly(_) => "pattern_anomaly",
            Self::TimingAnomaly(_) => "timing_anomaly",
        }
    }

    /// Description for spikes and gaps, the offending message for patterns
    pub fn summary(&self) -> &str {
        match self {
            Self::ErrorSpike(a) => &a.description,
            Self::PatternAnomaly(a) => &a.message,
            Self::TimingAnomaly(a) => &a.description,
        }
    }
}

impl From<ErrorSpike> for Anomaly {
    fn from(a: ErrorSpike) -> Self {
        Self::ErrorSpike(a)
    }
}

impl From<PatternAnomaly> for Anomaly {
    fn from(a: PatternAnomaly) -> Self {
        Self::PatternAnomaly(a)
    }
}

impl From<TimingAnomaly> for Anomaly {
    fn from(a: TimingAnomaly) -> Self {
        Self::TimingAnomaly(a)
    }
}

/// Common interface of the detectors
pub trait AnomalyDetector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Scan the whole sequence. Output is in chunk/index order.
    fn detect(&self, entries: &[LogEntry]) -> Vec<Anomaly>;
}

/// Runs the enabled detectors over one sequence
pub struct AnomalyEngine {
    error_spikes: ErrorSpikeDetector,
    patterns: PatternDetector,
    timing: TimingDetector,
    config: AnalyzerConfig,
}

impl AnomalyEngine {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            error_spikes: ErrorSpikeDetector::from_config(config),
            patterns: PatternDetector::from_config(config),
            timing: TimingDetector::from_config(config),
            config: config.clone(),
        }
    }

    pub fn detect_error_spikes(&self, entries: &[LogEntry]) -> Vec<ErrorSpike> {
        self.error_spikes.detect_spikes(entries)
    }

    pub fn detect_pattern_anomalies(&self, entries: &[LogEntry]) -> Vec<PatternAnomaly> {
        self.patterns.detect_patterns(entries)
    }

    pub fn detect_timing_anomalies(&self, entries: &[LogEntry]) -> Vec<TimingAnomaly> {
        self.timing.detect_gaps(entries)
    }

    /// Run every enabled detector concurrently. Results are concatenated as
    /// error spikes, then patterns, then timing gaps.
    pub fn detect_all(&self, entries: &[LogEntry]) -> Vec<Anomaly> {
        let toggles = self.config.detection;
        let run = |enabled: bool, detector: &dyn AnomalyDetector| {
            if enabled {
                detector.detect(entries)
            } else {
                tracing::debug!("{} detection disabled", detector.name());
                Vec::new()
            }
        };

        let ((mut anomalies, patterns), timing) = rayon::join(
            || {
                rayon::join(
                    || run(toggles.error_spike, &self.error_spikes),
                    || run(toggles.pattern, &self.patterns),
                )
            },
            || run(toggles.timing, &self.timing),
        );
        anomalies.extend(patterns);
        anomalies.extend(timing);

        tracing::info!(
            "Detected {} anomalies in {} entries",
            anomalies.len(),
            entries.len()
        );
        anomalies
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{entry_at, steady};
    use super::*;
    use crate::parser::line::LogLevel;

    #[test]
    fn test_empty_input_yields_nothing() {
        let engine = AnomalyEngine::new(&AnalyzerConfig::default());
        assert!(engine.detect_error_spikes(&[]).is_empty());
        assert!(engine.detect_pattern_anomalies(&[]).is_empty());
        assert!(engine.detect_timing_anomalies(&[]).is_empty());
        assert!(engine.detect_all(&[]).is_empty());
    }

    #[test]
    fn test_detect_all_is_idempotent_and_ordered() {
        let mut levels = vec![LogLevel::Info; 200];
        levels.extend(vec![LogLevel::Error; 100]);
        let mut entries = steady(&levels);
        entries.push(entry_at(10_000, LogLevel::Info, "late"));

        let config = AnalyzerConfig {
            anomaly_threshold: 1.0,
            ..AnalyzerConfig::default()
        };
        let engine = AnomalyEngine::new(&config);
        let first = engine.detect_all(&entries);
        let second = engine.detect_all(&entries);
        assert_eq!(first, second);

        let rank = |a: &Anomaly| match a {
            Anomaly::ErrorSpike(_) => 0,
            Anomaly::PatternAnomaly(_) => 1,
            Anomaly::TimingAnomaly(_) => 2,
        };
        assert!(first.windows(2).all(|w| rank(&w[0]) <= rank(&w[1])));
        assert!(first.iter().any(|a| matches!(a, Anomaly::ErrorSpike(_))));
        assert!(first.iter().any(|a| matches!(a, Anomaly::TimingAnomaly(_))));
    }

    #[test]
    fn test_disabled_detectors_are_skipped() {
        let mut config = AnalyzerConfig::default();
        config.detection.pattern = false;
        config.detection.timing = false;
        config.detection.error_spike = false;
        let engine = AnomalyEngine::new(&config);

        let entries: Vec<LogEntry> = (0..200)
            .map(|i| entry_at(i, LogLevel::Info, "same"))
            .collect();
        assert!(engine.detect_all(&entries).is_empty());
        assert!(!engine.detect_pattern_anomalies(&entries).is_empty());
    }

    #[test]
    fn test_serialized_type_tag() {
        let anomaly = Anomaly::from(TimingAnomaly {
            severity: Severity::Medium,
            description: "gap".to_string(),
            gap_duration_seconds: 42.0,
            entry_index: 7,
        });
        let json = serde_json::to_value(&anomaly).expect("serialize");
        assert_eq!(json["type"], "timing_anomaly");
        assert_eq!(json["severity"], "medium");
        assert_eq!(json["entry_index"], 7);
        assert_eq!(anomaly.type_name(), "timing_anomaly");
        assert_eq!(anomaly.summary(), "gap");
    }
}
