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

use crate::anomaly::{Anomaly, AnomalyDetector, ErrorSpike, Severity};
use crate::config::AnalyzerConfig;
use crate::metrics::{mean, percentage, population_std};
use crate::parser::line::LogEntry;

/// Flags fixed-size chunks whose ERROR/CRITICAL rate is far above the
/// mean rate across all chunks
#[derive(Debug, Clone)]
pub struct ErrorSpikeDetector {
    threshold: f64,
    min_chunk_size: usize,
    chunk_divisor: usize,
}

impl ErrorSpikeDetector {
    pub const fn new(threshold: f64, min_chunk_size: usize, chunk_divisor: usize) -> Self {
        Self {
            threshold,
            min_chunk_size,
            chunk_divisor,
        }
    }

    pub const fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(
            config.anomaly_threshold,
            config.min_chunk_size,
            config.chunk_divisor,
        )
    }

    /// `max(min_chunk_size, N / chunk_divisor)`, never zero
    pub fn chunk_size(&self, total: usize) -> usize {
        self.min_chunk_size
            .max(total / self.chunk_divisor.max(1))
            .max(1)
    }

    pub fn detect_spikes(&self, entries: &[LogEntry]) -> Vec<ErrorSpike> {
        let chunk_size = self.chunk_size(entries.len());
        let chunks: Vec<&[LogEntry]> = entries.chunks(chunk_size).collect();
        if chunks.len() < 2 {
            tracing::debug!(
                "Error spike detection needs at least 2 chunks, have {}",
                chunks.len()
            );
            return Vec::new();
        }

        let rates: Vec<f64> = chunks
            .iter()
            .map(|chunk| {
                let errors = chunk.iter().filter(|e| e.level().is_error()).count();
                percentage(errors, chunk.len())
            })
            .collect();

        let baseline = mean(&rates);
        let std = population_std(&rates);
        let cutoff = baseline + self.threshold * std;
        tracing::debug!(
            "Error rate baseline {baseline:.2}% (std {std:.2}) over {} chunks of {chunk_size}",
            chunks.len()
        );

        chunks
            .iter()
            .zip(&rates)
            .enumerate()
            .filter(|(_, (_, rate))| **rate > cutoff)
            .filter_map(|(index, (chunk, rate))| {
                let (first, last) = (chunk.first()?, chunk.last()?);
                let severity = if *rate > baseline + 2.0 * std {
                    Severity::High
                } else {
                    Severity::Medium
                };
                Some(ErrorSpike {
                    severity,
                    description: format!(
                        "Error spike detected: {rate:.1}% error rate (baseline: {baseline:.1}%)"
                    ),
                    chunk_start: first.timestamp(),
                    chunk_end: last.timestamp(),
                    affected_entries: chunk.len(),
                    chunk_index: index,
                    error_rate: *rate,
                    baseline_rate: baseline,
                })
            })
            .collect()
    }
}

impl AnomalyDetector for ErrorSpikeDetector {
    fn name(&self) -> &'static str {
        "error spike"
    }

    fn detect(&self, entries: &[LogEntry]) -> Vec<Anomaly> {
        self.detect_spikes(entries)
            .into_iter()
            .map(Anomaly::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::test_support::steady;
    use crate::parser::line::LogLevel;

    fn two_chunks(errors_in_second: usize) -> Vec<LogEntry> {
        let mut levels = vec![LogLevel::Info; 10];
        levels.extend(vec![LogLevel::Error; errors_in_second]);
        levels.extend(vec![LogLevel::Info; 10 - errors_in_second]);
        steady(&levels)
    }

    #[test]
    fn test_chunk_size() {
        let detector = ErrorSpikeDetector::new(2.0, 10, 10);
        assert_eq!(detector.chunk_size(5), 10);
        assert_eq!(detector.chunk_size(100), 10);
        assert_eq!(detector.chunk_size(1000), 100);
        assert_eq!(detector.chunk_size(1009), 100);
    }

    #[test]
    fn test_single_chunk_has_no_baseline() {
        let detector = ErrorSpikeDetector::new(0.0, 10, 10);
        let entries = steady(&[LogLevel::Error; 10]);
        assert!(detector.detect_spikes(&entries).is_empty());
    }

    #[test]
    fn test_boundary_is_strict() {
        // Rates [0, 50]: mean 25, std 25. At threshold 1 the cutoff is exactly 50.
        let entries = two_chunks(5);
        assert!(ErrorSpikeDetector::new(1.0, 10, 10)
            .detect_spikes(&entries)
            .is_empty());

        let spikes = ErrorSpikeDetector::new(0.5, 10, 10).detect_spikes(&entries);
        assert_eq!(spikes.len(), 1);
        let spike = &spikes[0];
        assert_eq!(spike.chunk_index, 1);
        assert_eq!(spike.affected_entries, 10);
        // 50 is not above mean + 2 std = 75
        assert_eq!(spike.severity, Severity::Medium);
        assert!((spike.error_rate - 50.0).abs() < 1e-9);
        assert!((spike.baseline_rate - 25.0).abs() < 1e-9);
        assert_eq!(spike.chunk_start, entries[10].timestamp());
        assert_eq!(spike.chunk_end, entries[19].timestamp());
    }

    #[test]
    fn test_zero_variance_flags_nothing() {
        let levels: Vec<LogLevel> = (0..40)
            .map(|i| if i % 2 == 0 { LogLevel::Error } else { LogLevel::Info })
            .collect();
        let detector = ErrorSpikeDetector::new(0.0, 10, 10);
        assert!(detector.detect_spikes(&steady(&levels)).is_empty());
    }

    #[test]
    fn test_high_severity_spike_among_many_chunks() {
        // 10 chunks of 10; only the last one is all errors
        let mut levels = vec![LogLevel::Info; 90];
        levels.extend(vec![LogLevel::Critical; 10]);
        let entries = steady(&levels);

        let spikes = ErrorSpikeDetector::new(2.0, 10, 10).detect_spikes(&entries);
        assert_eq!(spikes.len(), 1);
        assert_eq!(spikes[0].chunk_index, 9);
        assert_eq!(spikes[0].severity, Severity::High);
        assert!(spikes[0].description.contains("100.0% error rate"));
    }

    #[test]
    fn test_short_last_chunk_counts_on_its_own_size() {
        // 25 entries -> chunks of 10, 10, 5; the short tail is all errors
        let mut levels = vec![LogLevel::Info; 20];
        levels.extend(vec![LogLevel::Error; 5]);
        let spikes = ErrorSpikeDetector::new(1.0, 10, 10).detect_spikes(&steady(&levels));
        assert_eq!(spikes.len(), 1);
        assert_eq!(spikes[0].chunk_index, 2);
        assert_eq!(spikes[0].affected_entries, 5);
    }

    #[test]
    fn test_detection_is_repeatable() {
        let entries = two_chunks(7);
        let detector = ErrorSpikeDetector::new(0.5, 10, 10);
        assert_eq!(detector.detect_spikes(&entries), detector.detect_spikes(&entries));
    }
}
