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

use crate::anomaly::{Anomaly, AnomalyDetector, Severity, TimingAnomaly};
use crate::config::AnalyzerConfig;
use crate::metrics::{gap_seconds, mean, population_std};
use crate::parser::line::LogEntry;

/// Flags inter-arrival gaps far above the mean gap
#[derive(Debug, Clone)]
pub struct TimingDetector {
    threshold: f64,
    exclude_ingested: bool,
}

impl TimingDetector {
    pub const fn new(threshold: f64, exclude_ingested: bool) -> Self {
        Self {
            threshold,
            exclude_ingested,
        }
    }

    pub const fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.anomaly_threshold, config.exclude_ingested_timestamps)
    }

    /// `(index of later entry, gap in seconds)` between consecutive measured entries.
    ///
    /// When ingested timestamps are excluded, those entries are skipped and the
    /// gap is measured from the previous entry with an extracted timestamp.
    fn gaps(&self, entries: &[LogEntry]) -> Vec<(usize, f64)> {
        let mut gaps = Vec::with_capacity(entries.len().saturating_sub(1));
        let mut previous: Option<&LogEntry> = None;
        for (index, entry) in entries.iter().enumerate() {
            // Fallback clock readings say nothing about when the line was written
            if self.exclude_ingested && !entry.has_extracted_timestamp() {
                continue;
            }
            if let Some(earlier) = previous {
                gaps.push((index, gap_seconds(earlier, entry)));
            }
            previous = Some(entry);
        }
        gaps
    }

    pub fn detect_gaps(&self, entries: &[LogEntry]) -> Vec<TimingAnomaly> {
        let gaps = self.gaps(entries);
        if gaps.is_empty() {
            return Vec::new();
        }

        let values: Vec<f64> = gaps.iter().map(|(_, gap)| *gap).collect();
        let baseline = mean(&values);
        let cutoff = baseline + self.threshold * population_std(&values);
        tracing::debug!(
            "Mean gap {baseline:.3}s over {} gaps, cutoff {cutoff:.3}s",
            values.len()
        );

        gaps.into_iter()
            .filter(|(_, gap)| *gap > cutoff)
            .map(|(entry_index, gap)| TimingAnomaly {
                severity: Severity::Medium,
                description: format!(
                    "Unusual gap between logs: {gap:.2}s (baseline: {baseline:.2}s)"
                ),
                gap_duration_seconds: gap,
                entry_index,
            })
            .collect()
    }
}

impl AnomalyDetector for TimingDetector {
    fn name(&self) -> &'static str {
        "timing"
    }

    fn detect(&self, entries: &[LogEntry]) -> Vec<Anomaly> {
        self.detect_gaps(entries)
            .into_iter()
            .map(Anomaly::from)
            .collect()
    }
}
