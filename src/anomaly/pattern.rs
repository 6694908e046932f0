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

use crate::anomaly::{Anomaly, AnomalyDetector, PatternAnomaly, PatternKind, Severity};
use crate::config::AnalyzerConfig;
use crate::metrics::{message_frequencies, most_common, percentage};
use crate::parser::line::{truncate_chars, LogEntry};

pub const MAX_REPORTED_MESSAGE_CHARS: usize = 100;

/// Flags messages that dominate the batch, and messages seen exactly once
/// in a batch large enough for that to be notable.
///
/// The dominance test only looks at the `top_n` most frequent messages.
/// The singleton test looks at every distinct message, since a count of one
/// can never rank among the most frequent in a diverse batch.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    top_n: usize,
    frequent_pct: f64,
    high_pct: f64,
    rare_min_entries: usize,
    rare_limit: usize,
}

impl PatternDetector {
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            top_n: config.pattern_top_n,
            frequent_pct: config.frequent_message_pct,
            high_pct: config.high_frequency_pct,
            rare_min_entries: config.rare_min_entries,
            rare_limit: config.rare_message_limit,
        }
    }

    fn severity(&self, pct: f64) -> Severity {
        if pct > self.high_pct {
            Severity::High
        } else {
            Severity::Medium
        }
    }

    fn anomaly(&self, kind: PatternKind, message: &str, count: usize, total: usize) -> PatternAnomaly {
        let pct = percentage(count, total);
        PatternAnomaly {
            severity: self.severity(pct),
            kind,
            message: truncate_chars(message.to_string(), MAX_REPORTED_MESSAGE_CHARS),
            occurrence_count: count,
            percentage: pct,
        }
    }

    pub fn detect_patterns(&self, entries: &[LogEntry]) -> Vec<PatternAnomaly> {
        let total = entries.len();
        if total == 0 {
            return Vec::new();
        }

        let counts = message_frequencies(entries.iter());

        let mut anomalies: Vec<PatternAnomaly> = most_common(&counts, self.top_n)
            .into_iter()
            .filter(|(_, count)| percentage(*count, total) > self.frequent_pct)
            .map(|(message, count)| self.anomaly(PatternKind::Frequent, message, count, total))
            .collect();

        if total > self.rare_min_entries {
            let singletons = counts.iter().filter(|(_, count)| **count == 1);
            let rare_total = singletons.clone().count();
            anomalies.extend(
                singletons
                    .take(self.rare_limit)
                    .map(|(message, _)| self.anomaly(PatternKind::Rare, message, 1, total)),
            );
            if rare_total > self.rare_limit {
                tracing::debug!(
                    "Reporting {} of {rare_total} singleton messages",
                    self.rare_limit
                );
            }
        }

        anomalies
    }
}

impl AnomalyDetector for PatternDetector {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn detect(&self, entries: &[LogEntry]) -> Vec<Anomaly> {
        self.detect_patterns(entries)
            .into_iter()
            .map(Anomaly::from)
            .collect()
    }
}
