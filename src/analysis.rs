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

//! One analysis run: entries in, metrics + anomalies + advice out.

use crate::anomaly::{Anomaly, AnomalyEngine};
use crate::config::AnalyzerConfig;
use crate::core::{EntrySequence, LogFileLoader};
use crate::error::Result;
use crate::insight::{self, InsightReport};
use crate::metrics::{extract_metrics, message_frequencies, most_common, MessageCount, MetricsSnapshot};
use crate::parser::line::LogEntry;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_entries: usize,
    pub error_rate: f64,
    pub unique_messages: usize,
    pub anomalies_detected: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub summary: Summary,
    pub metrics: MetricsSnapshot,
    pub anomalies: Vec<Anomaly>,
    pub insights: InsightReport,
    pub recommendations: Vec<String>,
}

/// Frequency overview of a batch, independent of anomaly detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternSummary {
    pub top_messages: Vec<MessageCount>,
    pub top_errors: Vec<MessageCount>,
    pub unique_message_count: usize,
    pub error_count: usize,
}

pub struct Analyzer {
    config: AnalyzerConfig,
    engine: AnomalyEngine,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let config = config.validated();
        let engine = AnomalyEngine::new(&config);
        Self { config, engine }
    }

    pub const fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub const fn engine(&self) -> &AnomalyEngine {
        &self.engine
    }

    pub fn analyze(&self, entries: &EntrySequence) -> Analysis {
        let start = Instant::now();
        let metrics = extract_metrics(entries, self.config.top_errors);
        let anomalies = self.engine.detect_all(entries);
        let insights = insight::suggest(&anomalies);
        let recommendations = self.recommendations(&metrics, &anomalies);

        tracing::info!(
            "Analyzed {} entries in {:?}: {} anomalies",
            entries.len(),
            start.elapsed(),
            anomalies.len()
        );

        Analysis {
            summary: Summary {
                total_entries: metrics.total_entries,
                error_rate: metrics.error_rate,
                unique_messages: metrics.unique_messages,
                anomalies_detected: anomalies.len(),
            },
            metrics,
            anomalies,
            insights,
            recommendations,
        }
    }

    pub fn analyze_lines<S: AsRef<str> + Sync>(&self, lines: &[S]) -> (EntrySequence, Analysis) {
        let entries = EntrySequence::from_lines(lines);
        let analysis = self.analyze(&entries);
        (entries, analysis)
    }

    pub fn analyze_file(&self, path: &Path) -> Result<(EntrySequence, Analysis)> {
        let entries = LogFileLoader::load(path)?;
        let analysis = self.analyze(&entries);
        Ok((entries, analysis))
    }

    fn recommendations(&self, metrics: &MetricsSnapshot, anomalies: &[Anomaly]) -> Vec<String> {
        let mut recommendations = Vec::new();

        if metrics.error_rate > self.config.error_rate_alert_pct {
            recommendations.push(format!(
                "High error rate ({:.1}%). Investigate root causes immediately.",
                metrics.error_rate
            ));
        }

        if anomalies.len() > self.config.anomaly_count_alert {
            recommendations.push(format!(
                "Multiple anomalies detected ({}). Review system health.",
                anomalies.len()
            ));
        }

        if let Some(top) = metrics.top_errors.first() {
            recommendations.push(format!(
                "Most common error: '{}' (appears {} times). Consider implementing a fix or monitor closely.",
                top.message, top.count
            ));
        }

        if recommendations.is_empty() {
            recommendations.push("System appears to be running normally.".to_string());
        }

        recommendations
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

/// Most frequent messages overall and among ERROR/CRITICAL entries
pub fn detect_patterns(entries: &[LogEntry]) -> PatternSummary {
    let to_counts = |ranked: Vec<(&str, usize)>| {
        ranked
            .into_iter()
            .map(|(message, count)| MessageCount {
                message: message.to_string(),
                count,
            })
            .collect::<Vec<_>>()
    };

    let all = message_frequencies(entries.iter());
    let errors = message_frequencies(entries.iter().filter(|e| e.level().is_error()));

    PatternSummary {
        top_messages: to_counts(most_common(&all, 10)),
        top_errors: to_counts(most_common(&errors, 5)),
        unique_message_count: all.len(),
        error_count: errors.values().sum(),
    }
}
