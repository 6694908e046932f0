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

//! Rendering an [`Analysis`] as JSON, plain text or HTML.

mod html;

use crate::analysis::Analysis;
use crate::error::{AnalyzerError, Result};
use crate::parser::line::LogEntry;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Json,
    Text,
    Html,
}

#[derive(Debug, Serialize)]
struct ReportBody<'a> {
    #[serde(flatten)]
    analysis: &'a Analysis,
    logs: &'a [LogEntry],
}

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    timestamp: DateTime<Local>,
    analysis: ReportBody<'a>,
}

/// A rendered-on-demand report over one analysis and its detail entries
pub struct Reporter<'a> {
    generated_at: DateTime<Local>,
    analysis: &'a Analysis,
    detail: &'a [LogEntry],
}

impl<'a> Reporter<'a> {
    pub fn new(analysis: &'a Analysis, detail: &'a [LogEntry]) -> Self {
        Self {
            generated_at: Local::now(),
            analysis,
            detail,
        }
    }

    #[must_use]
    pub const fn generated_at(mut self, timestamp: DateTime<Local>) -> Self {
        self.generated_at = timestamp;
        self
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => self.to_json(),
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Html => Ok(html::render(self.analysis, self.generated_at)),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let document = ReportDocument {
            timestamp: self.generated_at,
            analysis: ReportBody {
                analysis: self.analysis,
                logs: self.detail,
            },
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub fn to_text(&self) -> String {
        let summary = &self.analysis.summary;
        let rule = "=".repeat(50);
        let mut out = String::new();

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "ANALYSIS SUMMARY");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Total entries: {}", summary.total_entries);
        let _ = writeln!(out, "Error rate: {:.1}%", summary.error_rate);
        let _ = writeln!(out, "Unique messages: {}", summary.unique_messages);
        let _ = writeln!(out, "Anomalies detected: {}", summary.anomalies_detected);

        if !self.analysis.anomalies.is_empty() {
            let _ = writeln!(out, "\nAnomalies:");
            for anomaly in &self.analysis.anomalies {
                let _ = writeln!(
                    out,
                    "- [{}] {}: {}",
                    anomaly.severity(),
                    anomaly.type_name(),
                    anomaly.summary()
                );
            }
        }

        let _ = writeln!(out, "\nRecommendations:");
        for (i, recommendation) in self.analysis.recommendations.iter().enumerate() {
            let _ = writeln!(out, "{}. {recommendation}", i + 1);
        }
        let _ = writeln!(out, "{rule}");
        out
    }

    /// Render and write to `path`
    pub fn write(&self, format: ReportFormat, path: &Path) -> Result<()> {
        let rendered = self.render(format)?;
        let file = std::fs::File::create(path).map_err(|e| AnalyzerError::io(path, e))?;
        let mut writer = std::io::BufWriter::new(file);
        writer
            .write_all(rendered.as_bytes())
            .map_err(|e| AnalyzerError::io(path, e))?;
        // BufWriter::drop would swallow a failed flush
        writer.flush().map_err(|e| AnalyzerError::io(path, e))?;
        tracing::info!("Report saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;

    fn sample() -> (crate::core::EntrySequence, Analysis) {
        let mut lines: Vec<String> = (0..40)
            .map(|i| format!("2024-01-15 10:00:{i:02} INFO heartbeat"))
            .collect();
        lines.push("2024-01-15 10:30:00 ERROR upstream <timeout> & retry".to_string());
        Analyzer::default().analyze_lines(&lines)
    }

    #[test]
    fn test_json_document_shape() {
        let (entries, analysis) = sample();
        let reporter = Reporter::new(&analysis, entries.head(5));
        let json: serde_json::Value =
            serde_json::from_str(&reporter.to_json().expect("json")).expect("parse");

        assert!(json["timestamp"].is_string());
        let body = &json["analysis"];
        assert_eq!(body["summary"]["total_entries"], 41);
        assert_eq!(body["logs"].as_array().map(Vec::len), Some(5));
        assert_eq!(body["logs"][0]["level"], "INFO");
        assert_eq!(body["metrics"]["level_distribution"]["INFO"], 40);
        let types: Vec<&str> = body["anomalies"]
            .as_array()
            .expect("anomalies")
            .iter()
            .filter_map(|a| a["type"].as_str())
            .collect();
        assert!(types.contains(&"pattern_anomaly"));
        assert!(types.contains(&"timing_anomaly"));
    }

    #[test]
    fn test_text_summary() {
        let (entries, analysis) = sample();
        let text = Reporter::new(&analysis, entries.head(0)).to_text();
        assert!(text.contains("ANALYSIS SUMMARY"));
        assert!(text.contains("Total entries: 41"));
        assert!(text.contains("1. "));
        assert!(text.contains("pattern_anomaly"));
    }

    #[test]
    fn test_html_escapes_messages() {
        let (entries, analysis) = sample();
        let html = Reporter::new(&analysis, entries.head(0))
            .render(ReportFormat::Html)
            .expect("html");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("severity-high"));
        assert!(!html.contains("<timeout>"));
    }

    #[test]
    fn test_write_to_file() {
        let (entries, analysis) = sample();
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("report.json");
        Reporter::new(&analysis, entries.head(100))
            .write(ReportFormat::Json, &path)
            .expect("write");
        let written = std::fs::read_to_string(&path).expect("read back");
        assert!(written.contains("\"analysis\""));
    }
}
