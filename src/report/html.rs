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

use crate::analysis::Analysis;
use chrono::{DateTime, Local};
use std::fmt::Write as _;

const STYLE: &str = r"
        body { font-family: Arial, sans-serif; margin: 20px; background-color: #f5f5f5; }
        .container { background-color: white; padding: 20px; border-radius: 5px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        h1, h2, h3 { color: #333; }
        .metric-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(250px, 1fr)); gap: 20px; margin-bottom: 30px; }
        .metric-card { background-color: #f9f9f9; border-left: 4px solid #4CAF50; padding: 15px; border-radius: 3px; }
        .anomaly { background-color: #fff3cd; border-left: 4px solid #ff9800; padding: 10px; margin-bottom: 10px; border-radius: 3px; }
        .severity-high { border-left-color: #f44336; }
        .severity-medium { border-left-color: #ff9800; }
        .severity-low { border-left-color: #4CAF50; }
        table { width: 100%; border-collapse: collapse; margin-top: 20px; }
        th, td { padding: 10px; text-align: left; border-bottom: 1px solid #ddd; }
        th { background-color: #f2f2f2; font-weight: bold; }
";

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn metric_card(out: &mut String, title: &str, value: &str) {
    let _ = writeln!(
        out,
        "            <div class=\"metric-card\"><h3>{title}</h3><p>{value}</p></div>"
    );
}

/// Self-contained HTML page. Every piece of log-derived text is escaped.
pub fn render(analysis: &Analysis, generated_at: DateTime<Local>) -> String {
    let generated = escape(&generated_at.to_rfc3339());
    let summary = &analysis.summary;
    let mut out = String::new();

    let _ = writeln!(out, "<!DOCTYPE html>\n<html>\n<head>");
    let _ = writeln!(out, "    <meta charset=\"utf-8\">");
    let _ = writeln!(out, "    <title>Log Analysis Report - {generated}</title>");
    let _ = writeln!(out, "    <style>{STYLE}    </style>\n</head>\n<body>");
    let _ = writeln!(out, "    <div class=\"container\">");
    let _ = writeln!(out, "        <h1>Log Analysis Report</h1>");
    let _ = writeln!(out, "        <p><strong>Generated:</strong> {generated}</p>");

    let _ = writeln!(out, "        <h2>Metrics Summary</h2>\n        <div class=\"metric-grid\">");
    metric_card(&mut out, "Total Entries", &summary.total_entries.to_string());
    metric_card(&mut out, "Error Rate", &format!("{:.1}%", summary.error_rate));
    metric_card(&mut out, "Unique Messages", &summary.unique_messages.to_string());
    metric_card(&mut out, "Anomalies Detected", &summary.anomalies_detected.to_string());
    let _ = writeln!(out, "        </div>");

    let _ = writeln!(out, "        <h2>Log Level Distribution</h2>");
    let _ = writeln!(out, "        <table>\n            <tr><th>Level</th><th>Count</th></tr>");
    for (level, count) in &analysis.metrics.level_distribution {
        let _ = writeln!(out, "            <tr><td>{level}</td><td>{count}</td></tr>");
    }
    let _ = writeln!(out, "        </table>");

    let _ = writeln!(out, "        <h2>Detected Anomalies</h2>");
    if analysis.anomalies.is_empty() {
        let _ = writeln!(out, "        <p>No anomalies detected.</p>");
    }
    for anomaly in &analysis.anomalies {
        let severity = anomaly.severity();
        let _ = writeln!(
            out,
            "        <div class=\"anomaly severity-{severity}\"><strong>{}</strong> (Severity: {severity})<br>{}</div>",
            anomaly.type_name(),
            escape(anomaly.summary())
        );
    }

    let _ = writeln!(out, "        <h2>Recommendations</h2>\n        <ol>");
    for recommendation in &analysis.recommendations {
        let _ = writeln!(out, "            <li>{}</li>", escape(recommendation));
    }
    let _ = writeln!(out, "        </ol>\n    </div>\n</body>\n</html>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }
}
