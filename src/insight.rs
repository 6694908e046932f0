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

//! Local, heuristic explanations for detected anomalies.

use crate::anomaly::Anomaly;
use crate::parser::line::truncate_chars;
use fancy_regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

// Keyword families that hint at a root cause (case-insensitive)
static NETWORK_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(connection|timeout|refused)").expect("valid regex literal")
});

static MEMORY_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(memory|out of memory|heap)").expect("valid regex literal")
});

static AUTH_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(permission|denied|unauthorized)").expect("valid regex literal")
});

static DATABASE_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(database|sql|query)").expect("valid regex literal")
});

/// (pattern, likely cause, recommended action)
static ROOT_CAUSE_RULES: [(&LazyLock<Regex>, &str, &str); 4] = [
    (
        &NETWORK_KEYWORDS,
        "Network connectivity or service availability issue",
        "Check network connectivity and service status",
    ),
    (
        &MEMORY_KEYWORDS,
        "Memory exhaustion or memory leak",
        "Increase heap size or investigate memory leak",
    ),
    (
        &AUTH_KEYWORDS,
        "Authentication or authorization failure",
        "Check user credentials and permissions",
    ),
    (
        &DATABASE_KEYWORDS,
        "Database query or connection issue",
        "Check database connectivity and query syntax",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightReport {
    pub method: &'static str,
    pub suggestions: Vec<String>,
    pub anomaly_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootCauseReport {
    pub causes: Vec<String>,
    pub recommendations: Vec<String>,
}

/// One suggestion per anomaly, in anomaly order
pub fn suggest(anomalies: &[Anomaly]) -> InsightReport {
    InsightReport {
        method: "heuristic",
        suggestions: anomalies.iter().map(suggestion).collect(),
        anomaly_count: anomalies.len(),
    }
}

fn suggestion(anomaly: &Anomaly) -> String {
    match anomaly {
        Anomaly::ErrorSpike(spike) => format!(
            "Error Spike Detected (Severity: {}): {} entries affected. \
             Action: Review error messages during this period, check system resources, \
             and verify external service dependencies.",
            spike.severity, spike.affected_entries
        ),
        Anomaly::PatternAnomaly(pattern) => format!(
            "Pattern Anomaly (Severity: {}): Message '{}' appears in {:.1}% of logs. \
             Action: Investigate why this pattern is so prevalent or rare.",
            pattern.severity,
            truncate_chars(pattern.message.clone(), 50),
            pattern.percentage
        ),
        Anomaly::TimingAnomaly(timing) => format!(
            "Timing Anomaly (Severity: {}): Unusual gap of {:.2}s detected in log entries. \
             Action: Check for service interruptions or batch processing delays.",
            timing.severity, timing.gap_duration_seconds
        ),
    }
}

/// Guess likely causes from the text of error messages
pub fn root_causes<S: AsRef<str>>(error_messages: &[S]) -> RootCauseReport {
    let text = error_messages
        .iter()
        .map(AsRef::<str>::as_ref)
        .collect::<Vec<_>>()
        .join(" ");

    let (causes, recommendations): (Vec<String>, Vec<String>) = ROOT_CAUSE_RULES
        .iter()
        .filter(|(pattern, _, _)| pattern.is_match(&text).unwrap_or(false))
        .map(|(_, cause, action)| ((*cause).to_string(), (*action).to_string()))
        .unzip();

    if causes.is_empty() {
        return RootCauseReport {
            causes: vec!["Requires detailed investigation".to_string()],
            recommendations: vec!["Review full error stack trace and logs".to_string()],
        };
    }

    RootCauseReport {
        causes,
        recommendations,
    }
}
