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

//! Schema-less metadata extraction.
//!
//! Each extractor scans the raw line independently. A key is only inserted
//! when its pattern matched at least once.

use super::line::Metadata;
use fancy_regex::Regex;
use std::sync::LazyLock;

pub const KEY_IPS: &str = "ips";
pub const KEY_HTTP_STATUS: &str = "http_status";
pub const KEY_ERROR_CODES: &str = "error_codes";

static IPV4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\d{1,3}\.){3}\d{1,3}").expect("valid regex literal"));

// Optional "HTTP/1.1 " prefix, then a standalone 3-digit token followed by whitespace
static HTTP_STATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:HTTP/[\d.]+\s+)?\b(\d{3})\s").expect("valid regex literal")
});

// Keyword is case-insensitive; the code itself must look like a code (digit or underscore)
static ERROR_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?i:error|code|errno)\b\s*[:=]?\s*([A-Z0-9]*[0-9_][A-Z0-9_]*)\b")
        .expect("valid regex literal")
});

/// Scan `line` for IPv4 addresses, the first HTTP status and all error codes
pub fn extract_metadata(line: &str) -> Metadata {
    let mut metadata = Metadata::new();

    let ips: Vec<String> = IPV4
        .find_iter(line)
        .filter_map(Result::ok)
        .map(|m| m.as_str().to_string())
        .collect();
    if !ips.is_empty() {
        metadata.insert(KEY_IPS.to_string(), ips);
    }

    if let Ok(Some(caps)) = HTTP_STATUS.captures(line) {
        if let Some(status) = caps.get(1) {
            metadata.insert(KEY_HTTP_STATUS.to_string(), vec![status.as_str().to_string()]);
        }
    }

    let codes: Vec<String> = ERROR_CODE
        .captures_iter(line)
        .filter_map(Result::ok)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect();
    if !codes.is_empty() {
        metadata.insert(KEY_ERROR_CODES.to_string(), codes);
    }

    metadata
}
