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

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Upper bound on the stored message, in characters
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Extracted metadata: key -> all values found for that key
pub type Metadata = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Canonicalize a raw level token. `WARN` and `ERR` fold into their long forms.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "DEBUG" => Some(Self::Debug),
            "INFO" => Some(Self::Info),
            "WARNING" | "WARN" => Some(Self::Warning),
            "ERROR" | "ERR" => Some(Self::Error),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// ERROR or CRITICAL. Used by the error-spike detector and the top-errors table.
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error | Self::Critical)
    }

    /// WARNING, ERROR or CRITICAL. Used for the overall error ratio.
    pub const fn is_error_like(self) -> bool {
        matches!(self, Self::Warning | Self::Error | Self::Critical)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an entry's timestamp came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    /// Parsed out of the line itself
    Extracted,
    /// No usable timestamp in the line; the local wall clock at normalization was used
    Ingested,
}

/// One normalized log record. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Wall-clock time as written in the log, no zone attached
    timestamp: NaiveDateTime,
    timestamp_source: TimestampSource,
    level: LogLevel,
    message: String,
    source: String,
    metadata: Metadata,
    raw_line: String,
}

impl LogEntry {
    /// Build an entry with an extracted timestamp and no metadata.
    /// The message is truncated to [`MAX_MESSAGE_CHARS`].
    pub fn new(timestamp: NaiveDateTime, level: LogLevel, message: impl Into<String>) -> Self {
        let message = truncate_chars(message.into(), MAX_MESSAGE_CHARS);
        Self {
            timestamp,
            timestamp_source: TimestampSource::Extracted,
            level,
            raw_line: message.clone(),
            message,
            source: String::new(),
            metadata: Metadata::new(),
        }
    }

    #[must_use]
    pub const fn with_timestamp_source(mut self, source: TimestampSource) -> Self {
        self.timestamp_source = source;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_raw_line(mut self, raw_line: impl Into<String>) -> Self {
        self.raw_line = raw_line.into();
        self
    }

    pub const fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub const fn timestamp_source(&self) -> TimestampSource {
        self.timestamp_source
    }

    /// False when the timestamp is the ingestion-time fallback
    pub fn has_extracted_timestamp(&self) -> bool {
        self.timestamp_source == TimestampSource::Extracted
    }

    pub const fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.level,
            self.message
        )
    }
}

/// Cut `text` down to at most `max_chars` characters, respecting char boundaries
pub fn truncate_chars(mut text: String, max_chars: usize) -> String {
    if let Some((byte_idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(byte_idx);
    }
    text
}
