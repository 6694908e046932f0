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

use crate::parser::line::LogEntry;
use crate::parser::normalize_line_at;
use chrono::Local;
use rayon::prelude::*;
use serde::Serialize;
use std::ops::Deref;

/// The ordered, read-only batch of normalized entries for one analysis run.
///
/// Insertion order is file order. Entries are neither re-sorted nor deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EntrySequence {
    entries: Vec<LogEntry>,
}

impl EntrySequence {
    pub const fn new(entries: Vec<LogEntry>) -> Self {
        Self { entries }
    }

    /// Normalize every non-blank line. Lines are trimmed first.
    pub fn from_lines<S: AsRef<str> + Sync>(lines: &[S]) -> Self {
        Self::from_lines_with_source(lines, "")
    }

    /// Like [`Self::from_lines`], tagging every entry with `source`
    pub fn from_lines_with_source<S: AsRef<str> + Sync>(lines: &[S], source: &str) -> Self {
        // One clock reading per batch keeps un-timestamped lines at a single instant
        let now = Local::now().naive_local();
        let entries: Vec<LogEntry> = lines
            .par_iter()
            .map(|line| line.as_ref().trim())
            .filter(|line| !line.is_empty())
            .map(|line| {
                let entry = normalize_line_at(line, now);
                if source.is_empty() {
                    entry
                } else {
                    entry.with_source(source)
                }
            })
            .collect();

        let ingested = entries
            .iter()
            .filter(|e| !e.has_extracted_timestamp())
            .count();
        tracing::debug!(
            "Normalized {} entries from {} lines ({ingested} without a timestamp)",
            entries.len(),
            lines.len()
        );

        Self { entries }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The first `n` entries, for detail display
    pub fn head(&self, n: usize) -> &[LogEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}

impl Deref for EntrySequence {
    type Target = [LogEntry];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

impl From<Vec<LogEntry>> for EntrySequence {
    fn from(entries: Vec<LogEntry>) -> Self {
        Self::new(entries)
    }
}

impl FromIterator<LogEntry> for EntrySequence {
    fn from_iter<I: IntoIterator<Item = LogEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
