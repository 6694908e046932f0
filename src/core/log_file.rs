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

use crate::core::EntrySequence;
use crate::error::{AnalyzerError, Result};
use std::path::Path;
use std::time::Instant;

/// Reads log files into memory for a single analysis pass
pub struct LogFileLoader;

impl LogFileLoader {
    /// Read every non-blank line of `path`, trimmed.
    ///
    /// Invalid UTF-8 is replaced rather than rejected, so binary noise in a
    /// log dump never aborts the run.
    pub fn read_lines(path: &Path) -> Result<Vec<String>> {
        let read_start = Instant::now();
        let buffer = std::fs::read(path).map_err(|e| AnalyzerError::io(path, e))?;
        tracing::info!(
            "File I/O took {:?} to read {} bytes from {}",
            read_start.elapsed(),
            buffer.len(),
            path.display()
        );

        let content = String::from_utf8_lossy(&buffer);
        let lines: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        tracing::debug!("Read {} non-blank lines", lines.len());
        Ok(lines)
    }

    /// Read and normalize `path`. Entries are tagged with the file name.
    pub fn load(path: &Path) -> Result<EntrySequence> {
        let lines = Self::read_lines(path)?;
        if lines.is_empty() {
            return Err(AnalyzerError::NoEntries {
                path: path.to_path_buf(),
            });
        }

        let parse_start = Instant::now();
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let entries = EntrySequence::from_lines_with_source(&lines, &source);
        tracing::info!(
            "Parsing took {:?} to process {} lines from {}",
            parse_start.elapsed(),
            entries.len(),
            path.display()
        );
        Ok(entries)
    }
}
