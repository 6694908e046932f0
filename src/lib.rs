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

//! `LogTriage` turns raw, heterogeneous log text into structured entries,
//! computes summary metrics and flags statistically unusual behavior:
//! error spikes, dominant or singular messages and unusual timing gaps.

pub mod analysis;
pub mod anomaly;
pub mod config;
pub mod core;
pub mod error;
pub mod insight;
pub mod metrics;
pub mod parser;
pub mod report;

pub use analysis::{Analysis, Analyzer};
pub use config::AnalyzerConfig;
pub use core::EntrySequence;
pub use error::{AnalyzerError, Result};
pub use parser::line::{LogEntry, LogLevel};
