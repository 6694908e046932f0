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

use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 2.0;

/// Which detectors run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionToggles {
    pub error_spike: bool,
    pub pattern: bool,
    pub timing: bool,
}

impl Default for DetectionToggles {
    fn default() -> Self {
        Self {
            error_spike: true,
            pattern: true,
            timing: true,
        }
    }
}

/// All tunables of an analysis run, passed explicitly into the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Standard-deviation multiplier shared by the error-spike and timing detectors
    pub anomaly_threshold: f64,
    /// Chunk size is `max(min_chunk_size, N / chunk_divisor)`
    pub min_chunk_size: usize,
    pub chunk_divisor: usize,
    /// Most frequent messages checked for over-representation
    pub pattern_top_n: usize,
    pub frequent_message_pct: f64,
    /// Above this share a frequent message is reported as high severity
    pub high_frequency_pct: f64,
    /// Singleton messages are only notable when the batch has more entries than this
    pub rare_min_entries: usize,
    pub rare_message_limit: usize,
    pub top_errors: usize,
    pub error_rate_alert_pct: f64,
    pub anomaly_count_alert: usize,
    /// Entries included in the report detail section
    pub detail_entries: usize,
    /// Skip gaps touching an entry whose timestamp is the ingestion-time fallback
    pub exclude_ingested_timestamps: bool,
    pub detection: DetectionToggles,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            anomaly_threshold: DEFAULT_ANOMALY_THRESHOLD,
            min_chunk_size: 10,
            chunk_divisor: 10,
            pattern_top_n: 20,
            frequent_message_pct: 30.0,
            high_frequency_pct: 50.0,
            rare_min_entries: 100,
            rare_message_limit: 20,
            top_errors: 5,
            error_rate_alert_pct: 10.0,
            anomaly_count_alert: 5,
            detail_entries: 100,
            exclude_ingested_timestamps: true,
            detection: DetectionToggles::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Get the path to the per-user config file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("logtriage").join("config.json"))
    }

    /// Load the per-user config, returning defaults if it is absent or unreadable
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            tracing::info!("No user config found, using defaults");
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring user config: {e}");
                Self::default()
            }
        }
    }

    /// Load an explicitly requested config file. Unlike [`Self::load`], failures are errors.
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::info!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|e| AnalyzerError::io(path, e))?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| AnalyzerError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(config.validated())
    }

    /// Save config to `path` as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AnalyzerError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| AnalyzerError::io(path, e))?;
        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Replace values the detectors cannot work with
    #[must_use]
    pub fn validated(mut self) -> Self {
        if !self.anomaly_threshold.is_finite() || self.anomaly_threshold < 0.0 {
            tracing::warn!(
                "anomaly_threshold {} is invalid, using {DEFAULT_ANOMALY_THRESHOLD}",
                self.anomaly_threshold
            );
            self.anomaly_threshold = DEFAULT_ANOMALY_THRESHOLD;
        }
        if self.min_chunk_size == 0 {
            tracing::warn!("min_chunk_size must be positive, using 1");
            self.min_chunk_size = 1;
        }
        if self.chunk_divisor == 0 {
            tracing::warn!("chunk_divisor must be positive, using 1");
            self.chunk_divisor = 1;
        }
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.anomaly_threshold = threshold;
        self.validated()
    }
}
