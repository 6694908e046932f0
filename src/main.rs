/// `LogTriage` - A first-pass log triage tool
///
/// Copyright (C) 2025 Daniel Freiermuth
///
/// This program is free software: you can redistribute it and/or modify
/// it under the terms of the GNU General Public License as published by
/// the Free Software Foundation, either version 3 of the License, or
/// (at your option) any later version.
///
/// This program is distributed in the hope that it will be useful,
/// but WITHOUT ANY WARRANTY; without even the implied warranty of
/// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
/// GNU General Public License for more details.
///
/// You should have received a copy of the GNU General Public License
/// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use anyhow::{bail, Context};
use clap::Parser;
use logtriage::report::{ReportFormat, Reporter};
use logtriage::{Analyzer, AnalyzerConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

#[derive(Parser, Debug)]
#[command(name = "logtriage")]
#[command(author = "LogTriage Team")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Detect error spikes, unusual messages and timing gaps in log files", long_about = None)]
struct Args {
    /// Path to the log file to analyze
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Write the report here instead of stdout
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Json)]
    format: ReportFormat,

    /// JSON configuration file (defaults to the user config directory)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Anomaly threshold in standard deviations
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // RUST_LOG overrides the default filter
    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        "LogTriage starting up (version {})",
        env!("CARGO_PKG_VERSION")
    );

    if !args.file.is_file() {
        bail!("Log file not found: {}", args.file.display());
    }

    let mut config = match &args.config {
        Some(path) => AnalyzerConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalyzerConfig::load(),
    };
    if let Some(threshold) = args.threshold {
        config = config.with_threshold(threshold);
    }

    tracing::info!("Analyzing {}", args.file.display());
    let analyzer = Analyzer::new(config);
    let (entries, analysis) = analyzer
        .analyze_file(&args.file)
        .with_context(|| format!("Failed to analyze {}", args.file.display()))?;

    let reporter = Reporter::new(&analysis, entries.head(analyzer.config().detail_entries));
    match &args.output {
        Some(path) => {
            reporter
                .write(args.format, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{}", reporter.render(args.format)?),
    }

    if args.format != ReportFormat::Text {
        eprintln!("{}", reporter.to_text());
    }

    Ok(())
}
