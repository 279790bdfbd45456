//! Command-line arguments for the YASC card.
//!
//! Flags override values read from `--config`. See `main` for end-to-end usage.
use std::path::PathBuf;

use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Terminal stock watch card", long_about = None)]
pub struct Args {
    /// JSON configuration object (`symbol`/`name` or `symbols`/`names`, `update_interval`, `show_chart`...).
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Text file with tickers separated by commas, spaces, or new lines.
    #[clap(long)]
    pub path: Option<PathBuf>,

    /// Ticker symbols, comma separated.
    #[clap(long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Display names aligned with the symbols, comma separated.
    #[clap(long, value_delimiter = ',')]
    pub names: Vec<String>,

    /// Refresh interval in seconds (10-3600).
    #[clap(long)]
    pub interval: Option<u64>,

    /// Hide the chart.
    #[clap(long)]
    pub no_chart: bool,

    /// Draw a 30-point sparkline instead of the 50-point chart.
    #[clap(long)]
    pub sparkline: bool,

    /// Chart range requested from the quote endpoint (1d, 5d, 1mo...).
    #[clap(long)]
    pub range: Option<String>,

    /// URL prefix of a proxy in front of the quote endpoint.
    #[clap(long)]
    pub proxy: Option<String>,

    /// Alternative quote endpoint host.
    #[clap(long)]
    pub base_url: Option<String>,

    /// Quote request timeout in seconds.
    #[clap(long, default_value_t = 8)]
    pub timeout: u64,

    /// Never go to the network; show demo data only.
    #[clap(long)]
    pub offline: bool,

    /// Exit after this many refresh cycles.
    #[clap(long)]
    pub cycles: Option<u64>,

    /// Print each snapshot as a JSON line instead of text.
    #[clap(long)]
    pub json: bool,
}
