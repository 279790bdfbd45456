//! YASC card — a terminal host for the stock watch widget.
//!
//! Builds a widget configuration from a JSON file, a ticker list file and/or
//! flags, attaches the widget and prints every snapshot it publishes until
//! Ctrl+C (or `--cycles`) ends the run.
//!
//! Usage example (CLI):
//! ```bash
//! yasc_card --symbols aapl,msft,btc-usd --names "Apple,Microsoft" --interval 30
//! yasc_card --config ./card.json --offline --cycles 1 --json
//! ```
#![warn(missing_docs)]
mod args;
mod render;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::{error, info, warn};
use yasc_common::chart::ChartOptions;
use yasc_common::config::{IntervalSetting, RawConfig};
use yasc_common::tickers::{SymbolParser, TickerList};
use yasc_common::{Result, YascError};
use yasc_engine::{OfflineSource, QuoteSource, StockWidget, YahooSource};

use crate::args::Args;
use crate::render::render_snapshot;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), YascError> {
    init_logger();
    let args = Args::parse();

    let raw = build_config(&args)?;
    let source = build_source(&args)?;

    let mut widget = StockWidget::new(source);
    widget.configure(&raw)?;
    let chart_options = if args.sparkline {
        ChartOptions::sparkline()
    } else {
        widget
            .config()
            .map(|config| ChartOptions::default().with_max_points(config.chart_points()))
            .unwrap_or_default()
    };

    let mut updates = widget.subscribe();
    widget.attach();
    info!("Card is running. Press Ctrl+C to exit.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received. Shutting down card...");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    warn!("Widget stopped publishing snapshots");
                    break;
                }
                let Some(snapshot) = updates.borrow_and_update().clone() else {
                    continue;
                };
                if snapshot.cycle == 0 {
                    continue;
                }
                if args.json {
                    println!("{}", serde_json::to_string(&snapshot)?);
                } else {
                    for line in render_snapshot(&snapshot, &chart_options) {
                        println!("{line}");
                    }
                }
                if args.cycles.is_some_and(|limit| snapshot.cycle >= limit) {
                    break;
                }
            }
        }
    }

    widget.detach();
    Ok(())
}

/// Merge the config file, the ticker list file and flags, in that order.
fn build_config(args: &Args) -> Result<RawConfig> {
    let mut raw = match &args.config {
        Some(path) => {
            let file = File::open(path)?;
            serde_json::from_reader(BufReader::new(file))?
        }
        None => RawConfig::default(),
    };

    let mut symbols = Vec::new();
    if let Some(path) = &args.path {
        symbols.extend(read_ticker_list(path)?);
    }
    symbols.extend(args.symbols.iter().cloned());
    if !symbols.is_empty() {
        info!("Tickers: {:?}", symbols);
        raw.symbols = Some(symbols);
    }
    if !args.names.is_empty() {
        raw.names = Some(args.names.clone());
    }
    if let Some(secs) = args.interval {
        raw.update_interval = Some(IntervalSetting::Seconds(secs));
    }
    if args.no_chart {
        raw.show_chart = Some(false);
    }
    if args.range.is_some() {
        raw.chart_range = args.range.clone();
    }
    if args.proxy.is_some() {
        raw.cors_proxy = args.proxy.clone();
    }
    Ok(raw)
}

fn read_ticker_list(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| {
        error!("Failed to open ticker list {}: {}", path.display(), e);
        YascError::Io(e)
    })?;
    TickerList::parse_from_reader(BufReader::new(file))
}

fn build_source(args: &Args) -> Result<Arc<dyn QuoteSource>> {
    if args.offline {
        info!("Offline: showing demo data only");
        return Ok(Arc::new(OfflineSource));
    }
    let mut source = YahooSource::new(Duration::from_secs(args.timeout.max(1)))
        .map_err(|e| YascError::Format(format!("Failed to build HTTP client: {e}")))?;
    if let Some(base_url) = &args.base_url {
        source = source.with_base_url(base_url);
    }
    Ok(Arc::new(source))
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
