//! Plain-text rendering of widget snapshots.

use yasc_common::chart::ChartOptions;
use yasc_common::quote::{MarketState, Quote};
use yasc_common::store::Snapshot;

/// One line per row, plus a chart line under priced rows when the chart is on.
pub fn render_snapshot(snapshot: &Snapshot, options: &ChartOptions) -> Vec<String> {
    let mut lines = Vec::with_capacity(snapshot.rows.len() * 2);
    for quote in &snapshot.rows {
        lines.push(render_row(quote));
        if snapshot.config.show_chart() && quote.market_state != MarketState::Loading {
            lines.push(format!("    {}", render_chart(quote, options)));
        }
    }
    lines
}

fn render_row(quote: &Quote) -> String {
    if quote.market_state == MarketState::Loading {
        return format!("Loading {}...", quote.symbol);
    }
    let arrow = if quote.is_positive() { '▲' } else { '▼' };
    let sign = if quote.is_positive() { "+" } else { "" };
    format!(
        "{:<8} {:<20} {} {} {} {sign}{} ({sign}{}%) [{}] Updated: {}",
        quote.symbol,
        quote.display_name,
        quote.currency,
        quote.price_text(),
        arrow,
        quote.change_text(),
        quote.change_percent_text(),
        quote.market_state,
        quote.as_of.format("%H:%M:%S"),
    )
}

fn render_chart(quote: &Quote, options: &ChartOptions) -> String {
    match quote.chart(options) {
        Ok(line) => line.sparkline(),
        Err(_) => "Chart data unavailable".to_string(),
    }
}
