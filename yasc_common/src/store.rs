//! Per-widget quote storage and the snapshots handed to renderers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::WatchConfig;
use crate::quote::Quote;

/// Latest quote per symbol for one widget instance.
#[derive(Debug, Clone, Default)]
pub struct QuoteStore {
    quotes: HashMap<String, Quote>,
}

impl QuoteStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the quote for `quote.symbol`.
    pub fn upsert(&mut self, quote: Quote) {
        self.quotes.insert(quote.symbol.clone(), quote);
    }

    /// Latest quote for `symbol`.
    pub fn get(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.get(symbol)
    }

    /// Number of stored quotes.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// True when nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Drop quotes whose symbol is no longer configured; returns how many went.
    pub fn prune(&mut self, config: &WatchConfig) -> usize {
        let before = self.quotes.len();
        self.quotes.retain(|symbol, _| config.contains(symbol));
        before - self.quotes.len()
    }

    /// One row per configured entry, in configuration order.
    ///
    /// Rows carry the configured display name. Symbols without a stored quote
    /// show as loading rows.
    pub fn snapshot(&self, config: &WatchConfig, cycle: u64) -> Snapshot {
        let rows = config
            .entries()
            .iter()
            .map(|entry| match self.quotes.get(&entry.symbol) {
                Some(quote) => Quote {
                    display_name: entry.display_name.clone(),
                    ..quote.clone()
                },
                None => Quote::loading(&entry.symbol, &entry.display_name),
            })
            .collect();
        Snapshot {
            config: config.clone(),
            rows,
            cycle,
            taken_at: Utc::now(),
        }
    }
}

/// Read-only view of a widget consumed by the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Configuration the rows were built for.
    pub config: WatchConfig,
    /// One row per configured symbol.
    pub rows: Vec<Quote>,
    /// Completed resolution cycles of the widget; 0 before the first one.
    pub cycle: u64,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
}

impl Snapshot {
    /// Row for `symbol`, if configured.
    pub fn row(&self, symbol: &str) -> Option<&Quote> {
        self.rows.iter().find(|q| q.symbol == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfig;
    use crate::quote::MarketState;

    fn config(symbols: &[&str]) -> WatchConfig {
        RawConfig {
            symbols: Some(symbols.iter().map(|s| s.to_string()).collect()),
            ..RawConfig::default()
        }
        .normalize()
        .unwrap()
    }

    #[test]
    fn snapshot_follows_config_order_with_loading_rows() {
        let mut store = QuoteStore::new();
        store.upsert(Quote::priced("MSFT", "MSFT", 400.0, 390.0, Utc::now()));

        let snapshot = store.snapshot(&config(&["AAPL", "MSFT"]), 1);
        let symbols: Vec<&str> = snapshot.rows.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(snapshot.rows[0].market_state, MarketState::Loading);
        assert_eq!(snapshot.row("MSFT").map(|q| q.price_text()), Some("400.00".to_string()));
    }

    #[test]
    fn prune_removes_orphans() {
        let mut store = QuoteStore::new();
        for symbol in ["AAPL", "MSFT", "TSLA"] {
            store.upsert(Quote::priced(symbol, symbol, 1.0, 1.0, Utc::now()));
        }
        assert_eq!(store.prune(&config(&["MSFT"])), 2);
        assert_eq!(store.len(), 1);
        assert!(store.get("AAPL").is_none());
        assert!(store.get("MSFT").is_some());
    }

    #[test]
    fn snapshot_uses_current_display_names() {
        let mut store = QuoteStore::new();
        store.upsert(Quote::priced("AAPL", "AAPL", 1.0, 1.0, Utc::now()));
        let renamed = config(&["AAPL"]).with_display_name(0, "Apple").unwrap();
        assert_eq!(store.snapshot(&renamed, 0).rows[0].display_name, "Apple");
    }
}
