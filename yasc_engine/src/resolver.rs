//! Per-symbol quote resolution with demo fallback.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures::future::join_all;
use log::{debug, error, warn};
use yasc_common::config::{WatchConfig, WatchEntry};
use yasc_common::demo::generate_demo;
use yasc_common::quote::{MarketState, Quote};
use yasc_common::store::QuoteStore;

use crate::source::{QuoteRequest, QuoteSource};

/// Outcome of one resolution cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Symbols resolved from live data.
    pub live: usize,
    /// Symbols that fell back to demo data.
    pub demo: usize,
}

/// Resolves quotes for one widget configuration.
///
/// Resolution never fails: any [`TransportFailure`](crate::source::TransportFailure)
/// is logged and replaced by the deterministic demo quote for the symbol.
pub struct QuoteResolver {
    source: Arc<dyn QuoteSource>,
    range: String,
    proxy: Option<String>,
    currency: String,
}

impl QuoteResolver {
    /// Resolver querying `source` with the request settings of `config`.
    pub fn new(source: Arc<dyn QuoteSource>, config: &WatchConfig) -> Self {
        QuoteResolver {
            source,
            range: config.chart_range().to_string(),
            proxy: config.cors_proxy().map(str::to_string),
            currency: config.currency().to_string(),
        }
    }

    /// Live quote for `symbol`, or its demo quote when live data is unavailable.
    pub async fn resolve(&self, symbol: &str, display_name: &str) -> Quote {
        let request = QuoteRequest {
            symbol,
            range: &self.range,
            proxy: self.proxy.as_deref(),
        };
        let result = self.source.fetch(&request).await;
        let now = Utc::now();
        match result {
            Ok(live) => {
                debug!("[{symbol}] live quote from {}", self.source.name());
                live.into_quote(symbol, display_name, &self.currency, now)
            }
            Err(e) => {
                warn!(
                    "[{symbol}] {} quote unavailable, using demo data: {e}",
                    self.source.name()
                );
                generate_demo(symbol, display_name, now).with_failure(e.to_string())
            }
        }
    }

    /// Resolve every entry concurrently, storing each quote as soon as it is ready.
    ///
    /// Returns once every entry has a quote in `store`.
    pub async fn resolve_cycle(&self, entries: &[WatchEntry], store: &Mutex<QuoteStore>) -> CycleReport {
        let resolutions = entries.iter().map(|entry| async move {
            let quote = self.resolve(&entry.symbol, &entry.display_name).await;
            let demo = quote.market_state == MarketState::Demo;
            match store.lock() {
                Ok(mut store) => store.upsert(quote),
                Err(e) => error!("[{}] quote store unavailable: {e}", entry.symbol),
            }
            demo
        });

        join_all(resolutions)
            .await
            .into_iter()
            .fold(CycleReport::default(), |mut report, demo| {
                if demo {
                    report.demo += 1;
                } else {
                    report.live += 1;
                }
                report
            })
    }
}
