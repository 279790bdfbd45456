//! Live quote sources.
//!
//! A [`QuoteSource`] turns a symbol into a [`LiveQuote`] or a
//! [`TransportFailure`]. Failures never leave the resolver: they are logged and
//! replaced by demo data there.
//! - `yahoo` — HTTP source speaking the Yahoo finance chart/quote formats.
//! - `offline` — source that is always unavailable (demo mode).

pub mod offline;
#[cfg(test)]
pub(crate) mod testing;
pub mod yahoo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use yasc_common::quote::{MarketState, Quote, SeriesPoint};

pub use offline::OfflineSource;
pub use yahoo::YahooSource;

/// Why live data could not be used for one symbol.
#[derive(Error, Debug)]
pub enum TransportFailure {
    /// Connection, timeout or body decoding failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// Body parsed but lacked usable price fields.
    #[error("unusable quote payload: {0}")]
    Malformed(String),

    /// The source never goes to the network.
    #[error("live quotes disabled")]
    Offline,
}

/// Everything a source needs to look up one symbol.
#[derive(Debug, Clone, Copy)]
pub struct QuoteRequest<'a> {
    /// Upper-cased ticker symbol.
    pub symbol: &'a str,
    /// Chart range (`1d`, `5d`, `1mo`...).
    pub range: &'a str,
    /// Proxy URL prefix put in front of the encoded endpoint URL.
    pub proxy: Option<&'a str>,
}

/// Validated live market data for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveQuote {
    /// Current price.
    pub price: f64,
    /// Previous session close; never zero.
    pub previous_close: f64,
    /// Currency code reported by the source.
    pub currency: Option<String>,
    /// Market state reported by the source.
    pub market_state: Option<String>,
    /// Close prices with their timestamps.
    pub series: Vec<SeriesPoint>,
}

impl LiveQuote {
    /// Validate the two required prices.
    pub fn new(price: Option<f64>, previous_close: Option<f64>) -> Result<Self, TransportFailure> {
        let price = price
            .filter(|p| p.is_finite())
            .ok_or_else(|| TransportFailure::Malformed("missing current price".to_string()))?;
        let previous_close = previous_close
            .filter(|p| p.is_finite() && *p != 0.0)
            .ok_or_else(|| TransportFailure::Malformed("missing previous close".to_string()))?;
        Ok(LiveQuote {
            price,
            previous_close,
            currency: None,
            market_state: None,
            series: Vec::new(),
        })
    }

    /// Build the displayable quote; `currency` is used when the source had none.
    pub fn into_quote(
        self,
        symbol: &str,
        display_name: &str,
        currency: &str,
        as_of: DateTime<Utc>,
    ) -> Quote {
        let market_state = self
            .market_state
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| s.parse().ok())
            .unwrap_or(MarketState::Regular);
        Quote::priced(symbol, display_name, self.price, self.previous_close, as_of)
            .with_currency(self.currency.as_deref().unwrap_or(currency))
            .with_market_state(market_state)
            .with_series(self.series)
    }
}

/// Pair close prices with epoch-second timestamps, dropping missing samples.
pub fn pair_series(timestamps: &[i64], closes: &[Option<f64>]) -> Vec<SeriesPoint> {
    timestamps
        .iter()
        .zip(closes)
        .filter_map(|(&ts, &close)| {
            let price = close.filter(|p| p.is_finite())?;
            let timestamp = DateTime::from_timestamp(ts, 0)?;
            Some(SeriesPoint { timestamp, price })
        })
        .collect()
}

/// Provider of live quotes.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch live data for `request.symbol`.
    async fn fetch(&self, request: &QuoteRequest<'_>) -> Result<LiveQuote, TransportFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_or_zero_prices() {
        assert!(matches!(
            LiveQuote::new(None, Some(1.0)),
            Err(TransportFailure::Malformed(_))
        ));
        assert!(matches!(
            LiveQuote::new(Some(1.0), Some(0.0)),
            Err(TransportFailure::Malformed(_))
        ));
        assert!(LiveQuote::new(Some(1.0), Some(2.0)).is_ok());
    }

    #[test]
    fn live_quote_defaults_state_and_currency() {
        let live = LiveQuote::new(Some(110.0), Some(100.0)).unwrap();
        let quote = live.into_quote("AAPL", "Apple", "EUR", Utc::now());
        assert_eq!(quote.change_text(), "10.00");
        assert_eq!(quote.change_percent_text(), "10.00");
        assert_eq!(quote.market_state, MarketState::Regular);
        assert_eq!(quote.currency, "EUR");
        assert!(quote.failure.is_none());
    }

    #[test]
    fn live_quote_keeps_reported_fields() {
        let mut live = LiveQuote::new(Some(50.0), Some(40.0)).unwrap();
        live.currency = Some("GBP".to_string());
        live.market_state = Some("closed".to_string());
        let quote = live.into_quote("VOD.L", "Vodafone", "USD", Utc::now());
        assert_eq!(quote.currency, "GBP");
        assert_eq!(quote.market_state, MarketState::Closed);
        assert_eq!(quote.change_percent_text(), "25.00");
    }

    #[test]
    fn series_skips_null_closes() {
        let series = pair_series(&[60, 120, 180], &[Some(1.0), None, Some(3.0)]);
        let prices: Vec<f64> = series.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![1.0, 3.0]);
        assert_eq!(series[1].timestamp.timestamp(), 180);
    }
}
