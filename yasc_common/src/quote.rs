//! Displayable quote state for one ticker.
//!
//! A `Quote` is what a renderer shows in one row: price, change and change
//! percent (rounded to two decimals), currency, market state and the recent
//! price series used for the chart.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::{self, ChartLine, ChartOptions};
use crate::config::DEFAULT_CURRENCY;
use crate::error::NoDataAvailable;

/// Market session tag reported with a quote.
///
/// The vocabulary is open: tags the engine does not know are kept verbatim in
/// [`MarketState::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarketState {
    /// Regular trading session.
    Regular,
    /// Market closed.
    Closed,
    /// Pre-market session.
    Pre,
    /// After-hours session.
    Post,
    /// Before the pre-market session.
    PrePre,
    /// After the after-hours session.
    PostPost,
    /// Synthetic data shown because live data was unavailable.
    Demo,
    /// Quote could not be produced.
    Error,
    /// No resolution has finished yet.
    Loading,
    /// Any other tag, upper-cased.
    Other(String),
}

impl MarketState {
    /// Upper-case tag as shown on the badge.
    pub fn as_str(&self) -> &str {
        match self {
            MarketState::Regular => "REGULAR",
            MarketState::Closed => "CLOSED",
            MarketState::Pre => "PRE",
            MarketState::Post => "POST",
            MarketState::PrePre => "PREPRE",
            MarketState::PostPost => "POSTPOST",
            MarketState::Demo => "DEMO",
            MarketState::Error => "ERROR",
            MarketState::Loading => "LOADING",
            MarketState::Other(tag) => tag,
        }
    }

    /// True for states that carry no live market data.
    pub fn is_synthetic(&self) -> bool {
        matches!(
            self,
            MarketState::Demo | MarketState::Error | MarketState::Loading
        )
    }
}

impl FromStr for MarketState {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_uppercase();
        Ok(match tag.as_str() {
            "REGULAR" => MarketState::Regular,
            "CLOSED" => MarketState::Closed,
            "PRE" => MarketState::Pre,
            "POST" => MarketState::Post,
            "PREPRE" => MarketState::PrePre,
            "POSTPOST" => MarketState::PostPost,
            "DEMO" => MarketState::Demo,
            "ERROR" => MarketState::Error,
            "LOADING" => MarketState::Loading,
            _ => MarketState::Other(tag),
        })
    }
}

impl From<String> for MarketState {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(state) => state,
            Err(never) => match never {},
        }
    }
}

impl From<MarketState> for String {
    fn from(value: MarketState) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for MarketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sample of a quote's price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Sample time.
    pub timestamp: DateTime<Utc>,
    /// Close price at `timestamp`.
    pub price: f64,
}

/// Resolved state of one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    /// Ticker symbol.
    pub symbol: String,
    /// Name shown next to the symbol.
    pub display_name: String,
    /// Current price, rounded to 2 decimals.
    pub price: f64,
    /// `price - previous_close`, rounded to 2 decimals.
    pub change: f64,
    /// `100 * change / previous_close`, rounded to 2 decimals.
    pub change_percent: f64,
    /// Currency code.
    pub currency: String,
    /// Market session or synthetic marker.
    pub market_state: MarketState,
    /// When this quote was resolved.
    pub as_of: DateTime<Utc>,
    /// Recent prices for charting; may be empty.
    pub series: Vec<SeriesPoint>,
    /// Why live data was not used, if it was not.
    pub failure: Option<String>,
}

impl Quote {
    /// Quote derived from a current price and the previous close.
    ///
    /// Defaults to `REGULAR` in the default currency with an empty series.
    pub fn priced(
        symbol: &str,
        display_name: &str,
        price: f64,
        previous_close: f64,
        as_of: DateTime<Utc>,
    ) -> Quote {
        let change = price - previous_close;
        let change_percent = if previous_close == 0.0 {
            0.0
        } else {
            100.0 * change / previous_close
        };
        Quote {
            symbol: symbol.to_string(),
            display_name: display_name.to_string(),
            price: round2(price),
            change: round2(change),
            change_percent: round2(change_percent),
            currency: DEFAULT_CURRENCY.to_string(),
            market_state: MarketState::Regular,
            as_of,
            series: Vec::new(),
            failure: None,
        }
    }

    /// Placeholder row for a symbol that has not been resolved yet.
    pub fn loading(symbol: &str, display_name: &str) -> Quote {
        Quote {
            market_state: MarketState::Loading,
            ..Quote::priced(symbol, display_name, 0.0, 0.0, Utc::now())
        }
    }

    /// Set the currency code.
    pub fn with_currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_string();
        self
    }

    /// Set the market state.
    pub fn with_market_state(mut self, market_state: MarketState) -> Self {
        self.market_state = market_state;
        self
    }

    /// Attach the price series.
    pub fn with_series(mut self, series: Vec<SeriesPoint>) -> Self {
        self.series = series;
        self
    }

    /// Record why live data was not used.
    pub fn with_failure(mut self, failure: impl Into<String>) -> Self {
        self.failure = Some(failure.into());
        self
    }

    /// Price with exactly two decimals.
    pub fn price_text(&self) -> String {
        format!("{:.2}", self.price)
    }

    /// Change with exactly two decimals.
    pub fn change_text(&self) -> String {
        format!("{:.2}", self.change)
    }

    /// Change percent with exactly two decimals.
    pub fn change_percent_text(&self) -> String {
        format!("{:.2}", self.change_percent)
    }

    /// True when the price did not fall.
    pub fn is_positive(&self) -> bool {
        self.change >= 0.0
    }

    /// Series prices in time order.
    pub fn closes(&self) -> Vec<f64> {
        self.series.iter().map(|p| p.price).collect()
    }

    /// Normalised chart points for the series.
    pub fn chart(&self, options: &ChartOptions) -> Result<ChartLine, NoDataAvailable> {
        let samples: Vec<Option<f64>> = self.series.iter().map(|p| Some(p.price)).collect();
        chart::normalize(&samples, options)
    }
}

/// Round half away from zero to 2 decimals; never yields `-0.0`.
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}
