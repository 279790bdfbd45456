//!
//! Domain types shared by the YASC engine and its hosts.
//!
//! This crate aggregates:
//! - `error` — `ConfigError`, `NoDataAvailable` and the host-facing `YascError`.
//! - `result` — handy `Result<T, YascError>` alias.
//! - `tickers` — well-known tickers with demo base prices, ticker list parsing.
//! - `config` — host configuration object and its normalised `WatchConfig`.
//! - `quote` — the displayable `Quote` and its `MarketState`.
//! - `store` — per-widget `QuoteStore` and render `Snapshot`s.
//! - `chart` — min/max normalisation of price series into chart points.
//! - `demo` — deterministic synthetic quotes.
#![warn(missing_docs)]
pub mod chart;
pub mod config;
pub mod demo;
pub mod error;
pub mod quote;
pub mod result;
pub mod store;
pub mod tickers;

pub use config::{RawConfig, WatchConfig, WatchEntry};
pub use error::{ConfigError, NoDataAvailable, YascError};
pub use quote::{MarketState, Quote, SeriesPoint};
pub use result::Result;
pub use store::{QuoteStore, Snapshot};
