//! Deterministic synthetic quotes.
//!
//! Used whenever live data is unavailable. Everything is derived from the
//! symbol text through a small linear congruential step, so the same symbol
//! always yields the same price, change and series; refreshing a demo row
//! never turns it into random noise.

use chrono::{DateTime, Duration, Utc};

use crate::quote::{MarketState, Quote, SeriesPoint};
use crate::tickers::base_price_for;

/// Samples in a demo series.
pub const DEMO_SERIES_LEN: usize = 30;

const LCG_MULTIPLIER: u64 = 9301;
const LCG_INCREMENT: u64 = 49297;
const LCG_MODULUS: u64 = 233280;

/// Largest relative distance of the demo price from its base price.
pub const MAX_VARIATION: f64 = 0.03;
/// Largest relative per-sample noise, as a share of the base price.
const SAMPLE_NOISE: f64 = 0.01;

/// Sum of the character codes of `symbol`.
pub fn symbol_seed(symbol: &str) -> u64 {
    symbol.chars().map(|c| c as u64).sum()
}

/// One congruential step normalised into `[0, 1)`.
pub fn lcg_unit(seed: u64) -> f64 {
    let next = ((seed % LCG_MODULUS) * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
    next as f64 / LCG_MODULUS as f64
}

/// Demo quote for `symbol`, with series timestamps one minute apart ending at `now`.
///
/// The base price doubles as the previous close, so `change` is the demo
/// variation itself.
pub fn generate_demo(symbol: &str, display_name: &str, now: DateTime<Utc>) -> Quote {
    let base = base_price_for(symbol);
    let seed = symbol_seed(symbol);

    let variation = (lcg_unit(seed) - 0.5) * 2.0 * MAX_VARIATION;
    let price = base * (1.0 + variation);

    let last = (DEMO_SERIES_LEN - 1) as f64;
    let series = (0..DEMO_SERIES_LEN)
        .map(|i| {
            let drift = (price - base) * (i as f64 / last);
            let noise = (lcg_unit(seed + i as u64) - 0.5) * base * SAMPLE_NOISE;
            let minutes_back = (DEMO_SERIES_LEN - 1 - i) as i64;
            SeriesPoint {
                timestamp: now - Duration::minutes(minutes_back),
                price: base + drift + noise,
            }
        })
        .collect();

    Quote::priced(symbol, display_name, price, base, now)
        .with_market_state(MarketState::Demo)
        .with_series(series)
}
