//! Well-known ticker symbols and ticker list parsing.

use std::io::BufRead;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::YascError;

/// Base price used for demo quotes of symbols outside [`KnownTicker`].
pub const DEFAULT_BASE_PRICE: f64 = 100.0;

/// Trait providing ticker list parsing.
pub trait SymbolParser {
    /// Parses ticker symbols from a buffered reader.
    ///
    /// Symbols may be separated by commas, spaces, or new lines. Each symbol is
    /// trimmed and upper-cased; empty tokens are skipped. A token containing
    /// characters that never appear in a ticker is an error.
    fn parse_from_reader<R: BufRead>(reader: R) -> Result<Vec<String>, YascError>;
}

/// Ticker list parser used by hosts that read symbols from a text file.
pub struct TickerList;

impl SymbolParser for TickerList {
    fn parse_from_reader<R: BufRead>(reader: R) -> Result<Vec<String>, YascError> {
        let mut symbols = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(YascError::Io)?;
            let line = line.split('#').next().unwrap_or_default();
            for token in line.split(|c: char| c == ',' || c.is_whitespace()) {
                let token = token.trim();
                if token.is_empty() {
                    continue;
                }
                if !is_ticker_text(token) {
                    return Err(YascError::ParseTickersFile(format!(
                        "unexpected symbol {token:?}"
                    )));
                }
                symbols.push(token.to_ascii_uppercase());
            }
        }
        Ok(symbols)
    }
}

/// Tickers use letters, digits and `.-^=` (`BRK.B`, `BTC-USD`, `^GSPC`, `EURUSD=X`).
fn is_ticker_text(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
}

/// Symbols with a fixed demo base price.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Display, EnumString, EnumIter, Hash, Eq, PartialEq)]
#[strum(ascii_case_insensitive)]
pub enum KnownTicker {
    AAPL,
    GOOGL,
    MSFT,
    TSLA,
    AMZN,
    NVDA,
    META,
}

impl KnownTicker {
    /// Demo base price, also used as the demo "previous close".
    pub fn base_price(self) -> f64 {
        match self {
            KnownTicker::AAPL => 185.0,
            KnownTicker::GOOGL => 140.0,
            KnownTicker::MSFT => 410.0,
            KnownTicker::TSLA => 245.0,
            KnownTicker::AMZN => 155.0,
            KnownTicker::NVDA => 480.0,
            KnownTicker::META => 350.0,
        }
    }
}

/// Demo base price for any symbol, falling back to [`DEFAULT_BASE_PRICE`].
pub fn base_price_for(symbol: &str) -> f64 {
    symbol
        .trim()
        .parse::<KnownTicker>()
        .map(KnownTicker::base_price)
        .unwrap_or(DEFAULT_BASE_PRICE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use strum::IntoEnumIterator;

    #[test]
    fn known_tickers_have_positive_base_prices() {
        for ticker in KnownTicker::iter() {
            assert!(ticker.base_price() > 0.0, "{ticker}");
        }
    }

    #[test]
    fn base_price_lookup_is_case_insensitive() {
        assert_eq!(base_price_for("aapl"), 185.0);
        assert_eq!(base_price_for("MSFT"), 410.0);
        assert_eq!(base_price_for("ZZZZ"), DEFAULT_BASE_PRICE);
        assert_eq!(base_price_for("BTC-USD"), DEFAULT_BASE_PRICE);
    }

    #[test]
    fn parses_mixed_separators() {
        let input = "aapl, msft\n\n  tsla\tBTC-USD # crypto\n^GSPC,,\n";
        let symbols = TickerList::parse_from_reader(Cursor::new(input)).unwrap();
        assert_eq!(symbols, vec!["AAPL", "MSFT", "TSLA", "BTC-USD", "^GSPC"]);
    }

    #[test]
    fn rejects_garbage_tokens() {
        let err = TickerList::parse_from_reader(Cursor::new("AAPL $$$")).unwrap_err();
        assert!(matches!(err, YascError::ParseTickersFile(_)));
    }
}
