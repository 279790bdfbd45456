//! Widget configuration.
//!
//! Hosts hand the engine a loosely-typed [`RawConfig`]: either the legacy
//! single-symbol form (`symbol` / `name`) or the array form (`symbols` /
//! `names`). [`RawConfig::normalize`] turns either into a [`WatchConfig`],
//! which pairs every symbol with its display name and clamps the numeric
//! settings. A `WatchConfig` is never mutated; every edit builds a new one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, YascError};

/// Refresh interval used when the host does not set one.
pub const DEFAULT_REFRESH_INTERVAL: u64 = 60;
/// Shortest allowed refresh interval in seconds.
pub const MIN_REFRESH_INTERVAL: u64 = 10;
/// Longest allowed refresh interval in seconds.
pub const MAX_REFRESH_INTERVAL: u64 = 3600;
/// Trailing samples kept for the full chart.
pub const FULL_CHART_POINTS: usize = 50;
/// Trailing samples kept for a sparkline.
pub const SPARKLINE_POINTS: usize = 30;
/// Chart range requested from the quote endpoint.
pub const DEFAULT_CHART_RANGE: &str = "1d";
/// Currency assumed when a payload carries none.
pub const DEFAULT_CURRENCY: &str = "USD";

const MIN_CHART_POINTS: usize = 2;
const MAX_CHART_POINTS: usize = 500;

/// Refresh interval as written by a host: a number, or text from a form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntervalSetting {
    /// Seconds as a JSON number.
    Seconds(u64),
    /// Fractional or negative number; truncated when non-negative.
    Fractional(f64),
    /// Seconds as text, e.g. `"120"`.
    Text(String),
    /// Any other JSON value; always rejected.
    Other(Value),
}

impl IntervalSetting {
    fn seconds(&self) -> Result<u64, ConfigError> {
        match self {
            IntervalSetting::Seconds(secs) => Ok(*secs),
            IntervalSetting::Fractional(secs) if secs.is_finite() && *secs >= 0.0 => {
                Ok(secs.trunc() as u64)
            }
            IntervalSetting::Fractional(secs) => {
                Err(ConfigError::InvalidInterval(secs.to_string()))
            }
            IntervalSetting::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidInterval(text.clone())),
            IntervalSetting::Other(value) => Err(ConfigError::InvalidInterval(value.to_string())),
        }
    }
}

/// Configuration object as supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Legacy single symbol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Legacy display name for `symbol`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Symbols, in display order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<String>>,
    /// Display names aligned by position with `symbols`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
    /// Refresh interval in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_interval: Option<IntervalSetting>,
    /// Whether the chart is rendered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_chart: Option<bool>,
    /// Trailing samples kept for the chart.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_points: Option<usize>,
    /// Chart range requested from the quote endpoint (`1d`, `5d`, `1mo`...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_range: Option<String>,
    /// URL prefix of a proxy placed in front of the quote endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cors_proxy: Option<String>,
    /// Fallback currency code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl RawConfig {
    /// Config holding a single symbol in the legacy form.
    pub fn single(symbol: &str) -> Self {
        RawConfig {
            symbol: Some(symbol.to_string()),
            ..RawConfig::default()
        }
    }

    /// Normalise either configuration form into a [`WatchConfig`].
    ///
    /// The array form wins when it holds at least one non-blank symbol.
    pub fn normalize(&self) -> Result<WatchConfig, ConfigError> {
        let entries: Vec<WatchEntry> = match self.symbols.as_deref() {
            Some(symbols) if symbols.iter().any(|s| !s.trim().is_empty()) => {
                let names = self.names.as_deref().unwrap_or_default();
                symbols
                    .iter()
                    .enumerate()
                    .filter_map(|(i, symbol)| {
                        WatchEntry::new(symbol, names.get(i).map(String::as_str))
                    })
                    .collect()
            }
            _ => self
                .symbol
                .iter()
                .filter_map(|symbol| WatchEntry::new(symbol, self.name.as_deref()))
                .collect(),
        };
        if entries.is_empty() {
            return Err(ConfigError::MissingSymbol);
        }

        let refresh_interval = match &self.update_interval {
            Some(setting) => clamp_interval(setting.seconds()?),
            None => DEFAULT_REFRESH_INTERVAL,
        };

        Ok(WatchConfig {
            entries,
            refresh_interval,
            show_chart: self.show_chart.unwrap_or(true),
            chart_points: self
                .chart_points
                .unwrap_or(FULL_CHART_POINTS)
                .clamp(MIN_CHART_POINTS, MAX_CHART_POINTS),
            chart_range: non_blank(self.chart_range.as_deref())
                .map(|r| r.to_ascii_lowercase())
                .unwrap_or_else(|| DEFAULT_CHART_RANGE.to_string()),
            cors_proxy: non_blank(self.cors_proxy.as_deref()).map(str::to_string),
            currency: non_blank(self.currency.as_deref())
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
    }

    /// Apply one editor change and return the resulting config.
    ///
    /// `null` or an empty string removes `key`; anything else replaces it.
    /// Fails when the value has the wrong type for `key`.
    pub fn apply_edit(&self, key: &str, value: Value) -> Result<RawConfig, YascError> {
        let mut object = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            other => {
                return Err(YascError::Format(format!(
                    "config is not an object: {other}"
                )));
            }
        };
        let clear = match &value {
            Value::Null => true,
            Value::String(text) => text.is_empty(),
            _ => false,
        };
        if clear {
            object.remove(key);
        } else {
            object.insert(key.to_string(), value);
        }
        Ok(serde_json::from_value(Value::Object(object))?)
    }
}

fn clamp_interval(secs: u64) -> u64 {
    if secs == 0 {
        DEFAULT_REFRESH_INTERVAL
    } else {
        secs.clamp(MIN_REFRESH_INTERVAL, MAX_REFRESH_INTERVAL)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// One configured symbol and the name shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEntry {
    /// Upper-cased ticker symbol.
    pub symbol: String,
    /// Name displayed for the symbol; defaults to the symbol itself.
    pub display_name: String,
}

impl WatchEntry {
    /// Builds an entry, or `None` when `symbol` is blank.
    pub fn new(symbol: &str, display_name: Option<&str>) -> Option<Self> {
        let symbol = symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return None;
        }
        let display_name = non_blank(display_name)
            .map(str::to_string)
            .unwrap_or_else(|| symbol.clone());
        Some(WatchEntry {
            symbol,
            display_name,
        })
    }

    fn has_custom_name(&self) -> bool {
        self.display_name != self.symbol
    }
}

/// Normalised configuration of one widget instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchConfig {
    entries: Vec<WatchEntry>,
    refresh_interval: u64,
    show_chart: bool,
    chart_points: usize,
    chart_range: String,
    cors_proxy: Option<String>,
    currency: String,
}

impl WatchConfig {
    /// Configuration shown for a freshly added widget.
    pub fn stub() -> Self {
        WatchConfig {
            entries: vec![WatchEntry {
                symbol: "AAPL".to_string(),
                display_name: "Apple Inc.".to_string(),
            }],
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            show_chart: true,
            chart_points: FULL_CHART_POINTS,
            chart_range: DEFAULT_CHART_RANGE.to_string(),
            cors_proxy: None,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Symbol/name pairs in display order. Never empty.
    pub fn entries(&self) -> &[WatchEntry] {
        &self.entries
    }

    /// Configured symbols in display order.
    pub fn symbols(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.symbol.as_str()).collect()
    }

    /// Display names aligned with [`Self::symbols`].
    pub fn display_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.display_name.as_str()).collect()
    }

    /// Whether `symbol` is configured.
    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.iter().any(|e| e.symbol == symbol)
    }

    /// Refresh interval in seconds, within [10, 3600].
    pub fn refresh_interval(&self) -> u64 {
        self.refresh_interval
    }

    /// Whether the chart is rendered.
    pub fn show_chart(&self) -> bool {
        self.show_chart
    }

    /// Trailing samples kept for the chart.
    pub fn chart_points(&self) -> usize {
        self.chart_points
    }

    /// Chart range requested from the quote endpoint.
    pub fn chart_range(&self) -> &str {
        &self.chart_range
    }

    /// Proxy URL prefix, if any.
    pub fn cors_proxy(&self) -> Option<&str> {
        self.cors_proxy.as_deref()
    }

    /// Fallback currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Replace the symbols, keeping custom display names by position.
    ///
    /// A position whose name merely repeated its old symbol takes the new
    /// symbol as its name; extra names are dropped.
    pub fn with_symbols<S: AsRef<str>>(&self, symbols: &[S]) -> Result<WatchConfig, ConfigError> {
        let entries: Vec<WatchEntry> = symbols
            .iter()
            .enumerate()
            .filter_map(|(i, symbol)| {
                let name = self
                    .entries
                    .get(i)
                    .filter(|old| old.has_custom_name())
                    .map(|old| old.display_name.as_str());
                WatchEntry::new(symbol.as_ref(), name)
            })
            .collect();
        if entries.is_empty() {
            return Err(ConfigError::MissingSymbol);
        }
        Ok(WatchConfig {
            entries,
            ..self.clone()
        })
    }

    /// Rename the symbol at `index`; a blank name resets it to the symbol.
    pub fn with_display_name(&self, index: usize, name: &str) -> Result<WatchConfig, ConfigError> {
        let len = self.entries.len();
        let mut entries = self.entries.clone();
        let entry = entries
            .get_mut(index)
            .ok_or(ConfigError::DisplayNameIndex { index, len })?;
        entry.display_name = non_blank(Some(name))
            .map(str::to_string)
            .unwrap_or_else(|| entry.symbol.clone());
        Ok(WatchConfig {
            entries,
            ..self.clone()
        })
    }

    /// Same config with another refresh interval (clamped).
    pub fn with_refresh_interval(&self, secs: u64) -> WatchConfig {
        WatchConfig {
            refresh_interval: clamp_interval(secs),
            ..self.clone()
        }
    }

    /// Same config with the chart toggled.
    pub fn with_show_chart(&self, show_chart: bool) -> WatchConfig {
        WatchConfig {
            show_chart,
            ..self.clone()
        }
    }

    /// Array-form host object equivalent to this config.
    pub fn to_raw(&self) -> RawConfig {
        RawConfig {
            symbol: None,
            name: None,
            symbols: Some(self.entries.iter().map(|e| e.symbol.clone()).collect()),
            names: Some(self.entries.iter().map(|e| e.display_name.clone()).collect()),
            update_interval: Some(IntervalSetting::Seconds(self.refresh_interval)),
            show_chart: Some(self.show_chart),
            chart_points: Some(self.chart_points),
            chart_range: Some(self.chart_range.clone()),
            cors_proxy: self.cors_proxy.clone(),
            currency: Some(self.currency.clone()),
        }
    }
}
