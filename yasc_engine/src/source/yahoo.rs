//! Yahoo finance quote source.
//!
//! Requests `/v8/finance/chart/{SYMBOL}` and accepts two body shapes: the
//! chart document (`chart.result[0].meta` plus close series) and the older
//! `quoteResponse.result[0]` document. Any other body is unusable.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::form_urlencoded;

use super::{LiveQuote, QuoteRequest, QuoteSource, TransportFailure, pair_series};

/// Public endpoint host.
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
/// Bound on one quote request, connection included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// HTTP quote source for Yahoo-style endpoints.
#[derive(Debug, Clone)]
pub struct YahooSource {
    client: Client,
    base_url: String,
}

impl YahooSource {
    /// Source with a request timeout of `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportFailure> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(YahooSource {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the source at another host serving the same API.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Full request URL, wrapped in the proxy prefix when one is set.
    pub fn quote_url(&self, request: &QuoteRequest<'_>) -> String {
        let target = format!(
            "{}/v8/finance/chart/{}?range={}&interval={}",
            self.base_url,
            encode(request.symbol),
            encode(request.range),
            sample_interval(request.range),
        );
        match request.proxy {
            Some(proxy) => format!("{proxy}{}", encode(&target)),
            None => target,
        }
    }
}

fn encode(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

/// Sample spacing that keeps a range to a chart-sized number of points.
fn sample_interval(range: &str) -> &'static str {
    match range {
        "1d" => "5m",
        "5d" => "15m",
        "1mo" => "1h",
        _ => "1d",
    }
}

#[async_trait]
impl QuoteSource for YahooSource {
    fn name(&self) -> &'static str {
        "YAHOO"
    }

    async fn fetch(&self, request: &QuoteRequest<'_>) -> Result<LiveQuote, TransportFailure> {
        let url = self.quote_url(request);
        debug!("[{}] GET {}", request.symbol, url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportFailure::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        parse_payload(&body)
    }
}

/// Extract a [`LiveQuote`] from a response body.
pub fn parse_payload(body: &[u8]) -> Result<LiveQuote, TransportFailure> {
    let payload: QuotePayload =
        serde_json::from_slice(body).map_err(|e| TransportFailure::Malformed(e.to_string()))?;
    payload.into_live_quote()
}

/// Response shapes the source understands.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum QuotePayload {
    /// `/v8/finance/chart` document.
    Chart {
        /// Chart envelope.
        chart: ChartEnvelope,
    },
    /// `/v7/finance/quote` document.
    QuoteResponse {
        /// Quote envelope.
        #[serde(rename = "quoteResponse")]
        quote_response: QuoteEnvelope,
    },
    /// Anything else.
    Unrecognized(Value),
}

impl QuotePayload {
    /// Apply the extraction rule of the recognised shape.
    pub fn into_live_quote(self) -> Result<LiveQuote, TransportFailure> {
        match self {
            QuotePayload::Chart { chart } => chart.into_live_quote(),
            QuotePayload::QuoteResponse { quote_response } => quote_response.into_live_quote(),
            QuotePayload::Unrecognized(_) => Err(TransportFailure::Malformed(
                "unrecognized response shape".to_string(),
            )),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
    error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    currency: Option<String>,
    market_state: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    #[serde(default)]
    quote: Option<Vec<IndicatorQuote>>,
}

#[derive(Deserialize, Debug)]
struct IndicatorQuote {
    #[serde(default)]
    close: Option<Vec<Option<f64>>>,
}

impl ChartEnvelope {
    fn into_live_quote(self) -> Result<LiveQuote, TransportFailure> {
        let result = self.result.and_then(|r| r.into_iter().next()).ok_or_else(|| {
            let reason = self
                .error
                .and_then(|e| e.description)
                .unwrap_or_else(|| "empty chart result".to_string());
            TransportFailure::Malformed(reason)
        })?;

        let meta = result.meta;
        let mut live = LiveQuote::new(
            meta.regular_market_price,
            meta.previous_close.or(meta.chart_previous_close),
        )?;
        live.currency = meta.currency;
        live.market_state = meta.market_state;

        let closes = result
            .indicators
            .and_then(|i| i.quote)
            .and_then(|quotes| quotes.into_iter().next())
            .and_then(|q| q.close)
            .unwrap_or_default();
        let timestamps = result.timestamp.unwrap_or_default();
        live.series = pair_series(&timestamps, &closes);
        Ok(live)
    }
}

#[derive(Deserialize, Debug)]
pub struct QuoteEnvelope {
    #[serde(default)]
    result: Vec<QuoteResult>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct QuoteResult {
    regular_market_price: Option<f64>,
    regular_market_previous_close: Option<f64>,
    currency: Option<String>,
    market_state: Option<String>,
}

impl QuoteEnvelope {
    fn into_live_quote(self) -> Result<LiveQuote, TransportFailure> {
        let result = self
            .result
            .into_iter()
            .next()
            .ok_or_else(|| TransportFailure::Malformed("empty quote result".to_string()))?;
        let mut live = LiveQuote::new(
            result.regular_market_price,
            result.regular_market_previous_close,
        )?;
        live.currency = result.currency;
        live.market_state = result.market_state;
        Ok(live)
    }
}
