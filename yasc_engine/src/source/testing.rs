//! Scripted quote source for engine tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{LiveQuote, QuoteRequest, QuoteSource, TransportFailure};

/// Serves fixed prices; unlisted symbols answer 404, listed delays are slept first.
#[derive(Default)]
pub struct FixedSource {
    prices: HashMap<String, (f64, f64)>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl FixedSource {
    pub fn new(prices: &[(&str, f64, f64)]) -> Self {
        FixedSource {
            prices: prices
                .iter()
                .map(|(s, price, previous)| (s.to_string(), (*price, *previous)))
                .collect(),
            ..FixedSource::default()
        }
    }

    pub fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.delays.insert(symbol.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for FixedSource {
    fn name(&self) -> &'static str {
        "FIXED"
    }

    async fn fetch(&self, request: &QuoteRequest<'_>) -> Result<LiveQuote, TransportFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(request.symbol) {
            tokio::time::sleep(*delay).await;
        }
        match self.prices.get(request.symbol) {
            Some((price, previous)) => LiveQuote::new(Some(*price), Some(*previous)),
            None => Err(TransportFailure::Status(404)),
        }
    }
}
