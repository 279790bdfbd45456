//! Quote source for demo mode.

use async_trait::async_trait;

use super::{LiveQuote, QuoteRequest, QuoteSource, TransportFailure};

/// Source that never reaches the network, so every quote is demo data.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

#[async_trait]
impl QuoteSource for OfflineSource {
    fn name(&self) -> &'static str {
        "OFFLINE"
    }

    async fn fetch(&self, _request: &QuoteRequest<'_>) -> Result<LiveQuote, TransportFailure> {
        Err(TransportFailure::Offline)
    }
}
