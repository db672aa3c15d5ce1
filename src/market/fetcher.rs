use crate::market::traits::MarketDataSource;
use crate::model::{FetchCause, FetchError, FetchWindow, PriceSeries};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Wraps a market data source with a per-call timeout and the empty-series check.
pub struct MarketDataFetcher {
    source: Arc<dyn MarketDataSource>,
    timeout: Duration,
}

impl MarketDataFetcher {
    pub fn new(source: Arc<dyn MarketDataSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    pub async fn fetch(&self, symbol: &str, window: &FetchWindow) -> Result<PriceSeries, FetchError> {
        debug!("Fetching {} from {} to {}", symbol, window.start, window.end);
        let series = match timeout(
            self.timeout,
            self.source.fetch_daily(symbol, window.start, window.end),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(FetchError::new(
                    symbol,
                    FetchCause::Timeout(self.timeout.as_secs()),
                ));
            }
        };

        if series.is_empty() {
            return Err(FetchError::new(symbol, FetchCause::EmptySeries));
        }
        Ok(series)
    }
}
