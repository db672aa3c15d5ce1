use crate::model::{FetchError, PriceSeries};
use chrono::NaiveDate;

#[async_trait::async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily closes between `start` and `end`, both inclusive.
    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, FetchError>;
}
