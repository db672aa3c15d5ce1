// Market data: daily close series for a symbol over a window.
pub mod fetcher;
pub mod traits;
pub mod yahoo;

pub use fetcher::MarketDataFetcher;
pub use traits::MarketDataSource;
pub use yahoo::YahooSource;
