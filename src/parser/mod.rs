// Text parsing: pulls candidate ticker symbols out of post text.
pub mod ticker_parser;

pub use ticker_parser::{TickerExtractor, extract_tickers};
