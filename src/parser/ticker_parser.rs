// Ticker symbol extraction
use regex::Regex;
use std::sync::LazyLock;

/// 1-5 uppercase ASCII letters standing alone as a word.
const TICKER_PATTERN: &str = r"\b[A-Z]{1,5}\b";

static DEFAULT_EXTRACTOR: LazyLock<TickerExtractor> = LazyLock::new(TickerExtractor::new);

pub struct TickerExtractor {
    pattern: Regex,
}

impl TickerExtractor {
    pub fn new() -> Self {
        let pattern = Regex::new(TICKER_PATTERN).expect("ticker pattern must compile");
        Self { pattern }
    }

    /// Returns every match in left-to-right order, repeats included.
    ///
    /// No stopword filtering: "I", "A", "CEO" and friends come back as symbols.
    pub fn extract(&self, text: &str) -> Vec<String> {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

impl Default for TickerExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts with a shared, lazily compiled extractor.
pub fn extract_tickers(text: &str) -> Vec<String> {
    DEFAULT_EXTRACTOR.extract(text)
}
