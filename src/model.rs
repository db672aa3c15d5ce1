// Core structs: Post, PricePoint, FetchWindow, ChartArtifact and the error taxonomy
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Number of calendar days covered by every chart.
pub const WINDOW_DAYS: i64 = 30;

/// Human-readable window description used in chart titles and file names.
pub const WINDOW_LABEL: &str = "Last 30 Days";

#[derive(Debug, Clone)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub upvote_count: i64,
    pub comments: Vec<String>,
}

impl Post {
    /// Text handed to the ticker extractor: title and body joined by a single space,
    /// optionally followed by every comment.
    pub fn scan_text(&self, include_comments: bool) -> String {
        let mut text = format!("{} {}", self.title, self.body);
        if include_comments {
            for comment in &self.comments {
                text.push(' ');
                text.push_str(comment);
            }
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// Daily closes in ascending date order.
pub type PriceSeries = Vec<PricePoint>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FetchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchWindow {
    /// The trailing window ending on `today`, inclusive on both ends.
    pub fn trailing(today: NaiveDate) -> Self {
        Self {
            start: today - Duration::days(WINDOW_DAYS),
            end: today,
        }
    }

    pub fn last_30_days() -> Self {
        Self::trailing(Utc::now().date_naive())
    }
}

#[derive(Debug, Clone)]
pub struct ChartArtifact {
    pub symbol: String,
    pub window: FetchWindow,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected HTTP status {0}")]
    Http(u16),
    #[error("could not decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum FetchCause {
    #[error("symbol unknown to the data source")]
    UnknownSymbol,
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected HTTP status {0}")]
    Http(u16),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("timed out after {0}s")]
    Timeout(u64),
    #[error("data source returned no prices")]
    EmptySeries,
}

#[derive(Debug, Error)]
#[error("failed to fetch {symbol}: {cause}")]
pub struct FetchError {
    pub symbol: String,
    pub cause: FetchCause,
}

impl FetchError {
    pub fn new(symbol: &str, cause: FetchCause) -> Self {
        Self {
            symbol: symbol.to_string(),
            cause,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot render an empty series")]
    EmptySeries,
    #[error("dates are not strictly ascending ({previous} followed by {next})")]
    NonMonotonicDates { previous: NaiveDate, next: NaiveDate },
    #[error("chart backend error: {0}")]
    Backend(String),
}

/// Anything that can go wrong for a single symbol once ingestion succeeded.
#[derive(Debug, Error)]
pub enum SymbolError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to write artifact: {0}")]
    Io(#[from] std::io::Error),
}
