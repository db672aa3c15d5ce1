//! Yahoo Finance daily closes.
//!
//! Uses the public v8 chart endpoint, the same one `yfinance`-style clients hit.
//! Yahoo has no official API, so the response structs only name the fields we read.

use crate::market::traits::MarketDataSource;
use crate::model::{FetchCause, FetchError, PricePoint, PriceSeries};
use chrono::{DateTime, NaiveDate};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Vec<Option<f64>>,
}

pub struct YahooSource {
    client: Client,
    base_url: String,
}

impl YahooSource {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let period1 = start.and_hms_opt(0, 0, 0).map_or(0, |dt| dt.and_utc().timestamp());
        let period2 = end.and_hms_opt(23, 59, 59).map_or(0, |dt| dt.and_utc().timestamp());
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.base_url, symbol, period1, period2
        )
    }
}

impl Default for YahooSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns a chart payload into an ascending series clipped to `[start, end]`.
///
/// Rows without a close are skipped; if two rows land on the same day the later one wins.
fn parse_chart(
    symbol: &str,
    body: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, FetchError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::new(symbol, FetchCause::Decode(e.to_string())))?;

    let data = match (response.chart.result, response.chart.error) {
        (Some(results), _) => results.into_iter().next(),
        (None, Some(err)) if err.code == "Not Found" => {
            return Err(FetchError::new(symbol, FetchCause::UnknownSymbol));
        }
        (None, Some(err)) => {
            let detail = err.description.unwrap_or_default();
            return Err(FetchError::new(
                symbol,
                FetchCause::Decode(format!("{}: {}", err.code, detail)),
            ));
        }
        (None, None) => None,
    };

    let Some(data) = data else {
        return Err(FetchError::new(symbol, FetchCause::EmptySeries));
    };

    let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = data.timestamp.unwrap_or_default();
    let closes = data
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let mut points: Vec<PricePoint> = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.iter().zip(closes) {
        let Some(close) = close.and_then(Decimal::from_f64) else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()) else {
            return Err(FetchError::new(
                symbol,
                FetchCause::Decode(format!("invalid timestamp {ts}")),
            ));
        };
        if date < start || date > end {
            continue;
        }
        points.push(PricePoint {
            date,
            close: close.round_dp(4),
        });
    }

    points.sort_by_key(|p| p.date);
    let mut series: PriceSeries = Vec::with_capacity(points.len());
    for point in points {
        match series.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            _ => series.push(point),
        }
    }
    Ok(series)
}

#[async_trait::async_trait]
impl MarketDataSource for YahooSource {
    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, FetchError> {
        let url = self.chart_url(symbol, start, end);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::new(symbol, FetchCause::Network(e.to_string())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::new(symbol, FetchCause::Network(e.to_string())))?;

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::new(symbol, FetchCause::UnknownSymbol));
        }
        if !status.is_success() {
            return Err(FetchError::new(symbol, FetchCause::Http(status.as_u16())));
        }

        parse_chart(symbol, &body, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    // 2024-05-01..03 at 13:30 UTC (US open)
    const BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "gmtoffset": -14400 },
                "timestamp": [1714570200, 1714656600, 1714743000],
                "indicators": { "quote": [{ "close": [10.5, null, 11.123456] }] }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_closes_and_skips_nulls() {
        let series = parse_chart("GME", BODY, day(1), day(31)).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, day(1));
        assert_eq!(series[0].close, Decimal::new(105, 1));
        assert_eq!(series[1].date, day(3));
        assert_eq!(series[1].close, Decimal::new(111235, 4));
    }

    #[test]
    fn clips_to_window() {
        let series = parse_chart("GME", BODY, day(2), day(2)).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn not_found_error_means_unknown_symbol() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart("ZZZZZ", body, day(1), day(31)).unwrap_err();
        assert_eq!(err.symbol, "ZZZZZ");
        assert!(matches!(err.cause, FetchCause::UnknownSymbol));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = parse_chart("GME", "<html>", day(1), day(31)).unwrap_err();
        assert!(matches!(err.cause, FetchCause::Decode(_)));
    }

    #[test]
    fn unsorted_rows_come_back_ascending() {
        let body = r#"{"chart":{"result":[{"timestamp":[1714743000,1714570200,1714570300],
            "indicators":{"quote":[{"close":[3.0,1.0,2.0]}]}}],"error":null}}"#;
        let series = parse_chart("GME", body, day(1), day(31)).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].close, Decimal::new(2, 0));
        assert_eq!(series[1].close, Decimal::new(3, 0));
    }

    #[test]
    fn url_covers_whole_end_day() {
        let source = YahooSource::with_base_url("http://localhost:9/");
        let url = source.chart_url("AMC", day(1), day(2));
        assert_eq!(
            url,
            "http://localhost:9/v8/finance/chart/AMC?period1=1714521600&period2=1714694399&interval=1d"
        );
    }
}
