//! Line charts of daily closes.
//!
//! Drawing goes through plotters' bitmap backend into an in-memory RGB buffer,
//! which is then PNG-encoded so the sink only ever sees bytes.

use crate::model::{ChartArtifact, FetchWindow, PriceSeries, RenderError, WINDOW_LABEL};
use chrono::Duration;
use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use std::fmt::Display;
use std::io::Cursor;

pub trait ChartRenderer: Send + Sync {
    fn render(
        &self,
        symbol: &str,
        series: &PriceSeries,
        window: &FetchWindow,
    ) -> Result<ChartArtifact, RenderError>;
}

/// Rejects input that must never reach a drawing backend: an empty series or
/// dates that are not strictly ascending.
pub fn validate_series(series: &PriceSeries) -> Result<(), RenderError> {
    if series.is_empty() {
        return Err(RenderError::EmptySeries);
    }
    for pair in series.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(RenderError::NonMonotonicDates {
                previous: pair[0].date,
                next: pair[1].date,
            });
        }
    }
    Ok(())
}

fn backend_error<E: Display>(e: E) -> RenderError {
    RenderError::Backend(e.to_string())
}

/// Y range with 5% headroom; a flat series gets a +/-1 band.
fn value_bounds(closes: &[f64]) -> (f64, f64) {
    let lo = closes.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = (hi - lo) * 0.05;
    if pad == 0.0 {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo - pad, hi + pad)
    }
}

pub struct PlottersRenderer {
    width: u32,
    height: u32,
}

impl PlottersRenderer {
    pub fn new() -> Self {
        Self {
            width: 1000,
            height: 600,
        }
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn draw(&self, symbol: &str, series: &PriceSeries, buffer: &mut [u8]) -> Result<(), RenderError> {
        let root = BitMapBackend::with_buffer(buffer, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend_error)?;

        let first = series[0].date;
        let span = series
            .last()
            .map_or(1, |p| (p.date - first).num_days())
            .max(1);
        let points: Vec<(i64, f64)> = series
            .iter()
            .map(|p| ((p.date - first).num_days(), p.close.to_f64().unwrap_or(f64::NAN)))
            .collect();
        let closes: Vec<f64> = points.iter().map(|&(_, c)| c).collect();
        let (lo, hi) = value_bounds(&closes);

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("{} Historical Data ({})", symbol, WINDOW_LABEL),
                ("sans-serif", 24),
            )
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0i64..span, lo..hi)
            .map_err(backend_error)?;

        let label_date = |offset: &i64| (first + Duration::days(*offset)).format("%m-%d").to_string();
        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Price (USD)")
            .x_label_formatter(&label_date)
            .draw()
            .map_err(backend_error)?;

        chart
            .draw_series(LineSeries::new(points, &BLUE))
            .map_err(backend_error)?
            .label("Close Price")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(backend_error)?;

        root.present().map_err(backend_error)
    }
}

impl Default for PlottersRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render(
        &self,
        symbol: &str,
        series: &PriceSeries,
        window: &FetchWindow,
    ) -> Result<ChartArtifact, RenderError> {
        validate_series(series)?;

        let mut buffer = vec![0u8; (self.width * self.height * 3) as usize];
        self.draw(symbol, series, &mut buffer)?;

        let image = RgbImage::from_raw(self.width, self.height, buffer)
            .ok_or_else(|| RenderError::Backend("pixel buffer has the wrong size".into()))?;
        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, ImageFormat::Png)
            .map_err(backend_error)?;

        Ok(ChartArtifact {
            symbol: symbol.to_string(),
            window: *window,
            extension: "png",
            bytes: png.into_inner(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PricePoint;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn point(day: u32, close: i64) -> PricePoint {
        PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            close: Decimal::new(close, 0),
        }
    }

    fn window() -> FetchWindow {
        FetchWindow::trailing(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap())
    }

    #[test]
    fn ascending_series_is_valid() {
        assert!(validate_series(&vec![point(1, 10), point(2, 11), point(6, 9)]).is_ok());
    }

    #[test]
    fn empty_series_is_rejected_before_drawing() {
        let err = PlottersRenderer::new().render("GME", &Vec::new(), &window()).unwrap_err();
        assert!(matches!(err, RenderError::EmptySeries));
    }

    #[test]
    fn out_of_order_dates_are_rejected() {
        let err = PlottersRenderer::new()
            .render("GME", &vec![point(3, 10), point(2, 11)], &window())
            .unwrap_err();
        match err {
            RenderError::NonMonotonicDates { previous, next } => {
                assert_eq!(previous.to_string(), "2024-05-03");
                assert_eq!(next.to_string(), "2024-05-02");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn repeated_dates_are_rejected() {
        let err = validate_series(&vec![point(2, 10), point(2, 11)]).unwrap_err();
        assert!(matches!(err, RenderError::NonMonotonicDates { .. }));
    }

    #[test]
    fn bounds_pad_the_range() {
        let (lo, hi) = value_bounds(&[10.0, 20.0]);
        assert!((lo - 9.5).abs() < 1e-9);
        assert!((hi - 20.5).abs() < 1e-9);
    }

    #[test]
    fn flat_series_gets_a_band() {
        assert_eq!(value_bounds(&[5.0, 5.0]), (4.0, 6.0));
    }

    #[test]
    fn renders_a_png_for_a_valid_series() {
        let series = vec![point(1, 10), point(2, 12), point(3, 11), point(6, 15), point(7, 14)];
        let window = window();

        let artifact = PlottersRenderer::new().render("GME", &series, &window).unwrap();

        assert_eq!(artifact.symbol, "GME");
        assert_eq!(artifact.extension, "png");
        assert_eq!(artifact.window, window);
        assert_eq!(&artifact.bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn single_point_series_still_renders() {
        let artifact = PlottersRenderer::with_size(320, 200)
            .render("AMC", &vec![point(5, 7)], &window())
            .unwrap();
        assert!(artifact.bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }
}
