// Utility functions
use chrono::{DateTime, Utc};

/// Converts fractional Unix seconds (as Reddit reports them) into `DateTime<Utc>`.
pub fn from_epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1_000_000_000.0).round() as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
}
