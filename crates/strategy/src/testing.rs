use chrono::{Duration, TimeZone, Utc};

use common::{Bar, Series};

/// Bar on day `day` after 2024-01-01.
pub fn bar(day: i64, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar {
        timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day),
        open,
        high,
        low,
        close,
        volume: 1_000.0,
    }
}

pub fn series(bars: Vec<Bar>) -> Series {
    Series::new(bars).unwrap()
}

/// `n` identical bars spanning close ± half_range.
pub fn flat_series(n: usize, close: f64, half_range: f64) -> Series {
    series(
        (0..n as i64)
            .map(|i| bar(i, close, close + half_range, close - half_range, close))
            .collect(),
    )
}
