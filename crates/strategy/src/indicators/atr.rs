//! Average True Range volatility estimate.
//!
//! True range: max(high − low, |high − prev_close|, |low − prev_close|).
//! The estimate is the simple mean of the trailing `window` true ranges,
//! evaluated at the most recent bar. The first bar of a series has no
//! previous close and contributes high − low.

use common::{Bar, Error, Result, Series};

pub const DEFAULT_ATR_WINDOW: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityEstimator {
    window: usize,
}

impl Default for VolatilityEstimator {
    fn default() -> Self {
        Self { window: DEFAULT_ATR_WINDOW }
    }
}

impl VolatilityEstimator {
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(Error::Config("ATR window must be >= 1".into()));
        }
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// ATR at the last bar of `series`.
    /// Fails with `InsufficientData` when the series is shorter than the window.
    pub fn estimate(&self, series: &Series) -> Result<f64> {
        let bars = series.bars();
        if bars.len() < self.window {
            return Err(Error::InsufficientData {
                needed: self.window,
                available: bars.len(),
            });
        }

        let start = bars.len() - self.window;
        let sum: f64 = (start..bars.len())
            .map(|i| {
                let prev_close = if i == 0 { None } else { Some(bars[i - 1].close) };
                true_range(&bars[i], prev_close)
            })
            .sum();
        Ok(sum / self.window as f64)
    }
}

/// True range of a single bar.
pub fn true_range(bar: &Bar, prev_close: Option<f64>) -> f64 {
    let range = bar.high - bar.low;
    match prev_close {
        Some(pc) => range.max((bar.high - pc).abs()).max((bar.low - pc).abs()),
        None => range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bar, series};

    #[test]
    fn insufficient_data_below_window() {
        let s = series((0..13).map(|i| bar(i, 10.0, 11.0, 9.0, 10.0)).collect());
        let err = VolatilityEstimator::default().estimate(&s).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { needed: 14, available: 13 }));
    }

    #[test]
    fn constant_range_gives_that_range() {
        let s = series((0..20).map(|i| bar(i, 10.0, 11.0, 9.0, 10.0)).collect());
        let atr = VolatilityEstimator::default().estimate(&s).unwrap();
        assert!((atr - 2.0).abs() < 1e-12, "got {atr}");
    }

    #[test]
    fn gap_uses_previous_close() {
        // Gap up: prev close 10, bar spans 14..15 → TR = 15 - 10 = 5.
        let prev = bar(0, 10.0, 10.5, 9.5, 10.0);
        let gap = bar(1, 14.0, 15.0, 14.0, 14.5);
        assert_eq!(true_range(&gap, Some(prev.close)), 5.0);
        assert_eq!(true_range(&gap, None), 1.0);
    }

    #[test]
    fn only_trailing_window_counts() {
        // 10 wide bars followed by 14 narrow ones → the wide bars are outside the window.
        let mut bars: Vec<_> = (0..10).map(|i| bar(i, 10.0, 20.0, 0.0, 10.0)).collect();
        bars.extend((10..24).map(|i| bar(i, 10.0, 10.5, 9.5, 10.0)));
        let atr = VolatilityEstimator::default().estimate(&series(bars)).unwrap();
        assert!((atr - 1.0).abs() < 1e-12, "got {atr}");
    }

    #[test]
    fn flat_market_is_zero() {
        let s = series((0..14).map(|i| bar(i, 5.0, 5.0, 5.0, 5.0)).collect());
        assert_eq!(VolatilityEstimator::default().estimate(&s).unwrap(), 0.0);
    }

    #[test]
    fn zero_window_rejected() {
        assert!(matches!(VolatilityEstimator::new(0), Err(Error::Config(_))));
    }
}
