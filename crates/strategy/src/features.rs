use common::{Error, FeatureVector, Result, Series};

use crate::indicators::{sma, RsiIndicator};

const MA_SLOW: usize = 20;
const MA_FAST: usize = 5;

/// Build the classifier input for the latest bar of `series`.
///
/// `volatility` is the ATR already computed for this evaluation.
pub fn feature_vector(series: &Series, volatility: f64) -> Result<FeatureVector> {
    let rsi = RsiIndicator::default();
    let needed = rsi.lookback().max(MA_SLOW);
    let insufficient = || Error::InsufficientData {
        needed,
        available: series.len(),
    };

    let closes = series.closes();
    Ok(FeatureVector {
        rsi: rsi.compute(&closes).ok_or_else(insufficient)?,
        ma20: sma(&closes, MA_SLOW).ok_or_else(insufficient)?,
        ma5: sma(&closes, MA_FAST).ok_or_else(insufficient)?,
        volatility,
        volume: series.last().volume,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bar, series};

    #[test]
    fn needs_twenty_bars() {
        let s = series((0..19).map(|i| bar(i, 10.0, 11.0, 9.0, 10.0)).collect());
        assert!(matches!(
            feature_vector(&s, 1.0),
            Err(Error::InsufficientData { needed: 20, available: 19 })
        ));
    }

    #[test]
    fn features_follow_latest_bar() {
        let s = series(
            (0..25)
                .map(|i| {
                    let c = 100.0 + i as f64;
                    bar(i, c, c + 1.0, c - 1.0, c)
                })
                .collect(),
        );
        let f = feature_vector(&s, 2.5).unwrap();
        assert_eq!(f.volatility, 2.5);
        assert_eq!(f.volume, 1_000.0);
        // Closes 105..=124: mean of last 20 is 114.5, last 5 is 122.
        assert!((f.ma20 - 114.5).abs() < 1e-9);
        assert!((f.ma5 - 122.0).abs() < 1e-9);
        assert!((f.rsi - 100.0).abs() < 1e-9);
        assert_eq!(f.as_array()[0], f.rsi);
    }
}
